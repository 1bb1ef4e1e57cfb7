use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

const DEFAULT_SUIT_COUNT: u32 = 5;
const MAX_RANK: u32 = 5;

/// A named ruleset, as listed in the hanabi-live `variants.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: u32,
    pub name: String,
    pub suits: Vec<String>,
}

impl Variant {
    pub fn new(id: u32, name: &str, suits: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            suits: suits.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn max_score(&self) -> u32 {
        self.suits.len() as u32 * MAX_RANK
    }
}

/// Variant lookups by id and name. Built once and passed to whatever
/// needs suit counts.
#[derive(Debug, Clone, Default)]
pub struct VariantCatalog {
    variants: Vec<Variant>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<Variant>) -> Self {
        let by_id = variants.iter().enumerate().map(|(i, v)| (v.id, i)).collect();
        let by_name = variants
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), i))
            .collect();

        Self {
            variants,
            by_id,
            by_name,
        }
    }

    /// Reads a local copy of `variants.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read variant list {}", path.display()))?;
        let variants: Vec<Variant> =
            serde_json::from_str(&text).context("failed to parse variant list")?;

        tracing::info!("loaded {} variants from {}", variants.len(), path.display());
        Ok(Self::new(variants))
    }

    /// Like [`VariantCatalog::load`], but an absent file yields an empty
    /// catalog so lookups fall back to parsing names.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "no variant list at {}; suit counts will be guessed from names",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn by_id(&self, id: u32) -> Option<&Variant> {
        self.by_id.get(&id).map(|&i| &self.variants[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&Variant> {
        self.by_name.get(name).map(|&i| &self.variants[i])
    }

    /// Suit count for a variant name. Unknown names use the first digit in
    /// the name ("Rainbow (6 Suits)" → 6), or 5.
    pub fn suit_count(&self, name: &str) -> u32 {
        match self.by_name(name) {
            Some(variant) => variant.suits.len() as u32,
            None => name
                .chars()
                .find_map(|c| c.to_digit(10))
                .unwrap_or(DEFAULT_SUIT_COUNT),
        }
    }

    pub fn max_score(&self, name: &str) -> u32 {
        match self.by_name(name) {
            Some(variant) => variant.max_score(),
            None => self.suit_count(name) * MAX_RANK,
        }
    }
}
