//! Composable filters over game data.
//!
//! A [`Restriction`] is evaluated against anything that can look up a field
//! by dotted path, such as a history row or raw JSON.

use serde_json::Value;

/// A field read out of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    fn matches(&self, other: &FieldValue) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Anything a restriction can be checked against.
pub trait FieldSource {
    /// Looks up a dotted path such as `options.numPlayers`.
    fn field(&self, path: &str) -> Option<FieldValue>;
}

impl FieldSource for Value {
    fn field(&self, path: &str) -> Option<FieldValue> {
        let mut node = self;
        for key in path.split('.') {
            node = node.get(key)?;
        }

        match node {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => Some(FieldValue::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Restriction {
    Equals(String, FieldValue),
    GreaterThan(String, f64),
    LessThan(String, f64),
    /// Substring of a text field, or element of a list field.
    Contains(String, String),
    All(Vec<Restriction>),
    /// Passes when the inner restriction's field is absent.
    IfPresent(Box<Restriction>),
}

impl Restriction {
    pub fn equals(path: &str, value: impl Into<FieldValue>) -> Self {
        Restriction::Equals(path.to_string(), value.into())
    }

    pub fn greater_than(path: &str, bound: f64) -> Self {
        Restriction::GreaterThan(path.to_string(), bound)
    }

    pub fn less_than(path: &str, bound: f64) -> Self {
        Restriction::LessThan(path.to_string(), bound)
    }

    pub fn contains(path: &str, needle: &str) -> Self {
        Restriction::Contains(path.to_string(), needle.to_string())
    }

    pub fn if_present(self) -> Self {
        Restriction::IfPresent(Box::new(self))
    }

    /// Conjunction, flattening nested `All`s.
    pub fn and(self, other: Restriction) -> Self {
        let mut children = match self {
            Restriction::All(children) => children,
            single => vec![single],
        };
        match other {
            Restriction::All(more) => children.extend(more),
            single => children.push(single),
        }
        Restriction::All(children)
    }

    fn path(&self) -> Option<&str> {
        match self {
            Restriction::Equals(path, _)
            | Restriction::GreaterThan(path, _)
            | Restriction::LessThan(path, _)
            | Restriction::Contains(path, _) => Some(path),
            Restriction::All(_) => None,
            Restriction::IfPresent(inner) => inner.path(),
        }
    }

    /// True if `source` satisfies every constraint. A missing field fails
    /// unless it is wrapped in [`Restriction::IfPresent`].
    pub fn validate<S: FieldSource + ?Sized>(&self, source: &S) -> bool {
        match self {
            Restriction::Equals(path, expected) => source
                .field(path)
                .is_some_and(|actual| actual.matches(expected)),
            Restriction::GreaterThan(path, bound) => source
                .field(path)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v > *bound),
            Restriction::LessThan(path, bound) => source
                .field(path)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v < *bound),
            Restriction::Contains(path, needle) => match source.field(path) {
                Some(FieldValue::Text(text)) => text.contains(needle.as_str()),
                Some(FieldValue::List(items)) => items.iter().any(|item| item == needle),
                _ => false,
            },
            Restriction::All(children) => children.iter().all(|c| c.validate(source)),
            Restriction::IfPresent(inner) => match inner.path() {
                Some(path) if source.field(path).is_none() => true,
                _ => inner.validate(source),
            },
        }
    }
}

/// Rejects games played with options that make the deck or clues easier.
pub fn non_cheating() -> Restriction {
    Restriction::All(vec![
        Restriction::equals("options.startingPlayer", 0u32),
        Restriction::equals("options.cardCycle", false),
        Restriction::equals("options.deckPlays", false),
        Restriction::equals("options.emptyClues", false),
        Restriction::equals("options.oneExtraCard", false),
        Restriction::equals("options.oneLessCard", false),
        Restriction::equals("options.allOrNothing", false),
        Restriction::equals("options.detrimentalCharacters", false),
    ])
}

/// Fair, non-speedrun games that lasted more than three turns, optionally
/// limited to one table size.
pub fn standard(num_players: Option<u32>) -> Restriction {
    let mut restriction = non_cheating()
        .and(Restriction::equals("options.speedrun", false))
        .and(Restriction::greater_than("numTurns", 3.0));

    if let Some(n) = num_players {
        restriction = restriction.and(Restriction::equals("options.numPlayers", n));
    }
    restriction
}

pub fn max_score(score: u32) -> Restriction {
    Restriction::equals("score", score)
}
