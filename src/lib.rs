pub mod analysis;
pub mod args;
pub mod config;
pub mod db;
pub mod fetch;
pub mod game;
pub mod history;
pub mod logging;
pub mod restriction;
pub mod summary;
pub mod variants;
