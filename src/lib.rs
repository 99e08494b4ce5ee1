// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod history;
pub mod logging;
pub mod masking;
pub mod miner;
pub mod phrase;
pub mod runtime;
pub mod trainer;
pub mod translate;

pub use masking::{mask, score, MatchResult};
pub use miner::{extract, MineError, MinerConfig};
pub use phrase::{Phrase, PhraseCollection};
pub use trainer::Trainer;
