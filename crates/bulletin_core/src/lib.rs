pub mod config;
pub mod error;
pub mod loader;
pub mod speech;
pub mod types;

pub use config::Settings;
pub use error::{Error, Result};
pub use loader::read_articles;
pub use speech::SpeechSynthesizer;
pub use types::{ArticleRecord, Corpus, RankedRecommendation, Script, ScriptMode};
