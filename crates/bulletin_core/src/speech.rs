use std::path::PathBuf;

use async_trait::async_trait;

use crate::types::{Script, ScriptMode};
use crate::Result;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// The kind of script this backend expects to be handed.
    fn script_mode(&self) -> ScriptMode;

    /// Render the script to an audio file and return its path.
    ///
    /// Nothing is written when synthesis fails.
    async fn synthesize(&self, script: &Script) -> Result<PathBuf>;
}
