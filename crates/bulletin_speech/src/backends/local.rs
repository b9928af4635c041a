use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use bulletin_core::{Error, Result, Script, ScriptMode, SpeechSynthesizer};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::partial_path;

pub const DEFAULT_PROGRAM: &str = "espeak-ng";
/// Words per minute the engine speaks at before the configured delta.
pub const DEFAULT_RATE: i32 = 175;

/// Offline synthesis through an espeak-compatible command-line engine.
#[derive(Debug, Clone)]
pub struct LocalSynthesizer {
    program: String,
    output: PathBuf,
    rate: i32,
}

impl LocalSynthesizer {
    pub fn new(output: impl Into<PathBuf>, rate_delta: i32) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            output: output.into(),
            rate: (DEFAULT_RATE + rate_delta).max(1),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn rate(&self) -> i32 {
        self.rate
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    async fn run_engine(&self, text: &str, target: &Path) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-w")
            .arg(target)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| speech_error(None, format!("cannot start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| speech_error(None, format!("cannot write to {}: {}", self.program, e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| speech_error(None, e.to_string()))?;

        if !output.status.success() {
            return Err(speech_error(
                output.status.code().and_then(exit_status),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

fn exit_status(code: i32) -> Option<u16> {
    u16::try_from(code).ok()
}

fn speech_error(status: Option<u16>, message: String) -> Error {
    Error::Speech { status, message }
}

#[async_trait]
impl SpeechSynthesizer for LocalSynthesizer {
    fn name(&self) -> &str {
        "local"
    }

    fn script_mode(&self) -> ScriptMode {
        ScriptMode::Plain
    }

    async fn synthesize(&self, script: &Script) -> Result<PathBuf> {
        let text = script.join();
        info!("📝 Final script:\n {}", text);
        debug!("Running {} at {} wpm", self.program, self.rate);

        let partial = partial_path(&self.output);
        if let Err(e) = self.run_engine(&text, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &self.output).await?;

        info!("🔊 News bulletin created with filename {}", self.output.display());
        Ok(self.output.clone())
    }
}
