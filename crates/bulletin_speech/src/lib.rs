use std::str::FromStr;
use std::sync::Arc;

use bulletin_core::{Error, Result, Settings, SpeechSynthesizer};

pub mod backends;

pub use backends::*;

/// Which speech engine renders the bulletin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechBackend {
    #[default]
    Local,
    Watson,
}

impl FromStr for SpeechBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "watson" => Ok(Self::Watson),
            other => Err(Error::Config(format!("unknown speech backend '{}'", other))),
        }
    }
}

/// Build the configured synthesizer. Remote credentials are only checked
/// when the remote backend is requested.
pub fn create_synthesizer(
    backend: SpeechBackend,
    settings: &Settings,
) -> Result<Arc<dyn SpeechSynthesizer>> {
    match backend {
        SpeechBackend::Local => Ok(Arc::new(LocalSynthesizer::new(
            settings.filenames.local_file.clone(),
            settings.settings.local_rate_delta,
        ))),
        SpeechBackend::Watson => {
            let watson = &settings.watson;
            let api_key = watson
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| Error::Config("watson.api_key is required for the watson backend".into()))?;
            let service_url = watson
                .service_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| Error::Config("watson.service_url is required for the watson backend".into()))?;
            Ok(Arc::new(WatsonSynthesizer::new(
                api_key,
                service_url,
                &watson.voice,
                settings.filenames.watson_file.clone(),
            )?))
        }
    }
}
