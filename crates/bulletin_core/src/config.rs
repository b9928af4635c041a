use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Upper bound on how many ranked articles are kept, and so on how many can be narrated.
pub const MAX_ITEMS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub csvfiles: CsvFiles,
    #[serde(default)]
    pub watson: WatsonSettings,
    pub filenames: FileNames,
    #[serde(default)]
    pub settings: NarrationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvFiles {
    pub article_corpus_csv: PathBuf,
    pub user_article_corpus_csv: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatsonSettings {
    pub api_key: Option<String>,
    pub service_url: Option<String>,
    #[serde(default = "default_voice")]
    pub voice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileNames {
    pub watson_file: PathBuf,
    pub local_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarrationSettings {
    #[serde(default = "default_number_of_items")]
    pub number_of_items: usize,
    /// Offset applied to the local engine's default speaking rate.
    #[serde(default = "default_local_rate_delta")]
    pub local_rate_delta: i32,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            number_of_items: default_number_of_items(),
            local_rate_delta: default_local_rate_delta(),
        }
    }
}

fn default_voice() -> String {
    "en-US_AllisonV3Voice".to_string()
}

fn default_number_of_items() -> usize {
    5
}

fn default_local_rate_delta() -> i32 {
    -50
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let items = self.settings.number_of_items;
        if !(1..=MAX_ITEMS).contains(&items) {
            return Err(Error::Config(format!(
                "number_of_items must be between 1 and {}, got {}",
                MAX_ITEMS, items
            )));
        }
        Ok(())
    }
}
