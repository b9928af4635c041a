use std::path::{Path, PathBuf};

pub mod local;
pub mod watson;

pub use local::LocalSynthesizer;
pub use watson::WatsonSynthesizer;

/// Sibling path audio is rendered into before being moved over `output`.
pub(crate) fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
