use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings error: {0}")]
    TomlRead(#[from] toml::de::Error),
    #[error("settings error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("unsupported screen file '{0}'")]
    UnsupportedFormat(String),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

impl ProjectError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        ProjectError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
