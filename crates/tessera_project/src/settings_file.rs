use crate::errors::{ProjectError, ProjectResult};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tessera_runtime::RuntimeSettings;
use tracing::debug;

pub const SETTINGS_FILE: &str = "tessera.toml";

/// Reads runtime settings. A missing file yields the defaults; keys absent
/// from the file keep their default values.
pub fn load_settings(path: impl AsRef<Path>) -> ProjectResult<RuntimeSettings> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(RuntimeSettings::default());
        }
        Err(err) => return Err(ProjectError::io(path, err)),
    };
    Ok(toml::from_str(&text)?)
}

pub fn save_settings(settings: &RuntimeSettings, path: impl AsRef<Path>) -> ProjectResult<()> {
    let path = path.as_ref();
    let text = toml::to_string_pretty(settings)?;
    fs::write(path, text).map_err(|e| ProjectError::io(path, e))
}
