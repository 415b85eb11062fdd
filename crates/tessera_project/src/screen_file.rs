//! Screen definition files.
//!
//! A screen file is the JSON form of `ScreenDefinition`. Files may also hold a
//! bare component list, in which case the screen takes its name from the file
//! stem and runs in display mode.

use crate::errors::{ProjectError, ProjectResult};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tessera_runtime::WorkMode;
use tessera_widgets::{ScreenDefinition, WidgetOptions};
use tracing::{debug, info};

pub const SCREEN_EXTENSION: &str = "json";

pub fn parse_screen(json: &str, fallback_name: &str) -> ProjectResult<ScreenDefinition> {
    let value: Value = serde_json::from_str(json)?;
    let mut definition = match value {
        Value::Array(_) => {
            let components: Vec<WidgetOptions> = serde_json::from_value(value)?;
            ScreenDefinition {
                components,
                ..ScreenDefinition::new("", WorkMode::Display)
            }
        }
        other => serde_json::from_value(other)?,
    };
    if definition.name.is_empty() {
        definition.name = fallback_name.to_string();
    }
    Ok(definition)
}

pub fn load_screen(path: impl AsRef<Path>) -> ProjectResult<ScreenDefinition> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !extension.eq_ignore_ascii_case(SCREEN_EXTENSION) {
        return Err(ProjectError::UnsupportedFormat(path.display().to_string()));
    }
    let json = fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("screen");
    let definition = parse_screen(&json, stem)?;
    info!(
        path = %path.display(),
        screen = %definition.name,
        components = definition.components.len(),
        "screen loaded"
    );
    Ok(definition)
}

pub fn save_screen(definition: &ScreenDefinition, path: impl AsRef<Path>) -> ProjectResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(definition)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
    }
    fs::write(path, json).map_err(|e| ProjectError::io(path, e))?;
    debug!(path = %path.display(), "screen saved");
    Ok(())
}
