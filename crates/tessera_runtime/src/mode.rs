use serde::{Deserialize, Serialize};

/// Operating context of a screen. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkMode {
    Test,
    #[default]
    Display,
    Editor,
    Control,
}

impl WorkMode {
    pub fn as_str(&self) -> &str {
        match self {
            WorkMode::Test => "test",
            WorkMode::Display => "display",
            WorkMode::Editor => "editor",
            WorkMode::Control => "control",
        }
    }

    pub fn from_name(name: &str) -> Option<WorkMode> {
        match name.to_lowercase().as_str() {
            "test" | "0" => Some(WorkMode::Test),
            "display" | "1" => Some(WorkMode::Display),
            "editor" | "2" => Some(WorkMode::Editor),
            "control" | "3" => Some(WorkMode::Control),
            _ => None,
        }
    }

    pub fn subscribes_data(&self) -> bool {
        matches!(self, WorkMode::Display | WorkMode::Control)
    }

    pub fn syncs_events(&self) -> bool {
        !matches!(self, WorkMode::Editor)
    }

    pub fn runs_scripts(&self) -> bool {
        !matches!(self, WorkMode::Editor)
    }

    /// Control-mode widgets drop their subscription after the first payload.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, WorkMode::Control)
    }
}

impl From<WorkMode> for u8 {
    fn from(mode: WorkMode) -> u8 {
        match mode {
            WorkMode::Test => 0,
            WorkMode::Display => 1,
            WorkMode::Editor => 2,
            WorkMode::Control => 3,
        }
    }
}

impl TryFrom<u8> for WorkMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WorkMode::Test),
            1 => Ok(WorkMode::Display),
            2 => Ok(WorkMode::Editor),
            3 => Ok(WorkMode::Control),
            other => Err(format!("unknown work mode {other}")),
        }
    }
}
