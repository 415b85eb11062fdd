pub mod mode;
pub mod surface;
pub mod transport;
pub mod timer;
pub mod subscription;
pub mod sync;
pub mod template;
pub mod actions;
pub mod diagnostics;
pub mod settings;
pub mod context;
pub mod memory;

/// Side effects the core hands back to the hosting application instead of
/// performing them itself.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeSideEffect {
    /// A script bound to a trigger fired; the host decides how to run it.
    RunScript {
        widget_id: String,
        name: String,
        content: String,
    },
    /// Panels were added or removed; an open property editor should reload
    /// the widget's dictionary.
    PanelsChanged { widget_id: String },
}

pub use mode::*;
pub use surface::*;
pub use transport::*;
pub use timer::*;
pub use subscription::*;
pub use sync::*;
pub use template::*;
pub use actions::*;
pub use diagnostics::*;
pub use settings::*;
pub use context::*;
