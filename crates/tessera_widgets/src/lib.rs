pub mod options;
pub mod layers;
pub mod registry;
pub mod builtins;
pub mod widget;
pub mod render;
pub mod container;
pub mod composite;
pub mod screen;

pub use options::*;
pub use registry::*;
pub use widget::*;
pub use layers::{FunctionParam, FunctionSpec};
pub use render::RenderStrategy;
pub use screen::*;
