pub mod errors;
pub mod screen_file;
pub mod settings_file;

pub use errors::*;
pub use screen_file::*;
pub use settings_file::*;
