pub mod schema;
pub mod dictionary;
pub mod path;
pub mod merge;
pub mod store;
pub mod error;

pub use schema::*;
pub use dictionary::*;
pub use path::*;
pub use merge::*;
pub use store::*;
pub use error::*;
