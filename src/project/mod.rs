pub mod driver;
pub mod manifest;
pub mod project;

pub use manifest::Manifest;
pub use project::*;
