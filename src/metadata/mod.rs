mod loader;
mod manifest;
mod parser;

pub use loader::*;
pub use manifest::*;
pub use parser::*;
