pub mod defaults;
pub mod linter;
pub mod parser;
pub mod types;

pub use types::*;
