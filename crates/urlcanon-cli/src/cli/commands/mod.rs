//! CLI command handlers. Each command is in its own file.

mod canon;
mod compare;
mod expand;

pub use canon::run_canon;
pub use compare::run_compare;
pub use expand::run_expand;
