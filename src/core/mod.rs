pub mod diagnostics;
pub mod discovery;
