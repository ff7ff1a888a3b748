pub mod config;
pub mod errors;
pub mod lookup;
pub mod processor;
pub mod resolution;
pub mod rewrite;
pub mod types;
