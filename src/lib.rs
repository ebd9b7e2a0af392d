// Reusable library API — the CLI in main.rs is a thin front end over this.
pub mod cell;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod fill;
pub mod grid;
pub mod log;
mod rules;
