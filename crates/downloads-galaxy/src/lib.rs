//! Scan a folder, classify what is in it and serve the summary as JSON.

pub mod classify;
pub mod scanner;
pub mod server;
pub mod settings;
pub mod size;
