pub mod cli;
pub mod config;
pub mod engine;
pub mod parser;
pub mod plugins;
pub mod rules;
pub mod types;
