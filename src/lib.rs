pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod discovery;
pub mod error;
pub mod execution;
pub mod logging;
pub mod math;
pub mod observability;
pub mod strategy;
pub mod types;
