pub mod commands;
pub mod config;
pub mod error;
pub mod keyring;
pub mod platform;
pub mod settings;
pub mod store;
pub mod timesheet;
pub mod utils;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, ValueEnum, Debug, Default, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
