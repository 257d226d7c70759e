pub mod aws;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod initializer;
pub mod settings;
