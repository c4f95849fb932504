pub mod cli;
pub mod commands;
pub mod constants;
pub mod engine;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod worker;
