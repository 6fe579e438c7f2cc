// Claude OAuth step - Library root for testing

pub mod action;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod prompt;
pub mod secrets;
pub mod workflow;
