//! Command handlers, kept out of main.rs for testability

pub mod config;
pub mod run;

pub use config::{execute_config, load_scenario};
pub use run::{apply_overrides, execute_run, finish, session_config};
