//! Command handlers -- one module per subcommand

pub mod config;
pub mod formats;
pub mod run;
