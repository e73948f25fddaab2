pub mod cli;
pub mod config;
pub mod observe;
pub mod payload;
pub mod state;
