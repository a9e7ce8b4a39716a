pub mod config;
pub mod errors;
pub mod merge;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;
pub mod xmltv;
