pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod merge;
pub mod utils;
