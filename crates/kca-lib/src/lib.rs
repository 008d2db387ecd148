pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod tools;
pub mod unpack;
pub mod utils;

pub use config::Config;
pub use error::KcaError;
