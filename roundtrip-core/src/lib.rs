pub mod analysis;
pub mod config;
pub mod error;
pub mod explorer;
pub mod matcher;
pub mod models;
pub mod normalizer;
pub mod request;
pub mod source;
