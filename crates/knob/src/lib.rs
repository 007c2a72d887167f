pub mod config;
pub mod svg;
