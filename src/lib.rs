pub mod assets;
pub mod config;
pub mod error;
pub mod games;
pub mod input;
pub mod logging;
pub mod render;
pub mod runner;
