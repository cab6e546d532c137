pub mod app;
pub mod commands;
pub mod config;
pub mod effects;
pub mod logging;
pub mod ui;
