pub mod commands;
pub mod detector;
pub mod evaluation;
pub mod models;
pub mod settings;
