pub mod commands;
pub mod config;
pub mod disk;
pub mod notify;
pub mod size;
pub mod vbox;
