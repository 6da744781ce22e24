pub mod config;
pub mod defaults;
pub mod error;
pub mod layout;
pub mod loader;
pub mod options;
pub mod settings;
