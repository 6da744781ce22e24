pub mod connectors;
pub mod error;
pub mod hooks;
pub mod resolve;
pub mod state;
