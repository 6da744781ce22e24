pub mod processor;
pub mod state;
pub mod summary;
pub mod uploader;

pub use uploader::{Uploader, run};
