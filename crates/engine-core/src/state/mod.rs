pub mod checkpoint;

pub use checkpoint::Checkpoint;
