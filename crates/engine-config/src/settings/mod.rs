pub mod markers;
pub mod validated;

pub use markers::Markers;
pub use validated::ValidatedSettings;
