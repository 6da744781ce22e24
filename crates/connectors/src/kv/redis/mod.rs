pub mod adapter;
pub mod destination;
