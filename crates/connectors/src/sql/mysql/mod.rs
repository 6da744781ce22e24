pub mod adapter;
pub mod destination;
pub mod params;
pub mod query;
