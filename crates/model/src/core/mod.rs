pub mod data_type;
pub mod tokens;
pub mod value;
