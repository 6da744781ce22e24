pub mod adapter;
pub mod destination;
pub mod dry_run;
pub mod error;
pub mod file;
pub mod kv;
pub mod source;
pub mod sql;
