//! Documented defaults applied while normalizing a configuration file.

pub const DEFAULT_BATCH_SIZE: usize = 250;
/// Pause between batches, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 1000;

pub const DEFAULT_ENVAR_TOKEN: char = '$';
pub const DEFAULT_REFERENCE_TOKEN: char = '^';

pub const DEFAULT_INPUT_TYPE: &str = "csv";
pub const DEFAULT_DELIMITER: char = ',';

pub const DEFAULT_TARGET_TYPE: &str = "mysql";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;
pub const DEFAULT_REDIS_PORT: u16 = 6379;

pub const DEFAULT_CHECKPOINT_PATH: &str = ".checkpoint";
