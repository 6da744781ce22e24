use crate::error::CliError;
use std::{collections::HashMap, path::Path};

/// Variables available to `$NAME$` placeholders in the config file: the
/// process environment, optionally overlaid by a `.env` style file.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        EnvManager {
            vars: std::env::vars().collect(),
        }
    }

    /// Entries from the file replace process variables of the same name.
    pub fn load_file(&mut self, path: &Path) -> Result<(), CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Env(format!("failed to read env file {}: {}", path.display(), e))
        })?;
        self.parse(&content)
    }

    pub fn into_vars(self) -> HashMap<String, String> {
        self.vars
    }

    fn parse(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Env(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Env(format!("empty key at line {}", line_num + 1)));
            }

            self.vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
