use crate::{
    config::ConfigFile, defaults::DEFAULT_ENVAR_TOKEN, error::ConfigError,
    settings::markers::parse_marker,
};
use model::core::tokens::{scan, strip_markers};
use std::{collections::HashMap, path::Path, str::FromStr};
use tracing::{debug, warn};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigType {
    #[default]
    Yaml,
}

impl FromStr for ConfigType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigType::Yaml),
            other => Err(ConfigError::UnknownConfigType(other.to_string())),
        }
    }
}

/// Reads a configuration file, substituting `$NAME$` placeholders from the
/// supplied environment before deserializing it.
pub struct ConfigLoader {
    config_type: ConfigType,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    pub fn new(config_type: ConfigType, env: HashMap<String, String>) -> Self {
        ConfigLoader { config_type, env }
    }

    pub fn load(&self, path: &Path) -> Result<ConfigFile, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&raw)
    }

    pub fn parse_str(&self, raw: &str) -> Result<ConfigFile, ConfigError> {
        match self.config_type {
            ConfigType::Yaml => {
                let marker = peek_envar_token(raw)?;
                let substituted = inject_env(raw, marker, &self.env);
                Ok(serde_yaml::from_str(&substituted)?)
            }
        }
    }
}

/// Replaces every `marker`-delimited placeholder in `raw` with the value of
/// the named variable. Unknown variables become empty strings.
///
/// Placeholders never span lines, so the `envarToken` declaration itself
/// cannot pair with a later placeholder.
pub fn inject_env(raw: &str, marker: char, env: &HashMap<String, String>) -> String {
    raw.split_inclusive('\n')
        .map(|line| inject_line(line, marker, env))
        .collect()
}

fn inject_line(line: &str, marker: char, env: &HashMap<String, String>) -> String {
    let mut out = line.to_string();

    for placeholder in scan(line, marker) {
        let key = strip_markers(&placeholder);
        let value = match env.get(key) {
            Some(value) => value.as_str(),
            None => {
                warn!(variable = %key, "Environment variable not set, substituting empty string");
                ""
            }
        };
        debug!(variable = %key, "Substituting environment variable");
        out = out.replace(&placeholder, value);
    }

    out
}

/// The placeholder marker must be known before substitution, so it is read
/// from the unsubstituted document. A document that does not parse yet falls
/// back to the default marker; the real parse reports the error.
fn peek_envar_token(raw: &str) -> Result<char, ConfigError> {
    let token = serde_yaml::from_str::<serde_yaml::Value>(raw)
        .ok()
        .and_then(|doc| {
            doc.get("envarToken")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

    parse_marker("envarToken", token.as_deref(), DEFAULT_ENVAR_TOKEN)
}
