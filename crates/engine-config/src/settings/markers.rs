use crate::{
    defaults::{DEFAULT_ENVAR_TOKEN, DEFAULT_REFERENCE_TOKEN},
    error::ConfigError,
};
use serde::Serialize;

/// The two single-character delimiters used by the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Markers {
    /// Surrounds environment placeholders in the raw file, `$NAME$`.
    pub envar: char,
    /// Surrounds input field references in target templates, `^id^`.
    pub reference: char,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            envar: DEFAULT_ENVAR_TOKEN,
            reference: DEFAULT_REFERENCE_TOKEN,
        }
    }
}

impl Markers {
    pub fn from_raw(envar: Option<&str>, reference: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Markers {
            envar: parse_marker("envarToken", envar, DEFAULT_ENVAR_TOKEN)?,
            reference: parse_marker("referenceToken", reference, DEFAULT_REFERENCE_TOKEN)?,
        })
    }
}

/// Empty or absent falls back to `default`; anything longer than one
/// character is rejected.
pub fn parse_marker(
    key: &'static str,
    raw: Option<&str>,
    default: char,
) -> Result<char, ConfigError> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(default);
    };

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(ConfigError::InvalidMarker {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_empty_uses_defaults() {
        let markers = Markers::from_raw(None, Some("")).unwrap();
        assert_eq!(markers, Markers::default());
        assert_eq!(markers.envar, '$');
        assert_eq!(markers.reference, '^');
    }

    #[test]
    fn accepts_single_multibyte_character() {
        let markers = Markers::from_raw(Some("§"), Some("#")).unwrap();
        assert_eq!(markers.envar, '§');
        assert_eq!(markers.reference, '#');
    }

    #[test]
    fn rejects_longer_markers() {
        let err = Markers::from_raw(None, Some("^^")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidMarker {
                key: "referenceToken",
                ..
            }
        ));
    }
}
