use crate::{
    config::{ConfigFile, InputConfig, TargetConfig},
    defaults::{DEFAULT_DELIMITER, DEFAULT_HOST, DEFAULT_INPUT_TYPE, DEFAULT_TARGET_TYPE},
    error::ConfigError,
    layout::{
        Layout,
        fields::{
            InputField, TargetField, fields_from_header, fields_from_input,
            normalize_input_fields, normalize_target_fields,
        },
        input::InputLayout,
        kinds::{InputKind, TargetKind, TargetMode},
        target::{Connection, TargetHeader, TargetLayout},
    },
    settings::ValidatedSettings,
};
use model::core::tokens::strip_markers;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, warn};

/// Configuration normalized as far as possible without seeing the source.
///
/// Field injection needs the source header, so the final [`Layout`] is only
/// produced by [`PreparedConfig::materialize`].
#[derive(Debug, Clone)]
pub struct PreparedConfig {
    pub settings: ValidatedSettings,
    pub input: PreparedInput,
    pub targets: Vec<PreparedTarget>,
}

#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub kind: InputKind,
    pub delimiter: char,
    pub trim_spaces: bool,
    pub fields: Vec<InputField>,
}

#[derive(Debug, Clone)]
pub struct PreparedTarget {
    pub header: TargetHeader,
    pub fields: Vec<TargetField>,
}

impl PreparedInput {
    pub fn needs_injection(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PreparedTarget {
    pub fn needs_injection(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ConfigFile {
    pub fn prepare(&self) -> Result<PreparedConfig, ConfigError> {
        let settings = ValidatedSettings::from_config(self)?;
        let input = prepare_input(&self.input)?;

        let mut ids = HashSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for raw in &self.targets {
            let target = prepare_target(raw, settings.markers.reference)?;
            if !ids.insert(target.header.id.clone()) {
                return Err(ConfigError::DuplicateId {
                    scope: "target".to_string(),
                    id: target.header.id,
                });
            }
            targets.push(target);
        }

        Ok(PreparedConfig {
            settings,
            input,
            targets,
        })
    }
}

impl PreparedConfig {
    /// Completes the layout against the source header: injects fields where
    /// none were configured, then checks each target against its kind.
    pub fn materialize(&self, header: &[String]) -> Result<Layout, ConfigError> {
        let marker = self.settings.markers.reference;

        let (input_fields, input_injected) = if self.input.needs_injection() {
            info!(columns = header.len(), "No input fields configured, using source header");
            (normalize_input_fields(&fields_from_header(header))?, true)
        } else {
            (self.input.fields.clone(), false)
        };

        let input = InputLayout::new(
            self.input.kind,
            self.input.delimiter,
            self.input.trim_spaces,
            input_injected,
            input_fields,
        );

        let mut targets = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let (fields, injected) = if target.needs_injection() {
                info!(target_id = %target.header.id, "No target fields configured, mirroring input fields");
                let generated = fields_from_input(&input.fields, marker);
                (
                    normalize_target_fields(&target.header.id, &generated, marker)?,
                    true,
                )
            } else {
                (target.fields.clone(), false)
            };

            warn_unknown_references(&target.header.id, &fields, &input);

            let layout = TargetLayout::new(target.header.clone(), fields, injected);
            layout.validate()?;
            targets.push(Arc::new(layout));
        }

        Ok(Layout {
            settings: self.settings.clone(),
            input: Arc::new(input),
            targets,
        })
    }
}

/// Unknown references resolve to empty text at run time; report each once.
fn warn_unknown_references(target_id: &str, fields: &[TargetField], input: &InputLayout) {
    let mut reported = HashSet::new();
    for field in fields {
        for reference in &field.references {
            let id = strip_markers(reference);
            if input.position(id).is_none() && reported.insert(id) {
                warn!(
                    target_id,
                    field = %field.id,
                    reference = id,
                    "Reference does not match any input field and will resolve to empty text"
                );
            }
        }
    }
}

fn prepare_input(raw: &InputConfig) -> Result<PreparedInput, ConfigError> {
    let kind: InputKind = raw
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .unwrap_or(DEFAULT_INPUT_TYPE)
        .parse()?;

    Ok(PreparedInput {
        kind,
        delimiter: parse_delimiter(raw.delimiter.as_deref())?,
        trim_spaces: raw.trim_spaces,
        fields: normalize_input_fields(&raw.fields)?,
    })
}

fn parse_delimiter(raw: Option<&str>) -> Result<char, ConfigError> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_DELIMITER);
    };

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() => Ok(ch),
        _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
    }
}

fn prepare_target(raw: &TargetConfig, marker: char) -> Result<PreparedTarget, ConfigError> {
    if raw.name.is_empty() {
        return Err(ConfigError::MissingName {
            scope: "target".to_string(),
        });
    }

    let kind: TargetKind = raw
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .unwrap_or(DEFAULT_TARGET_TYPE)
        .parse()?;

    let id = raw
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(&raw.name)
        .to_string();

    let mode = resolve_mode(&id, raw.mode.as_deref(), raw.upsert)?;
    debug!(target_id = %id, %kind, %mode, "Resolved target");

    let connection = Connection {
        host: raw
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string(),
        port: raw.port.unwrap_or_else(|| kind.default_port()),
        username: raw.username.clone(),
        password: raw.password.clone(),
        database: raw.name.clone(),
    };

    let fields = normalize_target_fields(&id, &raw.fields, marker)?;

    Ok(PreparedTarget {
        header: TargetHeader {
            kind,
            id,
            name: raw.name.clone(),
            data_name: raw.data_name.clone(),
            connection,
            mode,
        },
        fields,
    })
}

/// Combines `mode` with the deprecated `upsert` flag.
fn resolve_mode(target: &str, mode: Option<&str>, upsert: bool) -> Result<TargetMode, ConfigError> {
    let explicit = mode
        .filter(|m| !m.is_empty())
        .map(|m| TargetMode::parse(target, m))
        .transpose()?;

    match (explicit, upsert) {
        (None, false) => Ok(TargetMode::Insert),
        (None, true) => {
            warn!(target_id = %target, "'upsert: true' is deprecated, use 'mode: upsert'");
            Ok(TargetMode::Upsert)
        }
        (Some(mode), false) | (Some(mode @ TargetMode::Upsert), true) => Ok(mode),
        (Some(mode), true) => Err(ConfigError::ConflictingMode {
            target: target.to_string(),
            mode: mode.to_string(),
        }),
    }
}
