//! Normalized, immutable view of the configuration that the pipeline runs on.

pub mod builder;
pub mod fields;
pub mod input;
pub mod kinds;
pub mod order;
pub mod target;

pub use builder::{PreparedConfig, PreparedInput, PreparedTarget};
pub use fields::{InputField, TargetField};
pub use input::InputLayout;
pub use kinds::{InputKind, TargetKind, TargetMode};
pub use target::{Connection, TargetHeader, TargetLayout};

use crate::settings::ValidatedSettings;
use serde::Serialize;
use std::sync::Arc;

/// The fully resolved configuration. Built once during setup and only read
/// afterwards; targets are shared with their writers and processors.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub settings: ValidatedSettings,
    pub input: Arc<InputLayout>,
    pub targets: Vec<Arc<TargetLayout>>,
}

impl Layout {
    pub fn target(&self, id: &str) -> Option<&Arc<TargetLayout>> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_ids(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.id.clone()).collect()
    }
}
