//! Error model shared by every crate in the workspace.
//!
//! Running out of vehicles or leaving a zone unreachable is not an error:
//! planners return fewer assignments instead. A non-positive speed is not an
//! error either; it surfaces as an infinite ETA and the vehicle is skipped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One rejected field of one input item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    /// Position in the submitted batch; `None` for single-item calls.
    pub index: Option<usize>,
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            index: None,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "item {}: {}: {}", i + 1, self.field, self.reason),
            None => write!(f, "{}: {}", self.field, self.reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Zone,
    Vehicle,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Zone => f.write_str("zone"),
            Entity::Vehicle => f.write_str("vehicle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvacError {
    #[error("validation failed: {}", join_issues(.issues))]
    Validation { issues: Vec<FieldIssue> },

    #[error("{entity} `{reference}` not found")]
    NotFound { entity: Entity, reference: String },

    #[error("unknown planning strategy `{0}` (expected `greedy` or `weighted`)")]
    InvalidStrategy(String),

    #[error("invalid configuration value for {key}: `{value}`")]
    Config { key: String, value: String },

    #[error("planning service is not running")]
    ServiceUnavailable,
}

impl EvacError {
    pub fn validation(issues: Vec<FieldIssue>) -> Self {
        EvacError::Validation { issues }
    }

    pub fn zone_not_found(reference: &str) -> Self {
        EvacError::NotFound {
            entity: Entity::Zone,
            reference: reference.to_string(),
        }
    }

    pub fn vehicle_not_found(reference: &str) -> Self {
        EvacError::NotFound {
            entity: Entity::Vehicle,
            reference: reference.to_string(),
        }
    }

    /// Field-level issues for `Validation`, empty for every other variant.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            EvacError::Validation { issues } => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = EvacError> = std::result::Result<T, E>;
