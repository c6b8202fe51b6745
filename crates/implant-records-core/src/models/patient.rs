//! Patient models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::operation::{Operation, OperationKind};

/// A patient record, one per data row of the implant sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Patient {
    /// Numeric identity as text; empty until the store assigns one
    pub id: String,
    /// Full name
    #[serde(rename = "fio")]
    pub full_name: String,
    /// Number of implants placed
    #[serde(rename = "implantNumber", alias = "implantCount")]
    pub implant_count: u32,
    /// Recorded operations; kinds missing here are left untouched on save
    pub operations: BTreeMap<OperationKind, Operation>,
    /// Six-month control visit
    #[serde(rename = "controlHalfYear")]
    pub control_half_year: String,
    /// One-year control visit
    #[serde(rename = "controlYear")]
    pub control_year: String,
    /// Professional hygiene status
    #[serde(rename = "occupationalHygiene")]
    pub occupational_hygiene: String,
}

impl Patient {
    /// Create a new, unsaved patient.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    /// Check if the store has assigned an identity yet.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Builder-style helper to attach an operation.
    pub fn with_operation(mut self, kind: OperationKind, operation: Operation) -> Self {
        self.operations.insert(kind, operation);
        self
    }

    /// Get an operation by kind.
    pub fn operation(&self, kind: OperationKind) -> Option<&Operation> {
        self.operations.get(&kind)
    }

    /// Parse from the host application's JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Export to the host application's JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Export a patient list as a JSON array.
pub fn patients_to_json(patients: &[Patient]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(patients)
}
