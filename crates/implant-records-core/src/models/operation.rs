//! Clinical operation models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The seven fixed categories of clinical procedure tracked per patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Tooth removal
    Removal,
    /// Sinus lift
    SinusLift,
    /// Bone grafting
    BoneGrafting,
    /// Implant installation with gingiva former
    InstallationFormation,
    /// Repeated implant installation
    ReinstallationImplant,
    /// Permanent prosthetics
    PermanentProsthetics,
    /// Temporary prosthetics
    TemporaryProsthetics,
}

impl OperationKind {
    /// All kinds, in sheet column order.
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Removal,
        OperationKind::SinusLift,
        OperationKind::BoneGrafting,
        OperationKind::InstallationFormation,
        OperationKind::ReinstallationImplant,
        OperationKind::PermanentProsthetics,
        OperationKind::TemporaryProsthetics,
    ];

    /// Wire key used by the host application.
    pub fn key(&self) -> &'static str {
        match self {
            OperationKind::Removal => "removal",
            OperationKind::SinusLift => "sinusLift",
            OperationKind::BoneGrafting => "boneGrafting",
            OperationKind::InstallationFormation => "installationFormation",
            OperationKind::ReinstallationImplant => "reinstallationImplant",
            OperationKind::PermanentProsthetics => "permanentProsthetics",
            OperationKind::TemporaryProsthetics => "temporaryProsthetics",
        }
    }

    /// Human-readable caption for sheet headers.
    pub fn caption(&self) -> &'static str {
        match self {
            OperationKind::Removal => "Removal",
            OperationKind::SinusLift => "Sinus lift",
            OperationKind::BoneGrafting => "Bone grafting",
            OperationKind::InstallationFormation => "Installation + formation",
            OperationKind::ReinstallationImplant => "Implant reinstallation",
            OperationKind::PermanentProsthetics => "Permanent prosthetics",
            OperationKind::TemporaryProsthetics => "Temporary prosthetics",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown operation key.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown operation kind: {0}")]
pub struct UnknownOperationKind(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownOperationKind(s.to_string()))
    }
}

/// A single procedure instance: dates and tooth numbers, plus a free-text comment.
///
/// `dates` and `numbers` are parallel by convention only; their lengths may differ.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Operation {
    pub dates: Vec<String>,
    pub numbers: Vec<String>,
    pub comment: String,
}

impl Operation {
    pub fn new(dates: Vec<String>, numbers: Vec<String>, comment: impl Into<String>) -> Self {
        Self {
            dates,
            numbers,
            comment: comment.into(),
        }
    }

    /// True when no dates, numbers or comment are recorded.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.numbers.is_empty() && self.comment.is_empty()
    }
}
