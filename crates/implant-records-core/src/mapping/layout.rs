//! Fixed column layout of a patient row.
//!
//! [`LAYOUT`] is the single description of which field lives in which column.
//! Encoding, decoding and the blank-sheet headers all read from it.

use crate::models::{Operation, OperationKind, Patient};

use super::codec::{decode_list, encode_list};

/// What a single column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Id,
    FullName,
    ImplantCount,
    Dates(OperationKind),
    Numbers(OperationKind),
    Comment(OperationKind),
    ControlHalfYear,
    ControlYear,
    OccupationalHygiene,
}

use OperationKind::*;

/// Column `i` (0-based from column A) holds `LAYOUT[i]`.
pub const LAYOUT: [Slot; 27] = [
    Slot::Id,
    Slot::FullName,
    Slot::ImplantCount,
    Slot::Dates(Removal),
    Slot::Numbers(Removal),
    Slot::Comment(Removal),
    Slot::Dates(SinusLift),
    Slot::Numbers(SinusLift),
    Slot::Comment(SinusLift),
    Slot::Dates(BoneGrafting),
    Slot::Numbers(BoneGrafting),
    Slot::Comment(BoneGrafting),
    Slot::Dates(InstallationFormation),
    Slot::Numbers(InstallationFormation),
    Slot::Comment(InstallationFormation),
    Slot::Dates(ReinstallationImplant),
    Slot::Numbers(ReinstallationImplant),
    Slot::Comment(ReinstallationImplant),
    Slot::Dates(PermanentProsthetics),
    Slot::Numbers(PermanentProsthetics),
    Slot::Comment(PermanentProsthetics),
    Slot::Dates(TemporaryProsthetics),
    Slot::Numbers(TemporaryProsthetics),
    Slot::Comment(TemporaryProsthetics),
    Slot::ControlHalfYear,
    Slot::ControlYear,
    Slot::OccupationalHygiene,
];

/// Column of the identity cell.
pub const ID_COLUMN: usize = 0;

/// One cell to write into the target row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub col: u16,
    pub value: String,
}

impl Slot {
    /// Cell text for this slot, or `None` when the patient has nothing to say
    /// about it (an operation kind missing from the map).
    fn encode(&self, patient: &Patient) -> Option<String> {
        match self {
            Slot::Id => Some(patient.id.clone()),
            Slot::FullName => Some(patient.full_name.clone()),
            Slot::ImplantCount => Some(patient.implant_count.to_string()),
            Slot::Dates(kind) => patient.operation(*kind).map(|op| encode_list(&op.dates)),
            Slot::Numbers(kind) => patient.operation(*kind).map(|op| encode_list(&op.numbers)),
            Slot::Comment(kind) => patient.operation(*kind).map(|op| op.comment.clone()),
            Slot::ControlHalfYear => Some(patient.control_half_year.clone()),
            Slot::ControlYear => Some(patient.control_year.clone()),
            Slot::OccupationalHygiene => Some(patient.occupational_hygiene.clone()),
        }
    }

    fn decode(&self, patient: &mut Patient, text: &str) {
        match self {
            Slot::Id => patient.id = text.to_string(),
            Slot::FullName => patient.full_name = text.to_string(),
            Slot::ImplantCount => patient.implant_count = text.parse().unwrap_or(0),
            Slot::Dates(kind) => operation_mut(patient, *kind).dates = decode_list(text),
            Slot::Numbers(kind) => operation_mut(patient, *kind).numbers = decode_list(text),
            Slot::Comment(kind) => operation_mut(patient, *kind).comment = text.to_string(),
            Slot::ControlHalfYear => patient.control_half_year = text.to_string(),
            Slot::ControlYear => patient.control_year = text.to_string(),
            Slot::OccupationalHygiene => patient.occupational_hygiene = text.to_string(),
        }
    }

    /// Column header for the blank sheet.
    pub fn header(&self) -> &'static str {
        match self {
            Slot::Id => "ID",
            Slot::FullName => "Full name",
            Slot::ImplantCount => "Implants",
            Slot::Dates(_) => "Dates",
            Slot::Numbers(_) => "Teeth",
            Slot::Comment(_) => "Comment",
            Slot::ControlHalfYear => "Control (6 months)",
            Slot::ControlYear => "Control (1 year)",
            Slot::OccupationalHygiene => "Professional hygiene",
        }
    }
}

fn operation_mut(patient: &mut Patient, kind: OperationKind) -> &mut Operation {
    patient.operations.entry(kind).or_default()
}

/// Column of a slot.
pub fn column_of(slot: Slot) -> Option<u16> {
    LAYOUT.iter().position(|s| *s == slot).map(|idx| idx as u16)
}

/// Cells to write for a patient.
///
/// Operation kinds absent from `patient.operations` produce no assignments,
/// so whatever those cells held before is kept.
pub fn to_row(patient: &Patient) -> Vec<CellAssignment> {
    LAYOUT
        .iter()
        .enumerate()
        .filter_map(|(col, slot)| {
            slot.encode(patient).map(|value| CellAssignment {
                col: col as u16,
                value,
            })
        })
        .collect()
}

/// Decode a row. Every operation kind is present in the result, even when
/// all of its cells are empty.
pub fn from_row(cells: &[String]) -> Patient {
    let mut patient = Patient::default();
    for kind in OperationKind::ALL {
        patient.operations.insert(kind, Operation::default());
    }

    for (col, slot) in LAYOUT.iter().enumerate() {
        slot.decode(&mut patient, cell_text(cells, col));
    }

    patient
}

/// Whether a row holds a record (non-blank identity cell).
pub fn is_record(cells: &[String]) -> bool {
    !cell_text(cells, ID_COLUMN).is_empty()
}

/// Trimmed identity cell, empty when the row is too short.
pub fn identity_of(cells: &[String]) -> &str {
    cell_text(cells, ID_COLUMN)
}

fn cell_text(cells: &[String], col: usize) -> &str {
    cells.get(col).map(|c| c.trim()).unwrap_or("")
}

/// Header text for every column, in order.
pub fn column_headers() -> Vec<String> {
    LAYOUT.iter().map(|slot| slot.header().to_string()).collect()
}

/// Operation captions keyed by the first column of each operation group.
pub fn group_captions() -> Vec<(u16, String)> {
    OperationKind::ALL
        .iter()
        .filter_map(|kind| {
            column_of(Slot::Dates(*kind)).map(|col| (col, kind.caption().to_string()))
        })
        .collect()
}
