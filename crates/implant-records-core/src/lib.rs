//! Implant Records Core Library
//!
//! Spreadsheet-backed record store for dental implant patients.
//!
//! # Architecture
//!
//! ```text
//!  Host app (save / list)
//!          │
//!          ▼
//!  ┌───────────────┐   ensure_exists / open / commit   ┌──────────────────┐
//!  │ PatientStore  │──────────────────────────────────▶│  WorkbookSource  │
//!  └───────┬───────┘                                    │  (xlsx, memory)  │
//!          │ rows                                       └──────────────────┘
//!          ▼
//!  ┌────────────────────────────────────────────────┐
//!  │ mapping: locate row · next identity · layout   │
//!  │          └──────── cell codec ────────┘        │
//!  └────────────────────────────────────────────────┘
//! ```
//!
//! One patient per row. Rows above `start_row` hold the title and headers;
//! at most `max_rows` records fit below them. Identities are decimal
//! integers, assigned as one more than the largest identity present.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Operation, OperationKind)
//! - [`mapping`]: Column layout, cell codec, row locator, identity generator
//! - [`sheet`]: Workbook backends and blank-sheet bootstrap
//! - [`store`]: Save/list orchestration and configuration

pub mod mapping;
pub mod models;
pub mod sheet;
pub mod store;

// Re-export commonly used types
pub use models::{Operation, OperationKind, Patient};
pub use sheet::{MemorySource, XlsxSource};
pub use store::{PatientStore, StoreConfig, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ImplantRecordsError {
    #[error("Open failed: {0}")]
    OpenFailed(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for ImplantRecordsError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Open(_) => ImplantRecordsError::OpenFailed(e.to_string()),
            StoreError::CapacityExceeded(_) => {
                ImplantRecordsError::CapacityExceeded(e.to_string())
            }
            StoreError::Commit(_) => ImplantRecordsError::CommitFailed(e.to_string()),
            StoreError::Config(_) => ImplantRecordsError::InvalidInput(e.to_string()),
        }
    }
}

impl From<store::ConfigError> for ImplantRecordsError {
    fn from(e: store::ConfigError) -> Self {
        ImplantRecordsError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for ImplantRecordsError {
    fn from(e: serde_json::Error) -> Self {
        ImplantRecordsError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ImplantRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ImplantRecordsError::OpenFailed(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the store at the given path, creating a blank one if needed.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<ImplantRecordsCore>, ImplantRecordsError> {
    ImplantRecordsCore::with_config(StoreConfig::at(path))
}

/// Open the store at the default desktop location.
#[uniffi::export]
pub fn open_default_store() -> Result<Arc<ImplantRecordsCore>, ImplantRecordsError> {
    ImplantRecordsCore::with_config(StoreConfig::default())
}

/// Open a store described by a TOML config document.
#[uniffi::export]
pub fn open_store_with_config_toml(
    toml: String,
) -> Result<Arc<ImplantRecordsCore>, ImplantRecordsError> {
    ImplantRecordsCore::with_config(StoreConfig::from_toml_str(&toml)?)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI. Calls are serialized through the lock.
#[derive(uniffi::Object)]
pub struct ImplantRecordsCore {
    store: Arc<Mutex<PatientStore<XlsxSource>>>,
}

impl ImplantRecordsCore {
    fn with_config(config: StoreConfig) -> Result<Arc<Self>, ImplantRecordsError> {
        let store = PatientStore::open_xlsx(config)?;
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
        }))
    }
}

#[uniffi::export]
impl ImplantRecordsCore {
    /// Save a patient; returns its identity (newly assigned if it had none).
    pub fn save_patient(&self, patient: FfiPatient) -> Result<String, ImplantRecordsError> {
        let patient = Patient::try_from(patient)?;
        let store = self.store.lock()?;
        Ok(store.save(&patient)?)
    }

    /// Save a patient given in the host's JSON form.
    pub fn save_patient_json(&self, json: String) -> Result<String, ImplantRecordsError> {
        let patient = Patient::from_json(&json)?;
        let store = self.store.lock()?;
        Ok(store.save(&patient)?)
    }

    /// All patients in sheet order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, ImplantRecordsError> {
        let store = self.store.lock()?;
        let patients = store.list_all()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// All patients as a JSON array.
    pub fn list_patients_json(&self) -> Result<String, ImplantRecordsError> {
        let store = self.store.lock()?;
        let patients = store.list_all()?;
        Ok(models::patients_to_json(&patients)?)
    }

    /// Get a patient by identity.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, ImplantRecordsError> {
        let store = self.store.lock()?;
        let patient = store.get(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Path of the backing spreadsheet.
    pub fn store_path(&self) -> Result<String, ImplantRecordsError> {
        let store = self.store.lock()?;
        Ok(store.config().path.display().to_string())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe operation.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiOperation {
    pub dates: Vec<String>,
    pub numbers: Vec<String>,
    pub comment: String,
}

impl From<Operation> for FfiOperation {
    fn from(op: Operation) -> Self {
        Self {
            dates: op.dates,
            numbers: op.numbers,
            comment: op.comment,
        }
    }
}

impl From<FfiOperation> for Operation {
    fn from(op: FfiOperation) -> Self {
        Operation {
            dates: op.dates,
            numbers: op.numbers,
            comment: op.comment,
        }
    }
}

/// FFI-safe patient. `operations` is keyed by operation kind name
/// (`removal`, `sinusLift`, ...).
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub full_name: String,
    pub implant_count: u32,
    pub operations: HashMap<String, FfiOperation>,
    pub control_half_year: String,
    pub control_year: String,
    pub occupational_hygiene: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name,
            implant_count: patient.implant_count,
            operations: patient
                .operations
                .into_iter()
                .map(|(kind, op)| (kind.key().to_string(), op.into()))
                .collect(),
            control_half_year: patient.control_half_year,
            control_year: patient.control_year,
            occupational_hygiene: patient.occupational_hygiene,
        }
    }
}

impl TryFrom<FfiPatient> for Patient {
    type Error = ImplantRecordsError;

    fn try_from(patient: FfiPatient) -> Result<Self, Self::Error> {
        let operations: BTreeMap<OperationKind, Operation> = patient
            .operations
            .into_iter()
            .map(|(key, op)| {
                key.parse::<OperationKind>()
                    .map(|kind| (kind, Operation::from(op)))
                    .map_err(|e| ImplantRecordsError::InvalidInput(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        Ok(Patient {
            id: patient.id,
            full_name: patient.full_name,
            implant_count: patient.implant_count,
            operations,
            control_half_year: patient.control_half_year,
            control_year: patient.control_year,
            occupational_hygiene: patient.occupational_hygiene,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffi_patient(operations: HashMap<String, FfiOperation>) -> FfiPatient {
        FfiPatient {
            id: String::new(),
            full_name: "Volkova Irina".into(),
            implant_count: 1,
            operations,
            control_half_year: String::new(),
            control_year: String::new(),
            occupational_hygiene: String::new(),
        }
    }

    #[test]
    fn test_ffi_patient_conversion() {
        let mut ops = HashMap::new();
        ops.insert(
            "boneGrafting".to_string(),
            FfiOperation {
                dates: vec!["05.05.2024".into()],
                numbers: vec!["14".into()],
                comment: "membrane".into(),
            },
        );

        let patient = Patient::try_from(ffi_patient(ops.clone())).unwrap();
        let graft = patient.operation(OperationKind::BoneGrafting).unwrap();
        assert_eq!(graft.comment, "membrane");

        let back: FfiPatient = patient.into();
        assert_eq!(back.operations, ops);
    }

    #[test]
    fn test_unknown_ffi_operation_rejected() {
        let mut ops = HashMap::new();
        ops.insert(
            "whitening".to_string(),
            FfiOperation {
                dates: vec![],
                numbers: vec![],
                comment: String::new(),
            },
        );

        let result = Patient::try_from(ffi_patient(ops));
        assert!(matches!(result, Err(ImplantRecordsError::InvalidInput(_))));
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ImplantRecordsError = StoreError::CapacityExceeded(
            mapping::CapacityExceeded { max_rows: 1000 },
        )
        .into();
        assert!(matches!(err, ImplantRecordsError::CapacityExceeded(_)));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_ffi_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Implants.xlsx");
        let core = open_store(path.display().to_string()).unwrap();

        let id = core.save_patient(ffi_patient(HashMap::new())).unwrap();
        assert_eq!(id, "1");

        let json_id = core
            .save_patient_json(r#"{"fio": "Zaitsev Roman", "implantNumber": 2}"#.into())
            .unwrap();
        assert_eq!(json_id, "2");

        let listed = core.list_patients().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].operations.len(), 7);
        assert_eq!(listed[1].implant_count, 2);

        let found = core.get_patient("2".into()).unwrap().unwrap();
        assert_eq!(found.full_name, "Zaitsev Roman");

        let json: serde_json::Value =
            serde_json::from_str(&core.list_patients_json().unwrap()).unwrap();
        assert_eq!(json[0]["fio"], "Volkova Irina");
    }
}
