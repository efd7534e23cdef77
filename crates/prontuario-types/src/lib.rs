//! # prontuario-types
//!
//! Type definitions for structured medical-note records.
//!
//! This crate provides the records produced by compiling a medical note
//! (patient, CPF, consultation date, CID code and prescribed medication) and
//! the entries served by the medication directory.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use prontuario_types::{MedicationEntry, NewMedication, RecordField};
//! use prontuario_types::well_known;
//!
//! let entry: MedicationEntry = NewMedication {
//!     name: "Paracetamol".to_string(),
//!     dosage: "750mg".to_string(),
//!     form: "comprimido".to_string(),
//!     manufacturer: "AcmeLabs".to_string(),
//! }
//! .into_entry(1);
//!
//! assert!(entry.matches_name("paracetamol"));
//! assert_eq!(well_known::MAX_DOSAGE_MG, 1000);
//! assert_eq!(RecordField::Cpf.as_str(), "cpf");
//! ```
//!
//! ## Without Serde
//!
//! ```toml
//! [dependencies]
//! prontuario-types = { version = "0.1", default-features = false }
//! ```

#![warn(missing_docs)]

mod medication;
mod medication_id;
mod record;
pub mod well_known;

// Re-export all public types at crate root
pub use medication::{MedicationEntry, NewMedication};
pub use medication_id::MedicationId;
pub use record::{MedicalRecord, MedicationRef, RecordField};
