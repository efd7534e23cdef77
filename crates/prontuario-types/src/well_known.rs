//! Well-known literals of the medical-note format.
//!
//! This module collects the fixed keywords and field tags of the note
//! sentence, the permitted dosage range, the consultation date format, and
//! the HTTP paths served by the medication directory.
//!
//! # Examples
//!
//! ```
//! use prontuario_types::well_known;
//!
//! assert_eq!(well_known::PATIENT_KEYWORD, "PACIENTE");
//! assert_eq!(well_known::CPF_TAG, "CPF:");
//! assert!(well_known::MIN_DOSAGE_MG <= well_known::MAX_DOSAGE_MG);
//! ```

// =============================================================================
// Keywords
// =============================================================================

/// Keyword opening the note; the patient name follows it.
pub const PATIENT_KEYWORD: &str = "PACIENTE";

/// Keyword introducing the consultation block.
pub const CONSULTATION_KEYWORD: &str = "CONSULTA";

/// Keyword introducing the prescribed medication; its name follows it.
pub const MEDICATION_KEYWORD: &str = "MEDICAMENTO";

// =============================================================================
// Field Tags
// =============================================================================

/// Tag preceding the patient's CPF (Brazilian taxpayer number).
pub const CPF_TAG: &str = "CPF:";

/// Tag preceding the consultation date.
pub const DATE_TAG: &str = "DATA:";

/// Tag preceding the ICD-10 (CID) diagnosis code.
pub const CID_TAG: &str = "CID:";

/// Tag preceding the prescribed dosage.
pub const DOSAGE_TAG: &str = "DOSAGEM:";

// =============================================================================
// Value Formats
// =============================================================================

/// The only dosage unit a note may use.
pub const DOSAGE_UNIT: &str = "mg";

/// Smallest dosage, in milligrams, a note may prescribe.
pub const MIN_DOSAGE_MG: u64 = 1;

/// Largest dosage, in milligrams, a note may prescribe.
pub const MAX_DOSAGE_MG: u64 = 1000;

/// `chrono` format string of the consultation date (`DD/MM/YYYY`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

// =============================================================================
// Medication Directory Paths
// =============================================================================

/// Collection path: `GET` lists entries, `POST` creates one.
pub const MEDICATIONS_PATH: &str = "/medications";

/// Lookup-by-name path; the medication name is appended as one segment.
pub const MEDICATION_SEARCH_PATH: &str = "/medications/search";
