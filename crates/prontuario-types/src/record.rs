//! Structured medical-note record.
//!
//! This module provides the `MedicalRecord` struct produced by a successful
//! parse of one medical note, together with the `MedicationRef` it embeds.

use std::fmt;

/// A medication as referenced by one consultation.
///
/// `name`, `form` and `manufacturer` are the directory's canonical values;
/// `dosage` is the amount written in the note itself.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MedicationRef {
    /// Canonical medication name.
    pub name: String,
    /// Dosage prescribed in this consultation, e.g. `500mg`.
    pub dosage: String,
    /// Pharmaceutical form, e.g. `comprimido`.
    pub form: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

/// The structured result of one medical note.
///
/// A record is only ever built from a complete note; every field holds the
/// unquoted text of the corresponding value in the source.
///
/// # Examples
///
/// ```
/// use prontuario_types::{MedicalRecord, MedicationRef};
///
/// let record = MedicalRecord {
///     patient: "Maria Silva".to_string(),
///     cpf: "123.456.789-00".to_string(),
///     consultation_date: "10/05/2024".to_string(),
///     cid: "A12".to_string(),
///     medication: MedicationRef {
///         name: "Paracetamol".to_string(),
///         dosage: "500mg".to_string(),
///         form: "comprimido".to_string(),
///         manufacturer: "AcmeLabs".to_string(),
///     },
/// };
///
/// assert_eq!(record.medication.dosage, "500mg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MedicalRecord {
    /// Patient name.
    pub patient: String,
    /// Patient CPF, e.g. `123.456.789-00`.
    pub cpf: String,
    /// Consultation date in `DD/MM/YYYY` form.
    pub consultation_date: String,
    /// ICD-10 (CID) diagnosis code.
    pub cid: String,
    /// Prescribed medication.
    pub medication: MedicationRef,
}

impl MedicalRecord {
    /// Returns the text stored for the given field.
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Patient => &self.patient,
            RecordField::Cpf => &self.cpf,
            RecordField::ConsultationDate => &self.consultation_date,
            RecordField::Cid => &self.cid,
            RecordField::Medication => &self.medication.name,
            RecordField::Dosage => &self.medication.dosage,
        }
    }
}

/// Fields of a [`MedicalRecord`] that are captured from note text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordField {
    /// The patient name.
    Patient,
    /// The patient CPF.
    Cpf,
    /// The consultation date.
    ConsultationDate,
    /// The CID code.
    Cid,
    /// The medication name.
    Medication,
    /// The medication dosage.
    Dosage,
}

impl RecordField {
    /// All captured fields, in sentence order.
    pub const ALL: [RecordField; 6] = [
        Self::Patient,
        Self::Cpf,
        Self::ConsultationDate,
        Self::Cid,
        Self::Medication,
        Self::Dosage,
    ];

    /// Returns a short human-readable name for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Cpf => "cpf",
            Self::ConsultationDate => "consultation date",
            Self::Cid => "cid",
            Self::Medication => "medication",
            Self::Dosage => "dosage",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
