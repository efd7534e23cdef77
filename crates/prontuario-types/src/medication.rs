//! Medication directory entry types.
//!
//! These mirror the payloads exchanged with the medication directory
//! service: `MedicationEntry` is what the directory serves, `NewMedication`
//! is what a client submits to create one.

use crate::{MedicationId, MedicationRef};

/// A medication as stored in the directory.
///
/// # Examples
///
/// ```
/// use prontuario_types::MedicationEntry;
///
/// let entry = MedicationEntry {
///     id: 1,
///     name: "Paracetamol".to_string(),
///     dosage: "750mg".to_string(),
///     form: "comprimido".to_string(),
///     manufacturer: "AcmeLabs".to_string(),
/// };
///
/// // The note's own dosage wins over the directory default.
/// let reference = entry.to_reference("500mg");
/// assert_eq!(reference.dosage, "500mg");
/// assert_eq!(reference.form, "comprimido");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MedicationEntry {
    /// Identifier assigned by the directory.
    pub id: MedicationId,
    /// Canonical name.
    pub name: String,
    /// Default dosage listed by the directory.
    pub dosage: String,
    /// Pharmaceutical form.
    pub form: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

impl MedicationEntry {
    /// Returns true if `name` refers to this entry, ignoring case.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Builds the record-level reference for a consultation that prescribed
    /// `dosage`.
    pub fn to_reference(&self, dosage: impl Into<String>) -> MedicationRef {
        MedicationRef {
            name: self.name.clone(),
            dosage: dosage.into(),
            form: self.form.clone(),
            manufacturer: self.manufacturer.clone(),
        }
    }
}

/// Payload for creating a directory entry.
///
/// Carries no identifier; the directory assigns one on insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewMedication {
    /// Canonical name.
    pub name: String,
    /// Default dosage.
    pub dosage: String,
    /// Pharmaceutical form.
    pub form: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

impl NewMedication {
    /// Turns this payload into a stored entry with the given identifier.
    pub fn into_entry(self, id: MedicationId) -> MedicationEntry {
        MedicationEntry {
            id,
            name: self.name,
            dosage: self.dosage,
            form: self.form,
            manufacturer: self.manufacturer,
        }
    }
}
