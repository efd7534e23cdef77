//! Medication directory identifier type.
//!
//! Identifiers are assigned by the directory that stores the entry, never by
//! the client creating it.

/// Identifier of an entry in the medication directory.
///
/// # Examples
///
/// ```
/// use prontuario_types::MedicationId;
///
/// let first: MedicationId = 1;
/// let second: MedicationId = first + 1;
/// assert_eq!(second, 2);
/// ```
pub type MedicationId = u64;
