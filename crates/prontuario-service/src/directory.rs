//! In-process medication directory.
//!
//! The directory owns its identifier sequence: every insert takes the next
//! id from the store itself, never from shared module state.

use std::sync::{Arc, RwLock};

use prontuario_compiler::{MedicationRegistry, RegistryError, RegistryResult};
use prontuario_types::{MedicationEntry, MedicationId, NewMedication};

/// Medication entries with an auto-increment identifier.
#[derive(Debug, Clone)]
pub struct MedicationDirectory {
    entries: Vec<MedicationEntry>,
    next_id: MedicationId,
}

impl Default for MedicationDirectory {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl MedicationDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a medication under the next identifier.
    pub fn insert(&mut self, medication: NewMedication) -> MedicationEntry {
        let entry = medication.into_entry(self.next_id);
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }

    /// Returns all entries in insertion order.
    pub fn entries(&self) -> &[MedicationEntry] {
        &self.entries
    }

    /// Finds an entry by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&MedicationEntry> {
        self.entries.iter().find(|e| e.matches_name(name))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A [`MedicationDirectory`] shared between request handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<RwLock<MedicationDirectory>>,
}

impl SharedDirectory {
    /// Wraps a directory for sharing.
    pub fn new(directory: MedicationDirectory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(directory)),
        }
    }

    /// Stores a medication under the next identifier.
    pub fn insert(&self, medication: NewMedication) -> RegistryResult<MedicationEntry> {
        let mut directory = self.inner.write().map_err(|_| poisoned())?;
        Ok(directory.insert(medication))
    }

    /// Returns a snapshot of all entries.
    pub fn list(&self) -> RegistryResult<Vec<MedicationEntry>> {
        let directory = self.inner.read().map_err(|_| poisoned())?;
        Ok(directory.entries().to_vec())
    }
}

fn poisoned() -> RegistryError {
    RegistryError::Backend("medication directory lock poisoned".to_string())
}

impl MedicationRegistry for SharedDirectory {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        let directory = self.inner.read().map_err(|_| poisoned())?;
        Ok(directory.find_by_name(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medication(name: &str) -> NewMedication {
        NewMedication {
            name: name.to_string(),
            dosage: "500mg".to_string(),
            form: "comprimido".to_string(),
            manufacturer: "AcmeLabs".to_string(),
        }
    }

    #[test]
    fn test_ids_auto_increment() {
        let mut directory = MedicationDirectory::new();
        assert!(directory.is_empty());
        assert_eq!(directory.insert(medication("Paracetamol")).id, 1);
        assert_eq!(directory.insert(medication("Dipirona")).id, 2);
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_directories_do_not_share_ids() {
        let mut first = MedicationDirectory::new();
        let mut second = MedicationDirectory::new();
        first.insert(medication("Paracetamol"));
        assert_eq!(second.insert(medication("Dipirona")).id, 1);
    }

    #[test]
    fn test_find_ignores_case() {
        let mut directory = MedicationDirectory::new();
        directory.insert(medication("Paracetamol"));
        assert!(directory.find_by_name("PARACETAMOL").is_some());
        assert!(directory.find_by_name("Xyzol").is_none());
    }

    #[test]
    fn test_shared_directory_as_registry() {
        let shared = SharedDirectory::default();
        let clone = shared.clone();
        clone.insert(medication("Paracetamol")).unwrap();

        let entry = shared.find_by_name("paracetamol").unwrap().unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(shared.list().unwrap().len(), 1);
        assert_eq!(shared.find_by_name("Xyzol").unwrap(), None);
    }
}
