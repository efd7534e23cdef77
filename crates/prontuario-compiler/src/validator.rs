//! Semantic validation of parsed records.
//!
//! The grammar only guarantees that every field is present; the rules here
//! check what each value says. Rules run in a fixed order and the first
//! violation aborts validation. A record is never modified.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use prontuario_types::well_known::{DATE_FORMAT, MAX_DOSAGE_MG, MIN_DOSAGE_MG};
use prontuario_types::{MedicalRecord, MedicationRef};
use regex::Regex;

use crate::types::{DateProblem, DosageProblem, ValidationError, ValidationResult};

static CPF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}$").expect("valid CPF pattern"));

static CID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9]{2}(\.[0-9])?$").expect("valid CID pattern"));

// ASCII digits only; the unit is matched case-insensitively ("500MG" is accepted)
static DOSAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9]+)\s*mg$").expect("valid dosage pattern"));

/// Validates a record against today's local date.
///
/// # Errors
/// Returns the first rule the record violates.
pub fn validate(record: &MedicalRecord) -> ValidationResult<()> {
    validate_at(record, Local::now().date_naive())
}

/// Validates a record, treating `today` as the latest acceptable
/// consultation date.
///
/// # Errors
/// Returns the first rule the record violates.
pub fn validate_at(record: &MedicalRecord, today: NaiveDate) -> ValidationResult<()> {
    check_cpf(&record.cpf)?;
    check_date(&record.consultation_date, today)?;
    check_cid(&record.cid)?;
    check_medication(&record.medication)?;
    check_dosage(&record.medication.dosage)?;
    Ok(())
}

fn check_cpf(value: &str) -> ValidationResult<()> {
    if CPF_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCpf {
            value: value.to_string(),
        })
    }
}

fn check_date(value: &str, today: NaiveDate) -> ValidationResult<()> {
    let invalid = |problem| ValidationError::InvalidDate {
        value: value.to_string(),
        problem,
    };

    let date =
        NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid(DateProblem::Malformed))?;
    if date > today {
        return Err(invalid(DateProblem::InFuture));
    }
    Ok(())
}

fn check_cid(value: &str) -> ValidationResult<()> {
    if CID_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCid {
            value: value.to_string(),
        })
    }
}

fn check_medication(medication: &MedicationRef) -> ValidationResult<()> {
    let fields = [
        ("name", &medication.name),
        ("form", &medication.form),
        ("manufacturer", &medication.manufacturer),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidMedication { field });
        }
    }
    Ok(())
}

/// Parses a dosage into milligrams and checks the permitted range.
pub(crate) fn dosage_mg(value: &str) -> Result<u64, DosageProblem> {
    let digits = DOSAGE_PATTERN
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .ok_or(DosageProblem::Malformed)?;

    // Only ASCII digits were captured, so the sole parse failure is overflow.
    let amount = digits
        .as_str()
        .parse::<u64>()
        .map_err(|_| DosageProblem::AboveMaximum)?;

    if amount < MIN_DOSAGE_MG {
        Err(DosageProblem::BelowMinimum)
    } else if amount > MAX_DOSAGE_MG {
        Err(DosageProblem::AboveMaximum)
    } else {
        Ok(amount)
    }
}

fn check_dosage(value: &str) -> ValidationResult<()> {
    dosage_mg(value)
        .map(|_| ())
        .map_err(|problem| ValidationError::InvalidDosage {
            value: value.to_string(),
            problem,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn record() -> MedicalRecord {
        MedicalRecord {
            patient: "Maria Silva".to_string(),
            cpf: "123.456.789-00".to_string(),
            consultation_date: "10/05/2024".to_string(),
            cid: "A12".to_string(),
            medication: MedicationRef {
                name: "Paracetamol".to_string(),
                dosage: "500mg".to_string(),
                form: "comprimido".to_string(),
                manufacturer: "AcmeLabs".to_string(),
            },
        }
    }

    fn with_dosage(dosage: &str) -> MedicalRecord {
        let mut record = record();
        record.medication.dosage = dosage.to_string();
        record
    }

    #[test]
    fn test_valid_record() {
        assert_eq!(validate_at(&record(), today()), Ok(()));
    }

    #[test]
    fn test_validate_uses_local_today() {
        // 10/05/2024 is in the past for any current clock.
        assert_eq!(validate(&record()), Ok(()));
    }

    #[test]
    fn test_dosage_boundaries() {
        assert_eq!(validate_at(&with_dosage("1mg"), today()), Ok(()));
        assert_eq!(validate_at(&with_dosage("1000mg"), today()), Ok(()));

        let zero = validate_at(&with_dosage("0mg"), today()).unwrap_err();
        assert!(matches!(
            zero,
            ValidationError::InvalidDosage {
                problem: DosageProblem::BelowMinimum,
                ..
            }
        ));

        let over = validate_at(&with_dosage("1001mg"), today()).unwrap_err();
        assert!(matches!(
            over,
            ValidationError::InvalidDosage {
                problem: DosageProblem::AboveMaximum,
                ..
            }
        ));
    }

    #[test]
    fn test_dosage_above_maximum_message() {
        let err = validate_at(&with_dosage("1200mg"), today()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::Dosage);
        assert!(err.to_string().contains("above permitted maximum"));
    }

    #[test]
    fn test_dosage_formats() {
        assert_eq!(dosage_mg("500mg"), Ok(500));
        assert_eq!(dosage_mg("500 mg"), Ok(500));
        assert_eq!(dosage_mg("500MG"), Ok(500));
        assert_eq!(dosage_mg("mg"), Err(DosageProblem::Malformed));
        assert_eq!(dosage_mg("500"), Err(DosageProblem::Malformed));
        assert_eq!(dosage_mg("500ml"), Err(DosageProblem::Malformed));
        assert_eq!(dosage_mg("5.5mg"), Err(DosageProblem::Malformed));
        assert_eq!(dosage_mg("-5mg"), Err(DosageProblem::Malformed));
        assert_eq!(
            dosage_mg("99999999999999999999999mg"),
            Err(DosageProblem::AboveMaximum)
        );
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        assert_eq!(dosage_mg("٥٠٠mg"), Err(DosageProblem::Malformed));

        let mut arabic_cpf = record();
        arabic_cpf.cpf = "١٢٣.٤٥٦.٧٨٩-٠٠".to_string();
        let err = validate_at(&arabic_cpf, today()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::Cpf);

        let mut arabic_cid = record();
        arabic_cid.cid = "A١٢".to_string();
        let err = validate_at(&arabic_cid, today()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::Cid);
    }

    #[test]
    fn test_today_passes_tomorrow_fails() {
        let mut record = record();
        record.consultation_date = "20/05/2024".to_string();
        assert_eq!(validate_at(&record, today()), Ok(()));

        record.consultation_date = "21/05/2024".to_string();
        let err = validate_at(&record, today()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidDate {
                value: "21/05/2024".to_string(),
                problem: DateProblem::InFuture,
            }
        );
    }

    #[test]
    fn test_malformed_dates() {
        for value in ["2024-05-10", "31/02/2024", "10/13/2024", "hoje"] {
            let mut record = record();
            record.consultation_date = value.to_string();
            let err = validate_at(&record, today()).unwrap_err();
            assert!(
                matches!(
                    err,
                    ValidationError::InvalidDate {
                        problem: DateProblem::Malformed,
                        ..
                    }
                ),
                "date {value}"
            );
        }
    }

    #[test]
    fn test_invalid_cpf() {
        for value in ["12345678900", "123.456.789/00", "abc.def.ghi-jk"] {
            let mut record = record();
            record.cpf = value.to_string();
            let err = validate_at(&record, today()).unwrap_err();
            assert_eq!(err.kind(), ValidationKind::Cpf, "cpf {value}");
        }
    }

    #[test]
    fn test_cid_shapes() {
        for value in ["A12", "J45.0", "Z99"] {
            let mut record = record();
            record.cid = value.to_string();
            assert_eq!(validate_at(&record, today()), Ok(()), "cid {value}");
        }
        for value in ["a12", "A1", "A-12", "A12.", "A123"] {
            let mut record = record();
            record.cid = value.to_string();
            let err = validate_at(&record, today()).unwrap_err();
            assert_eq!(err.kind(), ValidationKind::Cid, "cid {value}");
        }
    }

    #[test]
    fn test_blank_medication_field() {
        let mut record = record();
        record.medication.manufacturer = "  ".to_string();
        let err = validate_at(&record, today()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidMedication {
                field: "manufacturer"
            }
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut record = with_dosage("0mg");
        record.cpf = "bad".to_string();
        let err = validate_at(&record, today()).unwrap_err();
        assert_eq!(err.kind(), ValidationKind::Cpf);
    }

    #[test]
    fn test_record_is_not_modified() {
        let original = with_dosage("1200mg");
        let copy = original.clone();
        let _ = validate_at(&original, today());
        assert_eq!(original, copy);
    }
}
