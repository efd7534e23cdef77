//! The full lex, parse, validate pipeline.

use chrono::{Local, NaiveDate};
use prontuario_types::MedicalRecord;

use crate::lexer::tokenize;
use crate::parser::parse_tokens;
use crate::registry::MedicationRegistry;
use crate::types::{CompileError, CompileResult, LexicalError};
use crate::validator::validate_at;

/// The outcome of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    /// The validated record.
    pub record: MedicalRecord,
    /// Characters the lexer skipped on the way.
    pub diagnostics: Vec<LexicalError>,
}

/// Compiles medical notes into validated records.
///
/// Holds no per-note state; one compiler can serve any number of notes,
/// concurrently if the registry allows it.
///
/// # Example
///
/// ```
/// use prontuario_compiler::{InMemoryRegistry, NoteCompiler};
/// use prontuario_types::NewMedication;
///
/// let registry = InMemoryRegistry::new().with(NewMedication {
///     name: "Paracetamol".to_string(),
///     dosage: "750mg".to_string(),
///     form: "comprimido".to_string(),
///     manufacturer: "AcmeLabs".to_string(),
/// });
/// let compiler = NoteCompiler::new(registry);
///
/// let note = r#"PACIENTE "Maria Silva" CPF:"123.456.789-00" CONSULTA
/// DATA:"10/05/2024" CID:"A12" MEDICAMENTO "Paracetamol" DOSAGEM:"500mg""#;
/// let compilation = compiler.compile(note).unwrap();
/// assert_eq!(compilation.record.medication.form, "comprimido");
/// ```
#[derive(Debug, Clone)]
pub struct NoteCompiler<R> {
    registry: R,
}

impl<R: MedicationRegistry> NoteCompiler<R> {
    /// Creates a compiler resolving medications through `registry`.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Returns the registry this compiler resolves medications through.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Compiles one note, validating dates against today's local date.
    ///
    /// # Errors
    /// Returns a [`CompileError`] if the note does not parse or violates a
    /// validation rule. Lexical diagnostics alone never fail a compilation.
    pub fn compile(&self, text: &str) -> CompileResult<Compilation> {
        self.compile_at(text, Local::now().date_naive())
    }

    /// Compiles one note, treating `today` as the latest acceptable
    /// consultation date.
    pub fn compile_at(&self, text: &str, today: NaiveDate) -> CompileResult<Compilation> {
        let lexed = tokenize(text);
        for diagnostic in &lexed.diagnostics {
            tracing::warn!(
                line = diagnostic.line,
                character = %diagnostic.character,
                "Skipping invalid character"
            );
        }

        let parsed = parse_tokens(&lexed.tokens, &self.registry)?;

        validate_at(&parsed.record, today).map_err(|source| {
            let field = source.field();
            let line = parsed.lines.line_of(field);
            tracing::debug!(
                %field,
                value = parsed.record.field(field),
                line,
                "Rejected field"
            );
            CompileError::Validation { source, line }
        })?;

        tracing::debug!(
            patient = %parsed.record.patient,
            medication = %parsed.record.medication.name,
            diagnostics = lexed.diagnostics.len(),
            "Compiled note"
        );

        Ok(Compilation {
            record: parsed.record,
            diagnostics: lexed.diagnostics,
        })
    }
}
