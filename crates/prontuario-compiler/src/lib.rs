//! # prontuario-compiler
//!
//! Compiles free-text medical notes into validated [`MedicalRecord`]s.
//!
//! A note is a single fixed sentence:
//!
//! ```text
//! PACIENTE "Maria Silva" CPF:"123.456.789-00" CONSULTA DATA:"10/05/2024"
//! CID:"A12" MEDICAMENTO "Paracetamol" DOSAGEM:"500mg"
//! ```
//!
//! Compilation runs in three stages:
//!
//! 1. [`tokenize`] splits the text into tokens with line numbers, skipping
//!    and reporting characters that match no token kind.
//! 2. [`parse_tokens`] matches the tokens against the note grammar and
//!    resolves the medication through a [`MedicationRegistry`].
//! 3. [`validate`] checks the values: CPF and CID shapes, a consultation date
//!    that is not in the future, and a dosage within the permitted range.
//!
//! [`NoteCompiler`] runs all three.
//!
//! ## Registries
//!
//! - [`InMemoryRegistry`]: a fixed mapping, for tests and embedders
//! - [`HttpRegistry`]: the medication directory service over HTTP
//!
//! [`MedicalRecord`]: prontuario_types::MedicalRecord

#![warn(missing_docs)]

pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod token;
pub mod types;
pub mod validator;

pub use compiler::{Compilation, NoteCompiler};
pub use lexer::{tokenize, LexOutput};
pub use parser::{grammar_kinds, parse, parse_tokens, FieldLines, ParsedNote, NOTE_LENGTH};
pub use registry::{HttpRegistry, InMemoryRegistry, MedicationRegistry, RegistryReply};
pub use token::{Token, TokenKind};
pub use types::{
    CompileError, CompileResult, DateProblem, DosageProblem, ErrorKind, LexicalError,
    RegistryConfig, RegistryError, RegistryResult, SyntaxError, SyntaxResult, ValidationError,
    ValidationKind, ValidationResult, REGISTRY_TIMEOUT_ENV, REGISTRY_URL_ENV,
};
pub use validator::{validate, validate_at};

// Re-export prontuario-types for convenience
pub use prontuario_types;
