//! Grammar parser for medical notes.
//!
//! A note has exactly one shape, so the grammar is a straight-line table of
//! thirteen steps rather than a general parser. Each step either expects a
//! keyword or field tag, or captures the string literal carrying a field
//! value:
//!
//! ```text
//! PACIENTE "name" CPF: "cpf" CONSULTA DATA: "date" CID: "cid"
//! MEDICAMENTO "medication" DOSAGEM: "dosage"
//! ```
//!
//! After a full match the medication name is resolved against a
//! [`MedicationRegistry`]; the record takes the registry's canonical name,
//! form and manufacturer but keeps the dosage written in the note.

use prontuario_types::{MedicalRecord, RecordField};

use crate::lexer::tokenize;
use crate::registry::MedicationRegistry;
use crate::token::{Token, TokenKind};
use crate::types::{SyntaxError, SyntaxResult};

/// One position of the note grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// A keyword or tag that carries no value.
    Expect(TokenKind),
    /// A string literal whose unquoted text fills a record field.
    Capture(RecordField),
}

impl Step {
    fn kind(self) -> TokenKind {
        match self {
            Step::Expect(kind) => kind,
            Step::Capture(_) => TokenKind::StringLiteral,
        }
    }
}

/// The note grammar, in order.
const NOTE_GRAMMAR: [Step; 13] = [
    Step::Expect(TokenKind::Patient),
    Step::Capture(RecordField::Patient),
    Step::Expect(TokenKind::Cpf),
    Step::Capture(RecordField::Cpf),
    Step::Expect(TokenKind::Consultation),
    Step::Expect(TokenKind::Date),
    Step::Capture(RecordField::ConsultationDate),
    Step::Expect(TokenKind::Cid),
    Step::Capture(RecordField::Cid),
    Step::Expect(TokenKind::Medication),
    Step::Capture(RecordField::Medication),
    Step::Expect(TokenKind::Dosage),
    Step::Capture(RecordField::Dosage),
];

/// Number of tokens in a complete note.
pub const NOTE_LENGTH: usize = NOTE_GRAMMAR.len();

/// Returns the token kinds of a complete note, in order.
pub fn grammar_kinds() -> [TokenKind; NOTE_LENGTH] {
    NOTE_GRAMMAR.map(Step::kind)
}

const FIELD_COUNT: usize = RecordField::ALL.len();

/// Source line of every captured field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLines {
    lines: [usize; FIELD_COUNT],
}

impl FieldLines {
    /// Returns the source line the given field was read from.
    pub fn line_of(&self, field: RecordField) -> usize {
        self.lines[slot(field)]
    }
}

/// A successfully parsed note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    /// The structured record.
    pub record: MedicalRecord,
    /// Where each field came from.
    pub lines: FieldLines,
}

fn slot(field: RecordField) -> usize {
    match field {
        RecordField::Patient => 0,
        RecordField::Cpf => 1,
        RecordField::ConsultationDate => 2,
        RecordField::Cid => 3,
        RecordField::Medication => 4,
        RecordField::Dosage => 5,
    }
}

/// A token stream that matched the whole grammar.
struct Matched<'t, 'src> {
    tokens: &'t [Token<'src>],
    /// Token index of each captured field, by [`slot`].
    positions: [usize; FIELD_COUNT],
}

impl<'src> Matched<'_, 'src> {
    fn token(&self, field: RecordField) -> &Token<'src> {
        &self.tokens[self.positions[slot(field)]]
    }

    fn value(&self, field: RecordField) -> String {
        self.token(field).unquoted().to_string()
    }

    fn line(&self, field: RecordField) -> usize {
        self.token(field).line
    }
}

/// Matches the whole token stream against the note grammar.
fn match_grammar<'t, 'src>(tokens: &'t [Token<'src>]) -> SyntaxResult<Matched<'t, 'src>> {
    let mut positions = [0; FIELD_COUNT];

    for (position, step) in NOTE_GRAMMAR.iter().enumerate() {
        let expected = step.kind();
        let token = tokens
            .get(position)
            .ok_or(SyntaxError::UnexpectedEnd { expected })?;

        if token.kind != expected {
            return Err(SyntaxError::UnexpectedToken {
                expected,
                found: token.kind,
                text: token.text.to_string(),
                line: token.line,
            });
        }

        if let Step::Capture(field) = step {
            positions[slot(*field)] = position;
        }
    }

    if let Some(extra) = tokens.get(NOTE_LENGTH) {
        return Err(SyntaxError::TrailingToken {
            kind: extra.kind,
            text: extra.text.to_string(),
            line: extra.line,
        });
    }

    Ok(Matched { tokens, positions })
}

/// Parses a token stream into a record, resolving the medication.
///
/// # Errors
/// Returns a [`SyntaxError`] if the stream is not exactly one note, if the
/// medication is unknown to the registry, or if the registry cannot answer.
pub fn parse_tokens<R>(tokens: &[Token<'_>], registry: &R) -> SyntaxResult<ParsedNote>
where
    R: MedicationRegistry + ?Sized,
{
    let matched = match_grammar(tokens)?;

    let name = matched.value(RecordField::Medication);
    let name_line = matched.line(RecordField::Medication);

    let entry = match registry.find_by_name(&name) {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return Err(SyntaxError::UnknownMedication {
                name,
                line: name_line,
            })
        }
        Err(source) => {
            return Err(SyntaxError::RegistryUnavailable {
                name,
                line: name_line,
                source,
            })
        }
    };
    tracing::debug!(name = %entry.name, id = entry.id, "Resolved medication");

    let record = MedicalRecord {
        patient: matched.value(RecordField::Patient),
        cpf: matched.value(RecordField::Cpf),
        consultation_date: matched.value(RecordField::ConsultationDate),
        cid: matched.value(RecordField::Cid),
        medication: entry.to_reference(matched.value(RecordField::Dosage)),
    };

    let lines = FieldLines {
        lines: RecordField::ALL.map(|field| matched.line(field)),
    };

    Ok(ParsedNote { record, lines })
}

/// Tokenizes and parses a note.
///
/// Lexical diagnostics are dropped; use [`tokenize`] and [`parse_tokens`]
/// directly to inspect them.
pub fn parse<R>(source: &str, registry: &R) -> SyntaxResult<ParsedNote>
where
    R: MedicationRegistry + ?Sized,
{
    let output = tokenize(source);
    parse_tokens(&output.tokens, registry)
}
