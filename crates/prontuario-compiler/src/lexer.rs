//! Lexical analysis of medical notes.
//!
//! Tokenization itself is handled by logos; this module adds line tracking
//! and error recovery. An unmatched character is reported, exactly that one
//! character is skipped, and lexing resumes, so the lexer always reaches the
//! end of its input.

use logos::Logos;

use crate::token::{Token, TokenKind};
use crate::types::LexicalError;

/// Tokens and diagnostics produced from one source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexOutput<'src> {
    /// Recognized tokens, in source order.
    pub tokens: Vec<Token<'src>>,
    /// Characters that matched no token kind, in source order.
    pub diagnostics: Vec<LexicalError>,
}

impl LexOutput<'_> {
    /// Returns true if every character was recognized.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the token kinds, in order.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

/// Maps byte offsets to 1-based line numbers.
///
/// Offsets must be queried in non-decreasing order.
struct LineTracker<'src> {
    source: &'src str,
    offset: usize,
    line: usize,
}

impl<'src> LineTracker<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.offset {
            self.line += self.source.as_bytes()[self.offset..offset]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = offset;
        }
        self.line
    }
}

/// Tokenizes a medical note.
///
/// Never fails: unrecognized characters are collected as diagnostics.
pub fn tokenize(source: &str) -> LexOutput<'_> {
    let mut output = LexOutput::default();
    let mut lines = LineTracker::new(source);
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let line = lines.line_at(span.start);

        match result {
            Ok(kind) => output.tokens.push(Token {
                kind,
                text: lexer.slice(),
                line,
                span,
            }),
            Err(()) => {
                let Some(character) = source[span.start..].chars().next() else {
                    break;
                };
                output.diagnostics.push(LexicalError { line, character });

                // logos may have consumed a partial match; restart just past
                // the offending character.
                let resume = span.start + character.len_utf8();
                if resume != span.end {
                    lexer = TokenKind::lexer(source);
                    lexer.bump(resume);
                }
            }
        }
    }

    output
}
