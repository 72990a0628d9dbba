//! Error types and reporting for the curl parser.
//!
//! Tokenizing never fails and unknown options are skipped, so every error here
//! is a grammar violation in an option the parser does model. A `ParseError`
//! carries:
//! - Error kind (bad header, bad form field, body conflict, missing value)
//! - Human-readable message
//! - The option and raw token that caused it
//! - Optional token position for pointing at the problem

use std::fmt;

/// Categorized grammar violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `-H` value without a `name:` part
    InvalidHeader,
    /// `-F`/`--form-string` value without a `name=` part
    InvalidForm,
    /// Form and url-encoded body options mixed in one request
    BodyTypeConflict,
    /// Option that takes a value found nothing to take
    MissingValue,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::InvalidHeader => write!(f, "Invalid header"),
            ErrorKind::InvalidForm => write!(f, "Invalid form field"),
            ErrorKind::BodyTypeConflict => write!(f, "Body type conflict"),
            ErrorKind::MissingValue => write!(f, "Missing value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Option spelling as it appeared, e.g. `-H` or `--form`
    pub option: Option<String>,
    /// Raw argument token that was rejected
    pub token: Option<String>,
    /// Additional hint about the expected syntax
    pub context: Option<String>,
    /// Index of the offending token in the token stream
    pub position: Option<usize>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            option: None,
            token: None,
            context: None,
            position: None,
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add context string (e.g., "Expected: -H 'Name: value'")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_position(mut self, pos: usize) -> Self {
        self.position = Some(pos);
        self
    }

    /// Format error with the tokenized input, pointing at the offending token
    pub fn display_with_tokens(&self, tokens: &[String]) -> String {
        let mut msg = self.display_simple();
        let Some(pos) = self.position else {
            return msg;
        };
        if pos >= tokens.len() {
            msg.push_str(&format!("\n  at token {} (end of input)", pos));
            return msg;
        }
        let start = pos.saturating_sub(2);
        let end = (pos + 3).min(tokens.len());
        let mut line = String::from("  near: ");
        let mut offset = 0;
        for (idx, token) in tokens[start..end].iter().enumerate() {
            if idx > 0 {
                line.push(' ');
            }
            if start + idx == pos {
                offset = line.chars().count();
            }
            line.push_str(&token.replace('\n', "↵"));
        }
        msg.push('\n');
        msg.push_str(&line);
        msg.push('\n');
        msg.push_str(&format!("{}^", " ".repeat(offset)));
        msg
    }

    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
