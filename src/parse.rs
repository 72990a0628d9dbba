//! Shell tokenizing and curl option parsing.
//!
//! Tokens are either words (quotes and escapes already resolved) or operators
//! (unquoted shell metacharacters). Keeping operators as their own variant
//! lets a quoted `'|'` argument survive as data while a bare `|` still ends
//! the curl command it follows.
mod command_parser;
pub mod options;
pub mod resolvers;
mod tokenizer;

pub use command_parser::{parse_tokens, CommandParser};
pub use tokenizer::tokenize;

/// Operators that end the current curl command.
pub const BREAK_OPERATORS: &[&str] = &[
    "|", "||", ">", ">>", "1>", "1>>", "2>", "2>>", "&>", "&>>", ";", "&", "&&",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Operator(String),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(text) | Token::Operator(text) => text,
        }
    }

    pub fn is_break(&self) -> bool {
        match self {
            Token::Operator(op) => BREAK_OPERATORS.contains(&op.as_str()) || is_fd_redirect(op),
            Token::Word(_) => false,
        }
    }
}

/// `N>` or `N>>` for any file descriptor number.
fn is_fd_redirect(op: &str) -> bool {
    let digits = op.trim_end_matches('>');
    let arrows = op.len() - digits.len();
    !digits.is_empty() && (1..=2).contains(&arrows) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_tokens() {
        for op in ["|", ">", "1>", "2>", "&>", ";", "&", "&&"] {
            assert!(Token::Operator(op.to_string()).is_break(), "{op}");
        }
        assert!(!Token::Word("|".to_string()).is_break());
        assert!(Token::Operator("3>>".to_string()).is_break());
        assert!(!Token::Operator("3>>>".to_string()).is_break());
    }

    #[test]
    fn as_str_ignores_kind() {
        assert_eq!(Token::Word("a".into()).as_str(), "a");
        assert_eq!(Token::Operator("&&".into()).as_str(), "&&");
    }
}
