//! Tokenizer for pasted shell command lines.
//!
//! Uses Normal/Single/Double/AnsiC modes to resolve quoting while emitting a
//! flat token stream for the command parser. It never fails: unterminated
//! quotes run to the end of the input.
use crate::parse::resolvers::decode_escape_sequence;
use crate::parse::Token;

#[derive(Copy, Clone, Eq, PartialEq)]
enum ParseMode {
    Normal,
    Single,
    Double,
    AnsiC,
}

struct TokenBuffer {
    tokens: Vec<Token>,
    buf: String,
    in_token: bool,
}

impl TokenBuffer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            buf: String::new(),
            in_token: false,
        }
    }

    fn push(&mut self, ch: char) {
        self.in_token = true;
        self.buf.push(ch);
    }

    fn push_str(&mut self, s: &str) {
        self.in_token = true;
        self.buf.push_str(s);
    }

    fn end_word(&mut self) {
        if self.in_token {
            self.tokens.push(Token::Word(std::mem::take(&mut self.buf)));
            self.in_token = false;
        }
    }

    fn operator(&mut self, op: String) {
        self.end_word();
        self.tokens.push(Token::Operator(op));
    }

    /// Pending word made only of digits, i.e. the fd prefix of `2>`.
    fn take_fd_prefix(&mut self) -> Option<String> {
        if self.in_token && !self.buf.is_empty() && self.buf.chars().all(|c| c.is_ascii_digit()) {
            self.in_token = false;
            Some(std::mem::take(&mut self.buf))
        } else {
            None
        }
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = TokenBuffer::new();
    let mut chars = input.chars().peekable();
    let mut mode = ParseMode::Normal;
    // Raw `$'...'` content, decoded as a whole once the quote closes.
    let mut ansi = String::new();

    while let Some(ch) = chars.next() {
        match mode {
            ParseMode::Normal => match ch {
                ' ' | '\t' | '\n' | '\r' => out.end_word(),
                '|' => {
                    if matches!(chars.peek(), Some('|')) {
                        chars.next();
                        out.operator("||".to_string());
                    } else {
                        out.operator("|".to_string());
                    }
                }
                ';' => out.operator(";".to_string()),
                '&' => {
                    let op = match chars.peek() {
                        Some('&') => {
                            chars.next();
                            "&&".to_string()
                        }
                        Some('>') => {
                            chars.next();
                            if matches!(chars.peek(), Some('>')) {
                                chars.next();
                                "&>>".to_string()
                            } else {
                                "&>".to_string()
                            }
                        }
                        _ => "&".to_string(),
                    };
                    out.operator(op);
                }
                '>' => {
                    let prefix = out.take_fd_prefix().unwrap_or_default();
                    if matches!(chars.peek(), Some('>')) {
                        chars.next();
                        out.operator(format!("{prefix}>>"));
                    } else {
                        out.operator(format!("{prefix}>"));
                    }
                }
                '\\' => match chars.next() {
                    // Line continuation.
                    Some('\n') => {}
                    Some('\r') => {
                        if matches!(chars.peek(), Some('\n')) {
                            chars.next();
                        }
                    }
                    Some(next) => out.push(next),
                    None => out.push('\\'),
                },
                '\'' => {
                    out.in_token = true;
                    mode = ParseMode::Single;
                }
                '"' => {
                    out.in_token = true;
                    mode = ParseMode::Double;
                }
                '$' if matches!(chars.peek(), Some('\'')) => {
                    chars.next();
                    out.in_token = true;
                    mode = ParseMode::AnsiC;
                }
                _ => out.push(ch),
            },
            ParseMode::Single => {
                if ch == '\'' {
                    mode = ParseMode::Normal;
                } else {
                    out.push(ch);
                }
            }
            ParseMode::Double => match ch {
                '"' => mode = ParseMode::Normal,
                '\\' => match chars.peek().copied() {
                    Some('\n') => {
                        chars.next();
                    }
                    Some(next @ ('"' | '\\' | '$' | '`')) => {
                        chars.next();
                        out.push(next);
                    }
                    _ => out.push('\\'),
                },
                _ => out.push(ch),
            },
            ParseMode::AnsiC => match ch {
                '\'' => {
                    out.push_str(&decode_escape_sequence(&ansi));
                    ansi.clear();
                    mode = ParseMode::Normal;
                }
                '\\' => {
                    ansi.push('\\');
                    if let Some(next) = chars.next() {
                        ansi.push(next);
                    }
                }
                _ => ansi.push(ch),
            },
        }
    }

    if mode == ParseMode::AnsiC {
        out.push_str(&decode_escape_sequence(&ansi));
    }
    out.end_word();
    out.tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<String> {
        tokenize(input)
            .into_iter()
            .map(|token| token.as_str().to_string())
            .collect()
    }

    #[test]
    fn tokenize_basic() {
        assert_eq!(words("curl -X POST http://a"), vec!["curl", "-X", "POST", "http://a"]);
        assert_eq!(words("  curl\t\n http://a  "), vec!["curl", "http://a"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn quoting_and_escaping() {
        assert_eq!(words("-d \"ab\\\"cd\""), vec!["-d", "ab\"cd"]);
        assert_eq!(words("-d 'single \\n and $'"), vec!["-d", "single \\n and $"]);
        assert_eq!(words("x \"ab\"\"cd\" \"\""), vec!["x", "abcd", ""]);
        assert_eq!(words("\"a\\qb\""), vec!["a\\qb"]);
        assert_eq!(words("name@\"file\nname\""), vec!["name@file\nname"]);
    }

    #[test]
    fn ansi_c_quoting() {
        assert_eq!(words("-d $'key=v\\x61lue'"), vec!["-d", "key=value"]);
        assert_eq!(words("$'toto\\ntiti'"), vec!["toto\ntiti"]);
        assert_eq!(words("$'it\\'s'"), vec!["it's"]);
        assert_eq!(words("a$b"), vec!["a$b"]);
    }

    #[test]
    fn escapes_preserve_spaces() {
        assert_eq!(words("X-Paw-2:\\ my-value"), vec!["X-Paw-2: my-value"]);
        assert_eq!(words("\\ key=value"), vec![" key=value"]);
        assert_eq!(words("\\n"), vec!["n"]);
    }

    #[test]
    fn line_continuations() {
        assert_eq!(words("key=val\\\nue"), vec!["key=value"]);
        assert_eq!(words("curl \\\n  -H a:b"), vec!["curl", "-H", "a:b"]);
        assert_eq!(words("curl \\\r\n -I"), vec!["curl", "-I"]);
        assert_eq!(words("\"a\\\nb\""), vec!["ab"]);
    }

    #[test]
    fn operators_split_without_spaces() {
        let tokens = tokenize("a|b>c;d&e&&f||g");
        let expected = vec![
            Token::Word("a".into()),
            Token::Operator("|".into()),
            Token::Word("b".into()),
            Token::Operator(">".into()),
            Token::Word("c".into()),
            Token::Operator(";".into()),
            Token::Word("d".into()),
            Token::Operator("&".into()),
            Token::Word("e".into()),
            Token::Operator("&&".into()),
            Token::Word("f".into()),
            Token::Operator("||".into()),
            Token::Word("g".into()),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn fd_redirects() {
        assert_eq!(
            tokenize("x 2>err 1>>out &>both"),
            vec![
                Token::Word("x".into()),
                Token::Operator("2>".into()),
                Token::Word("err".into()),
                Token::Operator("1>>".into()),
                Token::Word("out".into()),
                Token::Operator("&>".into()),
                Token::Word("both".into()),
            ]
        );
        assert_eq!(
            tokenize("a1>f"),
            vec![
                Token::Word("a1".into()),
                Token::Operator(">".into()),
                Token::Word("f".into()),
            ]
        );
    }

    #[test]
    fn quoted_operators_stay_words() {
        assert_eq!(tokenize("'|'"), vec![Token::Word("|".into())]);
        assert_eq!(tokenize("a\\;b"), vec![Token::Word("a;b".into())]);
        assert_eq!(tokenize("\"x > y\""), vec![Token::Word("x > y".into())]);
    }

    #[test]
    fn malformed_input_degrades() {
        assert_eq!(words("-d \"unterminated value"), vec!["-d", "unterminated value"]);
        assert_eq!(words("-d 'open"), vec!["-d", "open"]);
        assert_eq!(words("-d $'open\\t"), vec!["-d", "open\t"]);
        assert_eq!(words("trailing \\"), vec!["trailing", "\\"]);
        assert_eq!(words("\"dangling \\"), vec!["dangling \\"]);
    }
}
