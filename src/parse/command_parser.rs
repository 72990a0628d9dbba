//! Turns a token stream into curl requests.
//!
//! The parser scans for a `curl` word, then applies each following token to
//! the command being built until a shell operator, `--next`, or the end of
//! the input. One request is emitted per URL of the command.
use log::{debug, warn};

use crate::error::{ErrorKind, ParseError, ParseResult};
use crate::model::{
    BodyType, Conversion, FileReference, KeyValue, Request, Value,
};
use crate::parse::options::{lookup_long, lookup_short, DataKind, OptionKind, OptionSpec};
use crate::parse::resolvers::{
    normalize_header_name, percent_decode, resolve_file_reference, split_url_credentials,
    with_default_scheme, Credentials,
};
use crate::parse::Token;

/// Parses an already tokenized command line.
pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Vec<Request>> {
    CommandParser::new(tokens).parse()
}

/// Why option parsing for one command stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandEnd {
    Break,
    Next,
    Eof,
}

/// Outcome of matching one token against the option table.
enum Dispatch {
    /// Not an option this parser models; dropped.
    Skip,
    /// A known option with its argument, to be applied (which can fail).
    Apply {
        spec: &'static OptionSpec,
        spelling: String,
        value: Option<String>,
        position: usize,
    },
}

/// A URL of the command with the credentials that were written into it.
struct UrlEntry {
    url: String,
    credentials: Option<Credentials>,
    // -u count when the URL was seen; a later -u replaces these credentials.
    user_updates: usize,
}

/// Accumulated state of the curl command currently being parsed.
#[derive(Default)]
struct CommandState {
    request: Request,
    method: Option<String>,
    urls: Vec<UrlEntry>,
    // URL credentials never override a password given with -u.
    explicit_password: bool,
    user_updates: usize,
}

pub struct CommandParser {
    tokens: Vec<Token>,
    idx: usize,
    requests: Vec<Request>,
}

impl CommandParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            idx: 0,
            requests: Vec::new(),
        }
    }

    pub fn parse(mut self) -> ParseResult<Vec<Request>> {
        while let Some(token) = self.pop() {
            if let Token::Word(word) = &token {
                if word.eq_ignore_ascii_case("curl") {
                    debug!("command event=start position={}", self.idx - 1);
                    self.parse_command()?;
                }
            }
        }
        Ok(self.requests)
    }

    fn pop(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.idx).cloned();
        if token.is_some() {
            self.idx += 1;
        }
        token
    }

    /// Parses one command plus every command chained to it with `--next`.
    fn parse_command(&mut self) -> ParseResult<()> {
        loop {
            let mut state = CommandState::default();
            let end = self.parse_options(&mut state)?;
            self.finish(state);
            if end != CommandEnd::Next {
                debug!("command event=end reason={:?}", end);
                return Ok(());
            }
            debug!("command event=next position={}", self.idx);
        }
    }

    fn parse_options(&mut self, state: &mut CommandState) -> ParseResult<CommandEnd> {
        while let Some(token) = self.pop() {
            let position = self.idx - 1;
            let word = match token {
                Token::Operator(ref op) => {
                    if token.is_break() {
                        return Ok(CommandEnd::Break);
                    }
                    debug!("option event=skip operator={}", op);
                    continue;
                }
                Token::Word(word) => word,
            };
            // Mis-pasted continuations leave tokens like " " or " -H".
            let trimmed = word.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "-" {
                continue;
            }
            if !trimmed.starts_with('-') {
                self.add_url(state, trimmed);
                continue;
            }
            for dispatch in self.dispatch(trimmed, position)? {
                match dispatch {
                    Dispatch::Skip => {}
                    Dispatch::Apply { spec, .. } if spec.kind == OptionKind::Next => {
                        return Ok(CommandEnd::Next);
                    }
                    Dispatch::Apply {
                        spec,
                        spelling,
                        value,
                        position,
                    } => self.apply(state, spec, &spelling, value, position)?,
                }
            }
        }
        Ok(CommandEnd::Eof)
    }

    /// Resolves an option token into what it does, consuming its argument.
    ///
    /// A `-abc` cluster yields one dispatch per letter; the first letter that
    /// takes a value takes the rest of the cluster, or the next token.
    fn dispatch(&mut self, option: &str, position: usize) -> ParseResult<Vec<Dispatch>> {
        if option.starts_with("--") {
            let Some(spec) = lookup_long(option) else {
                debug!("option event=skip unknown={}", option);
                return Ok(vec![Dispatch::Skip]);
            };
            let value = if spec.takes_value() {
                Some(self.take_value(option)?)
            } else {
                None
            };
            return Ok(vec![Dispatch::Apply {
                spec,
                spelling: option.to_string(),
                value,
                position: if spec.takes_value() { self.idx - 1 } else { position },
            }]);
        }

        let mut out = Vec::new();
        let cluster = &option[1..];
        for (offset, ch) in cluster.char_indices() {
            let Some(spec) = lookup_short(ch) else {
                debug!("option event=skip unknown=-{} token={}", ch, option);
                out.push(Dispatch::Skip);
                continue;
            };
            let spelling = format!("-{ch}");
            if !spec.takes_value() {
                out.push(Dispatch::Apply {
                    spec,
                    spelling,
                    value: None,
                    position,
                });
                continue;
            }
            let rest = &cluster[offset + ch.len_utf8()..];
            let (value, value_position) = if rest.is_empty() {
                (self.take_value(&spelling)?, self.idx - 1)
            } else {
                (rest.to_string(), position)
            };
            out.push(Dispatch::Apply {
                spec,
                spelling,
                value: Some(value),
                position: value_position,
            });
            break;
        }
        Ok(out)
    }

    fn take_value(&mut self, option: &str) -> ParseResult<String> {
        match self.tokens.get(self.idx) {
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.idx += 1;
                Ok(word)
            }
            Some(Token::Operator(op)) => Err(ParseError::new(
                ErrorKind::MissingValue,
                format!("Option {option} expects a value, found '{op}'"),
            )
            .with_option(option)
            .with_token(op.clone())
            .with_position(self.idx)),
            None => Err(ParseError::new(
                ErrorKind::MissingValue,
                format!("Option {option} expects a value"),
            )
            .with_option(option)
            .with_position(self.idx)),
        }
    }

    fn apply(
        &mut self,
        state: &mut CommandState,
        spec: &'static OptionSpec,
        spelling: &str,
        value: Option<String>,
        position: usize,
    ) -> ParseResult<()> {
        let value = value.unwrap_or_default();
        let request = std::mem::take(&mut state.request);
        state.request = match spec.kind {
            OptionKind::Method => {
                state.method = Some(value);
                request
            }
            OptionKind::Head => {
                state.method = Some("HEAD".to_string());
                request
            }
            OptionKind::Header => {
                let (name, header_value) = split_header(&value).ok_or_else(|| {
                    ParseError::new(
                        ErrorKind::InvalidHeader,
                        format!("Invalid {} value: {}", spec.label(), value),
                    )
                    .with_option(spelling)
                    .with_token(value.clone())
                    .with_position(position)
                    .with_context("Expected: -H 'Name: value'")
                })?;
                request.with_header(normalize_header_name(name), header_value)
            }
            OptionKind::UserAgent => request.with_header("User-Agent", value),
            OptionKind::Cookie => request.with_header("Cookie", value),
            OptionKind::Referer => request.with_header("Referer", value),
            OptionKind::Compressed => add_gzip_encoding(request),
            OptionKind::Form | OptionKind::FormString => {
                check_body_type(&request, BodyType::FormData, spelling, &value, position)?;
                let parsed = if spec.kind == OptionKind::Form {
                    parse_form_field(&value)
                } else {
                    parse_form_string(&value)
                };
                let (name, field) = parsed.ok_or_else(|| {
                    ParseError::new(
                        ErrorKind::InvalidForm,
                        format!("Invalid {} value: {}", spec.label(), value),
                    )
                    .with_option(spelling)
                    .with_token(value.clone())
                    .with_position(position)
                    .with_context("Expected: -F 'name=value'")
                })?;
                state.method.get_or_insert_with(|| "POST".to_string());
                request.with_form_field(name, field)
            }
            OptionKind::Data(kind) => {
                check_body_type(&request, BodyType::UrlEncoded, spelling, &value, position)?;
                state.method.get_or_insert_with(|| "POST".to_string());
                request
                    .with_url_encoded(data_pairs(kind, &value))
                    .with_body_string_part(&value)
            }
            OptionKind::User => {
                let (username, password) = match value.split_once(':') {
                    Some((user, pass)) => (user.to_string(), Some(pass.to_string())),
                    None => (value.clone(), None),
                };
                if password.is_some() {
                    state.explicit_password = true;
                }
                state.user_updates += 1;
                request.with_auth_update(|auth| auth.with_credentials(username, password))
            }
            OptionKind::AuthType(kind) => request.with_auth_update(|auth| auth.with_kind(kind)),
            OptionKind::MaxTime => match value.trim().parse::<f64>() {
                Ok(seconds) if seconds.is_finite() => request.with_timeout(Some(seconds)),
                _ => {
                    warn!("option event=ignore option={} value={:?}", spelling, value);
                    request
                }
            },
            OptionKind::Url => {
                state.request = request;
                self.add_url(state, value.trim());
                return Ok(());
            }
            OptionKind::Next | OptionKind::Ignored => request,
        };
        Ok(())
    }

    fn add_url(&mut self, state: &mut CommandState, raw: &str) {
        let (url, mut credentials) = split_url_credentials(raw);
        if credentials.is_some() && state.explicit_password {
            debug!("url event=credentials action=keep-explicit");
            credentials = None;
        }
        state.urls.push(UrlEntry {
            url: with_default_scheme(&url),
            credentials,
            user_updates: state.user_updates,
        });
    }

    fn finish(&mut self, state: CommandState) {
        if state.urls.is_empty() {
            debug!("command event=drop reason=no-url");
            return;
        }
        let method = state.method.unwrap_or_else(|| "GET".to_string());
        let shared = state.request.with_method(method);
        for entry in state.urls {
            debug!("request event=emit method={} url={}", shared.method, entry.url);
            let mut request = shared.clone().with_url(entry.url);
            match entry.credentials {
                Some(credentials) if entry.user_updates == state.user_updates => {
                    request = request.with_auth_update(|auth| {
                        auth.with_credentials(credentials.username, credentials.password)
                    });
                }
                Some(_) => debug!("url event=credentials action=keep-later-user"),
                None => {}
            }
            self.requests.push(request);
        }
    }
}

fn check_body_type(
    request: &Request,
    wanted: BodyType,
    spelling: &str,
    value: &str,
    position: usize,
) -> ParseResult<()> {
    let current = request.body_type();
    if current == BodyType::None || current == wanted {
        return Ok(());
    }
    Err(ParseError::new(
        ErrorKind::BodyTypeConflict,
        format!(
            "Different body types set in the same request: {} after {} body",
            spelling,
            current.as_str()
        ),
    )
    .with_option(spelling)
    .with_token(value)
    .with_position(position)
    .with_context("Use either -F/--form or the -d/--data family in one request"))
}

/// `Name: value` -> (`Name`, `value`). The name may not be empty.
fn split_header(raw: &str) -> Option<(&str, &str)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim_start()))
}

fn add_gzip_encoding(request: Request) -> Request {
    let value = match request.headers.get("Accept-Encoding") {
        None => "gzip".to_string(),
        Some(existing) if existing.trim().is_empty() => "gzip".to_string(),
        Some(existing)
            if existing
                .split([';', ','])
                .any(|encoding| encoding.trim().eq_ignore_ascii_case("gzip")) =>
        {
            existing.clone()
        }
        Some(existing) => format!("{existing};gzip"),
    };
    request.with_header("Accept-Encoding", value)
}

/// `name=value[;type=...]`: `@file` uploads a file, `<file` inlines its text.
fn parse_form_field(raw: &str) -> Option<(String, Value)> {
    let (name, rest) = raw.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    let content = rest.split(';').next().unwrap_or_default();
    let value = match content.strip_prefix('<') {
        Some(path) if !path.is_empty() => Value::File(FileReference::inline(path)),
        _ => resolve_file_reference(content, Conversion::None),
    };
    Some((name.to_string(), value))
}

fn parse_form_string(raw: &str) -> Option<(String, Value)> {
    let (name, content) = raw.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), Value::text(content)))
}

fn data_pairs(kind: DataKind, raw: &str) -> Vec<KeyValue> {
    let resolved = match kind {
        DataKind::Ascii => resolve_file_reference(raw, Conversion::StripNewlines),
        DataKind::Binary => resolve_file_reference(raw, Conversion::None),
        DataKind::Raw => Value::text(raw),
        DataKind::UrlEncode => return vec![url_encode_pair(raw)],
    };
    match resolved {
        Value::File(file) => vec![KeyValue::flag(file)],
        Value::Text(text) => split_url_encoded(&text),
    }
}

/// Splits `a=1&b&c=3`, percent-decoding keys and values.
fn split_url_encoded(text: &str) -> Vec<KeyValue> {
    text.split('&')
        .filter_map(|component| {
            let component = component.trim_start_matches('=');
            if component.is_empty() {
                return None;
            }
            Some(match component.split_once('=') {
                Some((key, value)) => {
                    KeyValue::new(percent_decode(key), Some(Value::Text(percent_decode(value))))
                }
                None => KeyValue::flag(percent_decode(component)),
            })
        })
        .collect()
}

/// curl's `--data-urlencode` forms: `content`, `=content`, `name=content`,
/// `@file` and `name@file`. An `=` anywhere wins over `@`.
fn url_encode_pair(raw: &str) -> KeyValue {
    if let Some((name, content)) = raw.split_once('=') {
        return if name.is_empty() {
            KeyValue::flag(content)
        } else {
            KeyValue::new(name, Some(Value::text(content)))
        };
    }
    if let Some((name, path)) = raw.split_once('@') {
        let file = Value::File(FileReference::new(path, Conversion::UrlEncode));
        return if name.is_empty() {
            KeyValue::flag(file)
        } else {
            KeyValue::new(name, Some(file))
        };
    }
    KeyValue::flag(raw)
}
