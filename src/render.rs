//! Turning parsed requests back into text.
//!
//! `to_curl_command` emits a normalized curl command that parses back to the
//! same request; `to_text` is the human-readable listing used by the CLI.
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::model::{
    Auth, AuthType, Body, Conversion, FileSource, Request, Value,
};

/// Characters that would change how a `--data-raw` component splits or decodes.
const COMPONENT: &AsciiSet = &CONTROLS.add(b'%').add(b'&').add(b'=').add(b'+').add(b' ');

/// Renders a request as a single-line curl command.
///
/// The raw body string is not carried over: a url-encoded body is rendered
/// pair by pair, so parsing the command back rebuilds `body_string` from the
/// rendered arguments.
pub fn to_curl_command(request: &Request) -> String {
    let mut args: Vec<String> = vec!["curl".to_string()];
    if request.method != "GET" || request.body != Body::None {
        args.push("-X".to_string());
        args.push(request.method.clone());
    }
    for (name, value) in request.headers.iter() {
        args.push("-H".to_string());
        args.push(format!("{name}: {value}"));
    }
    match &request.body {
        Body::None => {}
        Body::FormData(fields) => {
            for (name, value) in fields.iter() {
                args.extend(form_args(name, value));
            }
        }
        Body::UrlEncoded(pairs) => {
            for pair in pairs {
                args.extend(data_args(&pair.key, pair.value.as_ref()));
            }
        }
    }
    if let Some(auth) = &request.auth {
        args.extend(auth_args(auth));
    }
    if let Some(timeout) = request.timeout {
        args.push("-m".to_string());
        args.push(timeout.to_string());
    }
    args.push(request.url.clone());
    shlex::try_join(args.iter().map(String::as_str))
        .unwrap_or_else(|_| "<command included NUL byte>".to_string())
}

fn form_args(name: &str, value: &Value) -> Vec<String> {
    match value {
        Value::File(file) => match file.source {
            FileSource::Upload => vec!["-F".to_string(), format!("{name}=@{}", file.filepath)],
            FileSource::Inline => vec!["-F".to_string(), format!("{name}=<{}", file.filepath)],
        },
        // `-F` would cut at `;` and read `@`/`<` as files.
        Value::Text(text) => vec!["--form-string".to_string(), format!("{name}={text}")],
    }
}

fn data_args(key: &Value, value: Option<&Value>) -> Vec<String> {
    match (key, value) {
        (Value::File(file), _) => {
            let option = match file.conversion {
                Conversion::StripNewlines => "--data-ascii",
                Conversion::None => "--data-binary",
                Conversion::UrlEncode => "--data-urlencode",
            };
            vec![option.to_string(), format!("@{}", file.filepath)]
        }
        (Value::Text(name), Some(Value::File(file))) => vec![
            "--data-urlencode".to_string(),
            format!("{name}@{}", file.filepath),
        ],
        (Value::Text(name), None) if name.is_empty() => {
            vec!["--data-urlencode".to_string(), "=".to_string()]
        }
        (Value::Text(name), None) => vec!["--data-raw".to_string(), encode_component(name)],
        (Value::Text(name), Some(Value::Text(text))) => vec![
            "--data-raw".to_string(),
            format!("{}={}", encode_component(name), encode_component(text)),
        ],
    }
}

fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

fn auth_args(auth: &Auth) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(username) = &auth.username {
        args.push("-u".to_string());
        args.push(match &auth.password {
            Some(password) => format!("{username}:{password}"),
            None => username.clone(),
        });
    }
    if auth.kind != AuthType::Basic || auth.username.is_none() {
        args.push(format!("--{}", auth.kind.as_str()));
    }
    args
}

/// ANSI prefixes for the parts of a text rendering; empty strings disable color.
#[derive(Debug, Clone, Default)]
pub struct TextStyle {
    pub method: String,
    pub url: String,
    pub header: String,
    pub hint: String,
}

impl TextStyle {
    fn paint(&self, prefix: &str, text: &str) -> String {
        if prefix.is_empty() {
            text.to_string()
        } else {
            format!("{prefix}{text}\x1b[0m")
        }
    }
}

pub fn to_text(request: &Request) -> String {
    to_text_styled(request, &TextStyle::default())
}

pub fn to_text_styled(request: &Request, style: &TextStyle) -> String {
    let mut lines = vec![format!(
        "{} {}",
        style.paint(&style.method, &request.method),
        style.paint(&style.url, &request.url)
    )];
    for (name, value) in request.headers.iter() {
        lines.push(format!("  {}: {value}", style.paint(&style.header, name)));
    }
    if let Some(auth) = &request.auth {
        let mut line = format!("  {} {}", style.paint(&style.hint, "auth:"), auth.kind.as_str());
        if let Some(username) = &auth.username {
            line.push(' ');
            line.push_str(username);
            if let Some(password) = &auth.password {
                line.push(':');
                line.push_str(password);
            }
        }
        lines.push(line);
    }
    if let Some(timeout) = request.timeout {
        lines.push(format!("  {} {timeout}s", style.paint(&style.hint, "timeout:")));
    }
    match &request.body {
        Body::None => {}
        Body::FormData(fields) => {
            lines.push(format!("  {}", style.paint(&style.hint, "form:")));
            for (name, value) in fields.iter() {
                lines.push(format!("    {name}={}", value_text(value)));
            }
        }
        Body::UrlEncoded(pairs) => {
            lines.push(format!("  {}", style.paint(&style.hint, "data:")));
            for pair in pairs {
                let line = match &pair.value {
                    Some(value) => format!("    {}={}", value_text(&pair.key), value_text(value)),
                    None => format!("    {}", value_text(&pair.key)),
                };
                lines.push(line);
            }
        }
    }
    if let Some(raw) = &request.body_string {
        lines.push(format!("  {} {raw}", style.paint(&style.hint, "raw:")));
    }
    lines.join("\n")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Text(text) => text.escape_debug().to_string(),
        Value::File(file) => {
            let marker = match file.source {
                FileSource::Upload => '@',
                FileSource::Inline => '<',
            };
            match file.conversion {
                Conversion::None => format!("{marker}{}", file.filepath),
                Conversion::StripNewlines => format!("{marker}{} (strip newlines)", file.filepath),
                Conversion::UrlEncode => format!("{marker}{} (url-encode)", file.filepath),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileReference, KeyValue};
    use crate::parse;

    fn reparse(request: &Request) -> Request {
        let mut parsed = parse(&to_curl_command(request)).unwrap();
        assert_eq!(parsed.len(), 1);
        parsed.remove(0).with_body_string(None)
    }

    #[test]
    fn plain_get_renders_minimal_command() {
        let request = Request::new("http://httpbin.org/get");
        assert_eq!(to_curl_command(&request), "curl http://httpbin.org/get");
    }

    #[test]
    fn headers_auth_and_timeout_round_trip() {
        let request = Request::new("https://h/get?a=1&b=2")
            .with_method("PATCH")
            .with_header("Content-Type", "application/json")
            .with_header("X-Quote", "it's \"here\" | there")
            .with_auth(Some(Auth::basic("foo", Some("b:ar".into())).with_kind(AuthType::Digest)))
            .with_timeout(Some(0.5));
        assert_eq!(reparse(&request), request);
    }

    #[test]
    fn url_userinfo_with_at_sign_round_trips() {
        let mut first = parse("curl http://a@b@c/x").unwrap();
        let first = first.remove(0);
        assert_eq!(first.url, "http://c/x");
        assert_eq!(reparse(&first), first);
    }

    #[test]
    fn auth_type_without_credentials() {
        let request = Request::new("http://a").with_auth(Some(Auth::default()));
        assert_eq!(reparse(&request), request);
    }

    #[test]
    fn form_body_round_trips() {
        let request = Request::new("http://a")
            .with_method("POST")
            .with_form_field("text", "v;type=x")
            .with_form_field("at", "@literal")
            .with_form_field("upload", FileReference::new("a b.txt", Conversion::None))
            .with_form_field("inline", FileReference::inline("notes.txt"));
        assert_eq!(reparse(&request), request);
    }

    #[test]
    fn url_encoded_body_round_trips() {
        let request = Request::new("http://a").with_method("PUT").with_url_encoded([
            KeyValue::new("k=1&", Some(Value::text("100% sure"))),
            KeyValue::flag("flag"),
            KeyValue::flag(""),
            KeyValue::flag(FileReference::new("f.txt", Conversion::StripNewlines)),
            KeyValue::flag(FileReference::new("f.bin", Conversion::None)),
            KeyValue::new("name", Some(FileReference::new("f.txt", Conversion::UrlEncode).into())),
            KeyValue::new("emoji", Some(Value::text("\u{1f980}"))),
        ]);
        assert_eq!(reparse(&request), request);
    }

    #[test]
    fn text_listing() {
        let request = Request::new("http://a")
            .with_method("POST")
            .with_header("X-Test", "1")
            .with_url_encoded([KeyValue::new("k", Some(Value::text("v")))])
            .with_body_string_part("k=v");
        let text = to_text(&request);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "POST http://a");
        assert_eq!(lines[1], "  X-Test: 1");
        assert_eq!(lines[2], "  data:");
        assert_eq!(lines[3], "    k=v");
        assert_eq!(lines[4], "  raw: k=v");
    }

    #[test]
    fn styled_listing_wraps_parts() {
        let style = TextStyle {
            method: "\x1b[32m".to_string(),
            ..TextStyle::default()
        };
        let text = to_text_styled(&Request::new("http://a"), &style);
        assert_eq!(text, "\x1b[32mGET\x1b[0m http://a");
    }
}
