//! The curl options the parser understands, as data.
//!
//! Each entry lists every spelling of one option together with what it does
//! and whether it consumes an argument. Options curl has but this crate does
//! not model are listed as `Ignored` when they take an argument, so that the
//! argument is not mistaken for a URL.
use crate::model::AuthType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// `-d`, `--data`, `--data-ascii`: `@file` with newlines stripped
    Ascii,
    /// `--data-binary`: `@file` sent as-is
    Binary,
    /// `--data-raw`: `@` has no meaning
    Raw,
    /// `--data-urlencode`
    UrlEncode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Method,
    Head,
    Header,
    UserAgent,
    Cookie,
    Referer,
    Compressed,
    Form,
    FormString,
    Data(DataKind),
    User,
    AuthType(AuthType),
    MaxTime,
    Url,
    Next,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Flag,
    Value,
}

#[derive(Debug)]
pub struct OptionSpec {
    pub names: &'static [&'static str],
    pub kind: OptionKind,
    pub arity: Arity,
}

impl OptionSpec {
    pub fn takes_value(&self) -> bool {
        self.arity == Arity::Value
    }

    /// `-H/--header` style label used in error messages.
    pub fn label(&self) -> String {
        self.names.join("/")
    }
}

const fn flag(names: &'static [&'static str], kind: OptionKind) -> OptionSpec {
    OptionSpec {
        names,
        kind,
        arity: Arity::Flag,
    }
}

const fn value(names: &'static [&'static str], kind: OptionKind) -> OptionSpec {
    OptionSpec {
        names,
        kind,
        arity: Arity::Value,
    }
}

pub static OPTIONS: &[OptionSpec] = &[
    value(&["-X", "--request"], OptionKind::Method),
    flag(&["-I", "--head"], OptionKind::Head),
    value(&["-H", "--header"], OptionKind::Header),
    value(&["-A", "--user-agent"], OptionKind::UserAgent),
    value(&["-b", "--cookie"], OptionKind::Cookie),
    value(&["-e", "--referer"], OptionKind::Referer),
    flag(&["--compressed"], OptionKind::Compressed),
    value(&["-F", "--form"], OptionKind::Form),
    value(&["--form-string"], OptionKind::FormString),
    value(&["-d", "--data", "--data-ascii"], OptionKind::Data(DataKind::Ascii)),
    value(&["--data-binary"], OptionKind::Data(DataKind::Binary)),
    value(&["--data-raw"], OptionKind::Data(DataKind::Raw)),
    value(&["--data-urlencode"], OptionKind::Data(DataKind::UrlEncode)),
    value(&["-u", "--user"], OptionKind::User),
    flag(&["--basic"], OptionKind::AuthType(AuthType::Basic)),
    flag(&["--digest"], OptionKind::AuthType(AuthType::Digest)),
    flag(&["--ntlm"], OptionKind::AuthType(AuthType::Ntlm)),
    flag(&["--negotiate"], OptionKind::AuthType(AuthType::Negotiate)),
    value(&["-m", "--max-time"], OptionKind::MaxTime),
    value(&["--url"], OptionKind::Url),
    flag(&["-:", "--next"], OptionKind::Next),
    // Accepted and dropped.
    flag(&["-s", "--silent"], OptionKind::Ignored),
    flag(&["-S", "--show-error"], OptionKind::Ignored),
    flag(&["-L", "--location"], OptionKind::Ignored),
    flag(&["-i", "--include"], OptionKind::Ignored),
    flag(&["-v", "--verbose"], OptionKind::Ignored),
    flag(&["-k", "--insecure"], OptionKind::Ignored),
    flag(&["-f", "--fail"], OptionKind::Ignored),
    value(&["-o", "--output"], OptionKind::Ignored),
    value(&["-w", "--write-out"], OptionKind::Ignored),
    value(&["-x", "--proxy"], OptionKind::Ignored),
    value(&["-U", "--proxy-user"], OptionKind::Ignored),
    value(&["-c", "--cookie-jar"], OptionKind::Ignored),
    value(&["-D", "--dump-header"], OptionKind::Ignored),
    value(&["-K", "--config"], OptionKind::Ignored),
    value(&["-r", "--range"], OptionKind::Ignored),
    value(&["-T", "--upload-file"], OptionKind::Ignored),
    value(&["-E", "--cert"], OptionKind::Ignored),
    value(&["-C", "--continue-at"], OptionKind::Ignored),
    value(&["-y", "--speed-time"], OptionKind::Ignored),
    value(&["-Y", "--speed-limit"], OptionKind::Ignored),
    value(&["-z", "--time-cond"], OptionKind::Ignored),
    value(&["-Q", "--quote"], OptionKind::Ignored),
    value(&["--connect-timeout"], OptionKind::Ignored),
    value(&["--cacert"], OptionKind::Ignored),
    value(&["--capath"], OptionKind::Ignored),
    value(&["--key"], OptionKind::Ignored),
    value(&["--cert-type"], OptionKind::Ignored),
    value(&["--key-type"], OptionKind::Ignored),
    value(&["--ciphers"], OptionKind::Ignored),
    value(&["--limit-rate"], OptionKind::Ignored),
    value(&["--max-redirs"], OptionKind::Ignored),
    value(&["--retry"], OptionKind::Ignored),
    value(&["--retry-delay"], OptionKind::Ignored),
    value(&["--retry-max-time"], OptionKind::Ignored),
    value(&["--resolve"], OptionKind::Ignored),
    value(&["--connect-to"], OptionKind::Ignored),
    value(&["--interface"], OptionKind::Ignored),
    value(&["--unix-socket"], OptionKind::Ignored),
    value(&["--proxy-header"], OptionKind::Ignored),
    value(&["--stderr"], OptionKind::Ignored),
    value(&["--trace"], OptionKind::Ignored),
    value(&["--trace-ascii"], OptionKind::Ignored),
];

/// Looks up a `--long` option by its exact spelling.
pub fn lookup_long(name: &str) -> Option<&'static OptionSpec> {
    if !name.starts_with("--") {
        return None;
    }
    OPTIONS.iter().find(|spec| spec.names.contains(&name))
}

/// Looks up the single-dash option `-<ch>`.
pub fn lookup_short(ch: char) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|spec| {
        spec.names.iter().any(|name| {
            let mut chars = name.chars();
            chars.next() == Some('-') && chars.next() == Some(ch) && chars.next().is_none()
        })
    })
}

/// Every spelling of every modeled option, for completion.
pub fn all_spellings() -> impl Iterator<Item = &'static str> {
    OPTIONS
        .iter()
        .filter(|spec| spec.kind != OptionKind::Ignored)
        .flat_map(|spec| spec.names.iter().copied())
}
