//! Parser for pasted curl command lines.
//!
//! The library is pure: `parse` turns a (possibly multi-line) shell snippet into
//! the HTTP requests its `curl` invocations describe. The interactive and file
//! front end lives in the `curlparse` binary behind the `cli` feature.

pub mod error;
pub mod model;
pub mod parse;
pub mod render;

pub use error::{ErrorKind, ParseError, ParseResult};
pub use model::{
    Auth, AuthType, Body, BodyType, Conversion, Fields, FileReference, FileSource, Headers,
    KeyValue, Request, Value,
};
pub use parse::{tokenize, Token};
pub use render::{to_curl_command, to_text};

/// Parses every `curl` invocation in `input`.
///
/// Input without a `curl` word yields an empty list. Any grammar violation
/// aborts the whole parse.
pub fn parse(input: &str) -> ParseResult<Vec<Request>> {
    parse::parse_tokens(parse::tokenize(input))
}

/// Fuzz helper for parser-only targets.
pub fn fuzz_parse_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    if let Ok(requests) = parse(&input) {
        for request in &requests {
            let _ = parse(&to_curl_command(request));
        }
    }
}
