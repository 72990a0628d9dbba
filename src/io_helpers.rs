use std::fs;
use std::io::{self, Read};

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::completion::LineHelper;

/// One (possibly multi-line) entry from the editor. `None` on end of input;
/// Ctrl-C yields an empty entry.
pub fn read_input_line(
    editor: &mut Editor<LineHelper, DefaultHistory>,
    prompt: &str,
) -> io::Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
        Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(io::Error::other(err)),
    }
}

/// Whole input from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_batch_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) if path != "-" => fs::read_to_string(path),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
