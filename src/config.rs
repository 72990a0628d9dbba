use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use rustyline::EditMode;

use crate::colors::{apply_color_setting, ColorConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Curl,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "curl" => Some(OutputFormat::Curl),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub format: OutputFormat,
    pub edit_mode: EditMode,
    pub prompt: String,
    pub color: bool,
    pub colors: ColorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            edit_mode: EditMode::Emacs,
            prompt: "curl> ".to_string(),
            color: true,
            colors: ColorConfig::default(),
        }
    }
}

pub fn home_file(name: &str) -> Option<PathBuf> {
    env::var("HOME").ok().map(|home| PathBuf::from(home).join(name))
}

/// Reads `~/.curlparserc`. A missing file is not an error; bad lines are reported and skipped.
pub fn load_config(settings: &mut Settings) -> io::Result<()> {
    let Some(path) = home_file(".curlparserc") else {
        return Ok(());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    for (line, err) in apply_config_lines(settings, &content) {
        eprintln!("config:{line}: {err}");
    }
    Ok(())
}

/// Applies every `key=value` line, returning `(line number, error)` for the rejected ones.
pub fn apply_config_lines(settings: &mut Settings, content: &str) -> Vec<(usize, String)> {
    let mut errors = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            errors.push((idx + 1, "unrecognized directive".to_string()));
            continue;
        };
        if let Err(err) = apply_setting(settings, key.trim(), strip_quotes(value.trim())) {
            errors.push((idx + 1, err));
        }
    }
    errors
}

fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<(), String> {
    if let Some(color_key) = key.strip_prefix("color.") {
        return apply_color_setting(&mut settings.colors, color_key, value);
    }
    match key.to_ascii_lowercase().as_str() {
        "format" => {
            settings.format =
                OutputFormat::parse(value).ok_or_else(|| format!("unknown format '{value}'"))?;
        }
        "editmode" => {
            settings.edit_mode =
                parse_edit_mode(value).ok_or_else(|| format!("unknown edit mode '{value}'"))?;
        }
        "prompt" => settings.prompt = value.to_string(),
        "color" => {
            settings.color = match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => return Err(format!("color expects on or off, got '{value}'")),
            };
        }
        _ => return Err(format!("unknown key '{key}'")),
    }
    Ok(())
}

/// `CURLPARSE_FORMAT` and `CURLPARSE_EDITMODE` override the config file.
pub fn apply_env(settings: &mut Settings) {
    if let Ok(value) = env::var("CURLPARSE_FORMAT") {
        match OutputFormat::parse(&value) {
            Some(format) => settings.format = format,
            None => eprintln!("config error: invalid CURLPARSE_FORMAT '{value}'"),
        }
    }
    if let Ok(value) = env::var("CURLPARSE_EDITMODE") {
        match parse_edit_mode(&value) {
            Some(mode) => settings.edit_mode = mode,
            None => eprintln!("config error: invalid CURLPARSE_EDITMODE '{value}'"),
        }
    }
}

fn parse_edit_mode(value: &str) -> Option<EditMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "vi" => Some(EditMode::Vi),
        "emacs" => Some(EditMode::Emacs),
        _ => None,
    }
}

fn strip_quotes(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &input[1..bytes.len() - 1];
        }
    }
    input
}
