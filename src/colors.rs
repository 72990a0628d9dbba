use curlparse::render::TextStyle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorConfig {
    pub method: String,
    pub url: String,
    pub header: String,
    pub hint: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            method: "green".to_string(),
            url: "cyan".to_string(),
            header: "yellow".to_string(),
            hint: "bright_black".to_string(),
        }
    }
}

impl ColorConfig {
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            method: resolve_color(&self.method),
            url: resolve_color(&self.url),
            header: resolve_color(&self.header),
            hint: resolve_color(&self.hint),
        }
    }
}

/// Maps a color name (or `ansi:<raw>`) to its escape sequence; unknown names map to nothing.
pub fn resolve_color(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return String::new();
    }
    if let Some(rest) = trimmed.strip_prefix("ansi:") {
        return rest.to_string();
    }
    if trimmed.contains('\x1b') {
        return trimmed.to_string();
    }
    match trimmed.to_lowercase().as_str() {
        "black" => "\x1b[30m",
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        "bright_black" | "gray" | "grey" => "\x1b[90m",
        "bright_red" => "\x1b[91m",
        "bright_green" => "\x1b[92m",
        "bright_yellow" => "\x1b[93m",
        "bright_blue" => "\x1b[94m",
        "bright_magenta" => "\x1b[95m",
        "bright_cyan" => "\x1b[96m",
        "bright_white" => "\x1b[97m",
        "bold" => "\x1b[1m",
        "dim" => "\x1b[2m",
        _ => "",
    }
    .to_string()
}

pub fn apply_color_setting(config: &mut ColorConfig, key: &str, value: &str) -> Result<(), String> {
    let slot = match key {
        "method" => &mut config.method,
        "url" => &mut config.url,
        "header" => &mut config.header,
        "hint" => &mut config.hint,
        _ => return Err(format!("unknown color key '{key}'")),
    };
    *slot = value.to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_raw_colors() {
        assert_eq!(resolve_color("Red"), "\x1b[31m");
        assert_eq!(resolve_color("ansi:\x1b[38;5;208m"), "\x1b[38;5;208m");
        assert_eq!(resolve_color("none"), "");
        assert_eq!(resolve_color("chartreuse"), "");
    }

    #[test]
    fn settings_by_key() {
        let mut config = ColorConfig::default();
        apply_color_setting(&mut config, "url", "blue").unwrap();
        assert_eq!(config.url, "blue");
        assert!(apply_color_setting(&mut config, "prompt", "red").is_err());
        assert_eq!(config.text_style().url, "\x1b[34m");
    }
}
