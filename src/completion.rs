use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::Hinter;
use rustyline::history::SearchDirection;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use curlparse::parse::options::all_spellings;

use crate::colors::{resolve_color, ColorConfig};

mod matching;

use matching::best_suggestion;

pub struct LineHelper {
    completer: FilenameCompleter,
    hinter: HistoryAutosuggest,
    highlighter: MatchingBracketHighlighter,
    options: Vec<&'static str>,
    hint_color: String,
}

impl LineHelper {
    pub fn new(colors: &ColorConfig) -> Self {
        let mut options: Vec<&'static str> = all_spellings().collect();
        options.sort_unstable();
        Self {
            completer: FilenameCompleter::new(),
            hinter: HistoryAutosuggest,
            highlighter: MatchingBracketHighlighter::new(),
            options,
            hint_color: colors.hint.clone(),
        }
    }

    /// Completion of the option being typed, or a ` -> --fix` typo hint.
    fn option_hint(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (_, token) = current_token(line, pos);
        if !token.starts_with("--") || token.len() < 3 {
            return None;
        }
        let suggestion = best_suggestion(&token, &self.options)?;
        if let Some(remainder) = suggestion.strip_prefix(token.as_str()) {
            return (!remainder.is_empty()).then(|| remainder.to_string());
        }
        Some(format!(" -> {suggestion}"))
    }
}

struct HistoryAutosuggest;

impl Hinter for HistoryAutosuggest {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        if line.is_empty() || pos < line.len() {
            return None;
        }
        let history = ctx.history();
        let start = if ctx.history_index() == history.len() {
            ctx.history_index().saturating_sub(1)
        } else {
            ctx.history_index()
        };
        let result = history
            .starts_with(line, start, SearchDirection::Reverse)
            .ok()
            .flatten()?;
        let remainder = result.entry.get(pos..)?;
        if remainder.is_empty() {
            return None;
        }
        Some(remainder.to_string())
    }
}

fn current_token(line: &str, pos: usize) -> (usize, String) {
    let start = line[..pos]
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace() || matches!(ch, '|' | '&' | ';' | '>'))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    (start, line[start..pos].to_string())
}

/// True while the buffer ends inside a quote or with a line continuation.
pub(crate) fn needs_continuation(input: &str) -> bool {
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;
    let mut ansi = false;
    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (None, '\\') => {
                if chars.next().is_none() {
                    return true;
                }
            }
            (None, '$') if chars.peek() == Some(&'\'') => {
                chars.next();
                quote = Some('\'');
                ansi = true;
            }
            (None, '\'' | '"') => quote = Some(ch),
            (Some('"'), '\\') => {
                if chars.next().is_none() {
                    return true;
                }
            }
            (Some('\''), '\\') if ansi => {
                chars.next();
            }
            (Some(open), _) if ch == open => {
                quote = None;
                ansi = false;
            }
            _ => {}
        }
    }
    quote.is_some()
}

impl Helper for LineHelper {}

impl Completer for LineHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let (start, token) = current_token(line, pos);
        if token.starts_with('-') {
            let pairs = self
                .options
                .iter()
                .filter(|option| option.starts_with(token.as_str()))
                .map(|option| Pair {
                    display: option.to_string(),
                    replacement: option.to_string(),
                })
                .collect();
            return Ok((start, pairs));
        }
        if let Some(path) = token.strip_prefix('@') {
            let (_, pairs) = self.completer.complete_path(path, path.len())?;
            let pairs = pairs
                .into_iter()
                .map(|pair| Pair {
                    display: pair.display,
                    replacement: format!("@{}", pair.replacement),
                })
                .collect();
            return Ok((start, pairs));
        }
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for LineHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.option_hint(line, pos)
            .or_else(|| self.hinter.hint(line, pos, ctx))
    }
}

impl Highlighter for LineHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        self.highlighter.highlight_prompt(prompt, default)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        let color = resolve_color(&self.hint_color);
        if hint.is_empty() || color.is_empty() {
            return Cow::Borrowed(hint);
        }
        Cow::Owned(format!("{color}{hint}\x1b[0m"))
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        completion: rustyline::CompletionType,
    ) -> Cow<'c, str> {
        self.highlighter.highlight_candidate(candidate, completion)
    }

    fn highlight_char(&self, line: &str, pos: usize) -> bool {
        self.highlighter.highlight_char(line, pos)
    }
}

impl Validator for LineHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> Result<ValidationResult, ReadlineError> {
        if needs_continuation(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}
