use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use log::{debug, info};
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use curlparse::render::{to_curl_command, to_text_styled, TextStyle};
use curlparse::{tokenize, ParseError, Request};

mod colors;
mod completion;
mod config;
mod io_helpers;

use completion::LineHelper;
use config::{apply_env, home_file, load_config, OutputFormat, Settings};
use io_helpers::{read_batch_input, read_input_line};

const USAGE: &str = "usage: curlparse [--json|--text|--curl] [--no-color] [FILE]";

const EXIT_NO_REQUEST: u8 = 1;
const EXIT_ERROR: u8 = 2;

struct Args {
    format: Option<OutputFormat>,
    no_color: bool,
    path: Option<String>,
}

fn main() -> ExitCode {
    init_logging();
    let args = match parse_args(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n{USAGE}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut settings = Settings::default();
    if let Err(err) = load_config(&mut settings) {
        eprintln!("config error: {err}");
    }
    apply_env(&mut settings);
    if let Some(format) = args.format {
        settings.format = format;
    }
    if args.no_color || env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal() {
        settings.color = false;
    }

    let interactive = args.path.as_deref().map_or(true, |path| path == "-")
        && io::stdin().is_terminal();
    let result = if interactive {
        run_interactive(&settings)
    } else {
        run_batch(&settings, args.path.as_deref())
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("CURLPARSE_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// `Ok(None)` means help was requested.
fn parse_args(args: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut parsed = Args {
        format: None,
        no_color: false,
        path: None,
    };
    for arg in args {
        match arg.as_str() {
            "--json" => parsed.format = Some(OutputFormat::Json),
            "--text" => parsed.format = Some(OutputFormat::Text),
            "--curl" => parsed.format = Some(OutputFormat::Curl),
            "--no-color" => parsed.no_color = true,
            "-h" | "--help" => return Ok(None),
            _ if arg.starts_with('-') && arg != "-" => {
                return Err(format!("unknown option '{arg}'"));
            }
            _ if parsed.path.is_some() => return Err(format!("unexpected argument '{arg}'")),
            _ => parsed.path = Some(arg),
        }
    }
    Ok(Some(parsed))
}

fn run_batch(settings: &Settings, path: Option<&str>) -> io::Result<ExitCode> {
    let input = read_batch_input(path)?;
    debug!("input event=read bytes={}", input.len());
    match curlparse::parse(&input) {
        Ok(requests) if requests.is_empty() => {
            eprintln!("no curl command found");
            Ok(ExitCode::from(EXIT_NO_REQUEST))
        }
        Ok(requests) => {
            print_requests(settings, &requests)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error(&input, &err);
            Ok(ExitCode::from(EXIT_ERROR))
        }
    }
}

fn run_interactive(settings: &Settings) -> io::Result<ExitCode> {
    let config = Config::builder()
        .auto_add_history(true)
        .edit_mode(settings.edit_mode)
        .build();
    let mut editor: Editor<LineHelper, DefaultHistory> =
        Editor::with_config(config).map_err(io::Error::other)?;
    editor.set_helper(Some(LineHelper::new(&settings.colors)));

    let history_path = home_file(".curlparse_history");
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }
    info!("repl event=start history={:?}", history_path);

    while let Some(entry) = read_input_line(&mut editor, &settings.prompt)? {
        if entry.trim().is_empty() {
            continue;
        }
        match curlparse::parse(&entry) {
            Ok(requests) if requests.is_empty() => eprintln!("no curl command found"),
            Ok(requests) => print_requests(settings, &requests)?,
            Err(err) => report_error(&entry, &err),
        }
    }

    if let Some(path) = &history_path {
        if let Err(err) = editor.save_history(path) {
            debug!("repl event=history-save-failed error={}", err);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_requests(settings: &Settings, requests: &[Request]) -> io::Result<()> {
    match settings.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(requests).map_err(io::Error::other)?;
            println!("{json}");
        }
        OutputFormat::Curl => {
            for request in requests {
                println!("{}", to_curl_command(request));
            }
        }
        OutputFormat::Text => {
            let style = if settings.color {
                settings.colors.text_style()
            } else {
                TextStyle::default()
            };
            let blocks: Vec<String> = requests
                .iter()
                .map(|request| to_text_styled(request, &style))
                .collect();
            println!("{}", blocks.join("\n\n"));
        }
    }
    Ok(())
}

fn report_error(input: &str, err: &ParseError) {
    let tokens: Vec<String> = tokenize(input)
        .iter()
        .map(|token| token.as_str().to_string())
        .collect();
    eprintln!("parse error: {}", err.display_with_tokens(&tokens));
}
