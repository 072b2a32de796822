//! zenity-forms - Display composite input dialogs from the command line.

use std::{ffi::OsString, process::ExitCode};

use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};
use zenity_forms::{
    Error, FormResult,
    cli::{self, Command, FormRequest, MessageRequest},
    form, message, output,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let log_filter = init_tracing();

    let command = match cli::parse_args(args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("zenity-forms: {e}");
            eprintln!("Try 'zenity-forms --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if matches!(&command, Command::Form(request) if request.debug) {
        enable_debug_logging(&log_filter);
    }

    match run(command) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("zenity-forms: {e}");
            ExitCode::from(100)
        }
    }
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Logs go to stderr; stdout carries only the answer line. The filter can be
/// raised once `--debug` has been parsed.
fn init_tracing() -> FilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
    handle
}

/// `RUST_LOG`, when set, stays in charge.
fn enable_debug_logging(handle: &FilterHandle) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Err(e) = handle.reload(EnvFilter::new("debug")) {
        tracing::warn!("failed to raise log level: {e}");
    }
}

fn run(command: Command) -> Result<i32, Error> {
    match command {
        Command::Help => {
            print!("{}", cli::HELP);
            Ok(0)
        }
        Command::Version => {
            println!("zenity-forms {VERSION}");
            Ok(0)
        }
        Command::Message(request) => show_message(request),
        Command::Form(request) => show_form(request),
    }
}

fn show_message(request: MessageRequest) -> Result<i32, Error> {
    tracing::debug!(kind = ?request.kind, "showing message box");
    let result = message()
        .title(&request.title)
        .text(&request.text)
        .icon(request.kind.icon())
        .buttons(request.kind.buttons())
        .show()?;

    let (reply, code) = output::message_reply(request.kind, result);
    println!("{reply}");
    Ok(code)
}

fn show_form(request: FormRequest) -> Result<i32, Error> {
    tracing::debug!(items = request.items.len(), "showing form");
    let mut builder = form()
        .title(&request.title)
        .items(request.items.iter().cloned());
    if let Some((width, height)) = request.window_size {
        builder = builder.window_size(width, height);
    }

    match builder.show()? {
        FormResult::Accepted(values) => {
            println!("{}", output::format_line(&request.items, &values, request.debug));
            Ok(0)
        }
        other => Ok(other.exit_code()),
    }
}
