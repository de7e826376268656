//! slidewise - Terminal Slide Viewer
//!
//! Renders lecture slides in the terminal beside their AI-generated summaries.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use slidewise::render::ui::TerminalUI;
use slidewise::{Application, HttpBackend, PdfiumOpener, PreferencesStore, ViewerConfig};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_one::<PathBuf>("log-file").map(PathBuf::as_path))?;

    let config = load_config(&matches)?;
    log::info!(
        "slidewise {} viewing {} from {}",
        slidewise::VERSION,
        config.document,
        config.server_url
    );

    let backend = HttpBackend::from_config(&config).context("configuring backend client")?;
    let opener = PdfiumOpener::new(config.pdfium_library.clone());
    let ui_renderer = Box::new(TerminalUI::new()?);

    let mut app = Application::new(
        config,
        Arc::new(backend),
        Arc::new(opener),
        PreferencesStore::default_location(),
        ui_renderer,
    )?;

    app.run().await?;

    Ok(())
}

fn cli() -> Command {
    Command::new("slidewise")
        .version(slidewise::VERSION)
        .about("Terminal slide viewer with AI-generated summaries")
        .long_about(
            "slidewise renders a lecture PDF served by the summarization backend, shows the \
             summary of each slide next to it and relays questions about the current slide.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (default: <config dir>/slidewise/config.toml)"),
        )
        .arg(
            Arg::new("server")
                .long("server")
                .short('s')
                .value_name("URL")
                .help("Base URL of the summarization backend"),
        )
        .arg(
            Arg::new("document")
                .long("document")
                .short('d')
                .value_name("NAME")
                .help("Document name, served as /pdf/<NAME>.pdf"),
        )
        .arg(
            Arg::new("scale")
                .long("scale")
                .value_name("FACTOR")
                .value_parser(value_parser!(f32))
                .help("Render scale factor applied to each page"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write logs to this file (level from RUST_LOG, default info)"),
        )
}

fn load_config(matches: &ArgMatches) -> Result<ViewerConfig> {
    let path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = ViewerConfig::load(path).context("loading configuration")?;

    if let Some(server) = matches.get_one::<String>("server") {
        config.server_url = server.clone();
    }
    if let Some(document) = matches.get_one::<String>("document") {
        config.document = document.clone();
    }
    if let Some(scale) = matches.get_one::<f32>("scale") {
        config.render_scale = *scale;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Logs go to `--log-file`. Without one they are off unless RUST_LOG is set, since stderr
/// shares the raw-mode terminal.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            if std::env::var_os("RUST_LOG").is_none() {
                builder.filter_level(log::LevelFilter::Info);
            }
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if std::env::var_os("RUST_LOG").is_some() => {
            builder.target(env_logger::Target::Stderr);
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}
