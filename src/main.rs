use clap::{Parser, Subcommand};
use sbox::core::config::{self, Config, ConfigError};
use sbox::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sbox", version, about = "A simple viewer for Scrapbox")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Register your project name
    #[command(visible_alias = "r")]
    Register {
        /// Project name as it appears in scrapbox.io/<name>
        name: Option<String>,
    },
    /// Browse the pages of your project (default)
    #[command(visible_alias = "v")]
    View,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let result = match args.command {
        Some(Command::Register { name }) => register(name.as_deref().unwrap_or_default()),
        Some(Command::View) | None => view(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// File logger at `<cache dir>/sbox/sbox.log`. The terminal belongs to the TUI.
fn init_logging() {
    let level = std::env::var("SBOX_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let Some(dir) = dirs::cache_dir().map(|d| d.join("sbox")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(log_file) = File::create(dir.join("sbox.log")) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
    log::info!("sbox {} starting up", env!("CARGO_PKG_VERSION"));
}

fn register(name: &str) -> Result<(), Box<dyn Error>> {
    let config = config::register_project(name)?;
    println!(
        "success: Register your project name successfully!\nProject Name: {}",
        config.project
    );
    Ok(())
}

fn view() -> Result<(), Box<dyn Error>> {
    let config = load_or_prompt()?;
    tui::run(config::resolve(&config))?;
    Ok(())
}

/// Loads the config, asking for a project name on stdin until one is registered.
fn load_or_prompt() -> Result<Config, Box<dyn Error>> {
    let stdin = io::stdin();
    loop {
        match config::load_config() {
            Ok(config) => return Ok(config),
            Err(ConfigError::NoConfigDir) => return Err(ConfigError::NoConfigDir.into()),
            Err(e) => eprintln!("error: {e}"),
        }

        print!("Your project name?\n>");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err("no project name given".into());
        }
        if let Err(e) = register(&line) {
            eprintln!("error: {e}");
        }
    }
}
