use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use docshelf::catalog::Catalog;
use docshelf::event_source::TerminalEventSource;
use docshelf::panic_handler::initialize_panic_handler;
use docshelf::settings::load_settings;
use docshelf::viewer::{FileBackend, TerminalPlatform};
use docshelf::{App, run_app_with_event_source};

/// Browse a catalog of images and PDFs in the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Catalog file; defaults to the one named in the settings, then ./catalog.yaml
    catalog: Option<PathBuf>,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", default_value = "docshelf.log")]
    log_file: PathBuf,

    /// error, warn, info, debug or trace; overrides the settings file
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,

    /// Keyboard only: no mouse capture and no gestures
    #[arg(long)]
    no_mouse: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref());

    let level = match args.log_level {
        Some(level) => level,
        None => settings.log_level.parse().unwrap_or(LevelFilter::Info),
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("cannot create log file {}", args.log_file.display()))?,
    )?;
    info!("Starting docshelf");

    let catalog_path = args
        .catalog
        .or_else(|| settings.catalog.clone())
        .unwrap_or_else(|| PathBuf::from("catalog.yaml"));
    let catalog = Catalog::load(&catalog_path)?;

    let mouse = settings.mouse && !args.no_mouse;
    let platform = if mouse {
        TerminalPlatform::new(true).with_shell_capture()
    } else {
        TerminalPlatform::new(false)
    };
    let mut app = App::new(
        catalog,
        &settings,
        Arc::new(FileBackend::default()),
        Box::new(platform),
    );

    initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);
    drop(app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }
    info!("Shutting down docshelf");
    res
}
