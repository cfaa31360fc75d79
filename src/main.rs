//! Relief Ops: terminal operations console for disaster-relief logistics
//!
//! Logs go to a file since the terminal belongs to the UI.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use relief_ops::tui::App;
use relief_ops::{Config, Operations};
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "relief-ops", version, about = "Disaster-relief operations console")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the simulated updates
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the scripted demo disaster
    #[arg(long)]
    no_demo: bool,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = File::create(&config.logging.file)
        .with_context(|| format!("creating log file {}", config.logging.file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    while app.running {
        app.tick();
        terminal.draw(|frame| app.render(frame))?;

        if !app.handle_input()? {
            break;
        }
    }
    Ok(())
}

/// Undo raw mode and the alternate screen. Every step runs; the first
/// failure is returned.
fn restore_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> std::io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    raw.and(screen).and(cursor)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_demo {
        config.demo.enabled = false;
    }
    if let Some(path) = args.log_file {
        config.logging.file = path;
    }

    init_logging(&config)?;
    tracing::info!(version = relief_ops::VERSION, "starting relief-ops");

    let mut app = App::new(Operations::new(config));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    let cleanup = restore_terminal(&mut terminal);

    if let Err(e) = &result {
        tracing::error!(error = %e, "console exited with error");
    }
    result?;
    cleanup?;

    let m = &app.ops.store().metrics;
    println!("\nRelief Ops session closed.");
    println!(
        "  people helped: {}  waste prevented: {} kg  cost saved: ${}\n",
        m.people_helped, m.waste_prevented_kg, m.cost_saved
    );

    Ok(())
}
