mod app;
mod event;
mod ui;

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    cursor::{Hide, Show},
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use ledsign::config::{self, CliArgs, Config};

use crate::app::App;
use crate::event::EventHandler;

/// Tick period when the frame cap is disabled
const UNCAPPED_TICK_MS: u64 = 8;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    if cli.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(());
    }

    // Initialize color-eyre with custom panic hook that restores terminal
    install_panic_hook();

    let config = config::load(&cli)?;
    let _log_guard = init_logging(cli.log.as_deref(), &config.general.log_level)?;

    info!("ledsign starting");

    let options = config.resolve().wrap_err("Invalid sign configuration")?;
    let playlist = config.playlist(&playlist_base_dir(&cli));
    let fps = options.fps;

    // Setup terminal
    enable_raw_mode().wrap_err("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange, Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(options, playlist, size.width, size.height)?;

    let tick_ms = if fps == 0 {
        UNCAPPED_TICK_MS
    } else {
        (1000 / u64::from(fps)).max(1)
    };
    let mut event_handler = EventHandler::new(tick_ms);

    // ── Main event loop ───────────────────────────────────────────────
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        match event_handler.next().await {
            Some(event) => app.handle_event(event),
            None => break,
        }
        if app.should_quit {
            break;
        }
    }

    event_handler.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange,
        Show
    )?;

    app.shutdown();
    info!("ledsign exiting");
    Ok(())
}

/// Relative playlist files resolve against the config file's directory,
/// or the working directory for a pattern given on the command line.
fn playlist_base_dir(cli: &CliArgs) -> PathBuf {
    if cli.pattern.is_some() {
        return PathBuf::from(".");
    }
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Install a panic hook that restores the terminal before printing the panic
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange, Show);
        // Call default handler
        default_hook(panic_info);
    }));
    color_eyre::install().ok();
}

/// Initialize tracing to a log file. `RUST_LOG` wins over the configured
/// level. The returned guard flushes the writer on drop.
fn init_logging(log_path: Option<&Path>, level: &str) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::EnvFilter;

    if let Some(path) = log_path {
        let file = std::fs::File::create(path)
            .wrap_err_with(|| format!("Failed to create log file {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
            )
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Ok(Some(guard))
    } else {
        // No logging if no log path specified (can't log to stdout in a TUI)
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .with_writer(io::sink)
            .init();
        Ok(None)
    }
}
