use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

use fleetwatch::app::{App, View};
use fleetwatch::config::Settings;
use fleetwatch::events;
use fleetwatch::fetch::fetch_devices;
use fleetwatch::stream::{HttpStreamTransport, Transport};
use fleetwatch::ui;

#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(about = "Terminal console for monitoring live device fleet telemetry")]
struct Args {
    /// Base URL of the telemetry backend
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device id to start streaming immediately
    #[arg(short, long)]
    device: Option<String>,

    /// Rolling window age bound in seconds
    #[arg(long)]
    window_secs: Option<f64>,

    /// Rolling window point cap
    #[arg(long)]
    max_points: Option<usize>,

    /// Event log cap
    #[arg(long)]
    max_events: Option<usize>,

    /// Delay between stream close and reconnect, in milliseconds
    #[arg(long)]
    reconnect_ms: Option<u64>,

    /// Append diagnostic logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.base_url = url;
    }
    if let Some(window_secs) = args.window_secs {
        settings.window_secs = window_secs;
    }
    if let Some(max_points) = args.max_points {
        settings.max_points = max_points;
    }
    if let Some(max_events) = args.max_events {
        settings.max_events = max_events;
    }
    if let Some(reconnect_ms) = args.reconnect_ms {
        settings.reconnect_ms = reconnect_ms;
    }

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    // The runtime drives transport reader tasks in the background while the
    // main thread runs the TUI loop
    let runtime = tokio::runtime::Runtime::new()?;
    let client = reqwest::Client::new();
    let transport: Arc<dyn Transport> = Arc::new(HttpStreamTransport::new(
        settings.base_url.clone(),
        runtime.handle().clone(),
    ));

    let mut app = App::new(transport, settings);
    if let Some(ref device_id) = args.device {
        app.start_stream(device_id);
    }

    run_tui(&runtime, &client, app)
}

/// Route tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fleetwatch=debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Run the TUI with the given app state
fn run_tui(runtime: &tokio::runtime::Runtime, client: &reqwest::Client, mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(runtime, client, &mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    runtime: &tokio::runtime::Runtime,
    client: &reqwest::Client,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    let tick_interval = app.settings.tick_interval();

    while app.running {
        // Serve a pending inventory fetch before drawing
        if app.refresh_requested {
            app.refresh_requested = false;
            let result = runtime.block_on(fetch_devices(client, &app.settings.base_url));
            app.apply_devices(result);
        }

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Fleet => ui::devices::render(frame, app, chunks[2]),
                View::Telemetry => ui::telemetry::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(tick_interval)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Drain stream events and fire any due reconnect
        app.tick(Instant::now());
    }

    Ok(())
}
