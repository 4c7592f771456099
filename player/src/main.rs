use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use embed_core::{BlockContent, EmbedConfig, EnvMotionPreference, MotionPreference};
use ratatui::{Terminal, backend::CrosstermBackend, style::Color};

// Debug logger to file; the TUI owns stdout
fn debug_log(message: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open("embed_player_debug.log")
    {
        let datetime = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(file, "[{}] {}", datetime, message);
    }
}

mod app;
mod commands;
mod events;
mod ui;

use app::{App, authored_block, load_page};
use events::event_utils;

/// Preview how video blocks are decorated and activated
#[derive(Parser, Debug)]
#[command(name = "embed-player", version, about)]
struct Args {
    /// Video reference (YouTube, Vimeo or a file URL) for a single block
    reference: Option<String>,

    /// JSON file with the authored blocks of a page
    #[arg(long, value_name = "FILE", conflicts_with = "reference")]
    page: Option<PathBuf>,

    /// Request autoplay on the single block
    #[arg(long)]
    autoplay: bool,

    /// Request background playback on the single block
    #[arg(long)]
    background: bool,

    /// Preview image shown until the user clicks play
    #[arg(long, value_name = "IMG")]
    preview: Option<String>,

    /// Title override for the embed
    #[arg(long)]
    title: Option<String>,

    /// Act as if the user prefers reduced motion
    #[arg(long)]
    reduced_motion: bool,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decorate, view and ready every block, print the markup and exit
    #[arg(long)]
    print: bool,
}

/// Explicit `--config`, then `<config dir>/embed-player/config.json`, then defaults
fn load_config(explicit: Option<&PathBuf>) -> Result<EmbedConfig> {
    if let Some(path) = explicit {
        return EmbedConfig::load(path);
    }

    match dirs::config_dir().map(|dir| dir.join("embed-player").join("config.json")) {
        Some(path) if path.exists() => EmbedConfig::load(&path),
        _ => Ok(EmbedConfig::default()),
    }
}

fn initial_blocks(args: &Args) -> Result<Vec<BlockContent>> {
    if let Some(page) = &args.page {
        return load_page(page);
    }
    Ok(args
        .reference
        .as_deref()
        .map(|reference| {
            authored_block(
                reference,
                args.autoplay,
                args.background,
                args.preview.as_deref(),
                args.title.as_deref(),
            )
        })
        .into_iter()
        .collect())
}

fn print_page(app: &mut App) {
    let activated = app.view_all();
    let ready = app.ready_all();
    log::info!("Print mode: {} activated, {} ready", activated, ready);
    println!("{}", app.page_html());
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    debug_log("Application starting");

    let config = load_config(args.config.as_ref()).context("Failed to load configuration")?;
    let reduced_motion = args.reduced_motion || EnvMotionPreference.prefers_reduced_motion();

    let mut app = App::new(config, reduced_motion);
    app.load(initial_blocks(&args)?);
    debug_log(&format!(
        "Loaded {} block(s), reduced motion: {}",
        app.blocks.len(),
        reduced_motion
    ));

    if args.print {
        print_page(&mut app);
        return Ok(());
    }

    // Set up clean terminal restoration on panic
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        debug_log(&format!("PANIC: {}", panic_info));
        orig_hook(panic_info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        debug_log(&format!("Failed to setup terminal: {}", e));
        return Err(e).context("Failed to setup terminal");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(term) => term,
        Err(e) => {
            let _ = disable_raw_mode();
            debug_log(&format!("Failed to create terminal: {}", e));
            return Err(e).context("Failed to create terminal");
        }
    };

    if app.blocks.is_empty() {
        app.set_status("No blocks yet, try :open <reference>", Color::Yellow);
    }

    let run_result = run(&mut terminal, &mut app);

    debug_log("CLEANUP: Starting terminal cleanup sequence");
    let cleanup_result = (|| -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    })();

    if let Err(e) = cleanup_result {
        debug_log(&format!("Error during cleanup: {}", e));
        eprintln!("Error during cleanup: {}", e);
    }

    debug_log("Application terminated");
    run_result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(80);
    let mut last_tick = Instant::now();

    while !app.should_quit {
        if let Err(e) = terminal.draw(|f| {
            if let Err(e) = ui::draw_ui(f, app) {
                debug_log(&format!("ERROR: UI draw function error: {}", e));
            }
        }) {
            debug_log(&format!("ERROR: Terminal draw error: {}", e));
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;

            if event_utils::is_terminate_event(&event) {
                debug_log("ACTION: Quit key pressed, exiting application");
                app.should_quit = true;
                break;
            }

            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if event_utils::is_command_event(&event) && !app.is_command_mode() {
                        app.enter_command_mode();
                    } else if app.is_command_mode() && key.code == event::KeyCode::Enter {
                        let cmd = app.get_command_buffer().to_string();
                        app.exit_command_mode();
                        if let Err(e) = commands::handle_command(app, &cmd) {
                            debug_log(&format!("Command error: {}", e));
                            app.set_status(format!("Error: {}", e), Color::Red);
                        }
                    } else {
                        if event_utils::is_navigation_event(&event) {
                            debug_log(&format!("EVENT: Navigation {:?}", key.code));
                        }
                        if let Err(e) = app.handle_key_event(key) {
                            debug_log(&format!("Key handler error: {}", e));
                            app.set_status(format!("Key error: {}", e), Color::Red);
                        }
                    }
                }
                Event::Resize(w, h) => {
                    debug_log(&format!("Resize event: {}x{}", w, h));
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if let Err(e) = app.update() {
                debug_log(&format!("App update error: {}", e));
                app.set_status(format!("Error: {}", e), Color::Red);
            }
            last_tick = Instant::now();
        }
    }

    Ok(())
}
