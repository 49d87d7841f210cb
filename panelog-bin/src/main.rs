mod cli;

use clap::Parser;
use cli::{Cli, resolve_layout, user_layout_path};
use crossterm::event;
use panelog_file::FileTailSource;
use panelog_framework::{Viewer, start_viewer};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        style::{Color, ResetColor, SetBackgroundColor},
        terminal::{
            Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
            enable_raw_mode,
        },
    },
};
use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // everything that can reject the configuration happens before the screen is taken
    let viewer = match build_viewer(&cli) {
        Ok(viewer) => viewer,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = viewer.shutdown_signal();
    if let Err(e) = ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed)) {
        log::warn!("Could not install signal handler: {}", e);
    }

    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = restore_terminal();
            eprintln!("Error: could not set up terminal: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Ensure we restore the terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let app_result = start_viewer(&mut terminal, viewer);

    // Always restore terminal before printing or exiting
    let _ = restore_terminal();

    match app_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Application Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}

fn build_viewer(cli: &Cli) -> anyhow::Result<Viewer> {
    let user_layout = user_layout_path();
    let layout = resolve_layout(cli.config.as_deref(), user_layout.as_deref())?;

    let mut viewer = Viewer::new(&layout, cli.viewer_desc())?;
    for path in &cli.log_files {
        let source = FileTailSource::new(path.clone()).tail_only(cli.tail_only);
        viewer.add_source(source, None)?;
    }

    Ok(viewer)
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // alternate screen keeps the shell scrollback clean; mouse capture drives wheel scrolling
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    execute!(
        stdout,
        SetBackgroundColor(Color::Reset),
        Clear(ClearType::All)
    )?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();

    let _ = execute!(stdout, ResetColor);
    let _ = execute!(stdout, DisableMouseCapture);
    let _ = execute!(stdout, LeaveAlternateScreen);

    // Drain pending events so they don't leak to the shell
    while event::poll(Duration::from_millis(0)).unwrap_or(false) {
        let _ = event::read();
    }

    let _ = disable_raw_mode();

    Ok(())
}
