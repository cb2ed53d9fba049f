mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel};
use crate::cli::CliInvocation;
use crate::infra::{
    LogTarget, WallConfig, WallConfigOverrides, init_logging, load_wall_config, log_file_path,
    resolve_camwall_home,
};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

fn main() {
    if let Err(error) = run_main() {
        log::error!("{error}");
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui { overrides } => Ok(run_tui(&overrides)?),
        CliInvocation::Command { command, overrides } => {
            init_logging(LogTarget::Stderr).map_err(app::AppError::from)?;
            let config = load_config(&overrides)?;
            crate::cli::run(command, config)?;
            Ok(())
        }
    }
}

/// Config file values with command-line overrides applied on top.
fn load_config(overrides: &WallConfigOverrides) -> Result<WallConfig, app::AppError> {
    let home = resolve_camwall_home()?;
    let config = load_wall_config(&home)?;
    Ok(overrides.apply(config))
}

fn print_help() {
    let text = format!(
        "{name} - camera wall with live and archive playback\n\nUSAGE:\n  {name} [FLAGS]                      Start the TUI\n  {name} segments [FLAGS]             Print the timeline segments\n  {name} replay [FILE|-] [--json] [FLAGS]  Apply an intent script and print render events\n  {name} --help | --version\n\nFLAGS:\n  --cells N                 Number of cells on the wall (default: 4)\n  --segments N              Timeline segments (default: 12)\n  --hours N                 Timeline span in hours (default: 24)\n  --default-position SECS   Position for a cell archived on its own (default: 3600)\n  --sync MODE               synced|independent (default: synced)\n  --timeline-rule RULE      promote|active|ignore: timeline click in independent mode with\n                            nothing archived (default: promote)\n\nREPLAY SCRIPT (one intent per line, # comments):\n  select N | live N | archive N | segment I | seek SECS | go-live | sync synced|independent\n\nOUTPUT:\n  segments: index<TAB>start<TAB>end<TAB>midpoint\n  replay: one line per render event (JSON objects with --json); rejections go to stderr\n\nENV:\n  CAMWALL_HOME   Config and log dir (default: ~/.camwall)\n  CAMWALL_LOG    Log filter (default: warn on stderr, info in camwall.log for the TUI)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(overrides: &WallConfigOverrides) -> Result<(), app::AppError> {
    let home = resolve_camwall_home()?;
    init_logging(LogTarget::File(log_file_path(&home)))?;
    let config = overrides.apply(load_wall_config(&home)?);
    let mut model = AppModel::new(config)?;

    let config = model.controller.config();
    log::info!(
        "starting wall: {} cells, {} segments over {}h, {}",
        config.cell_count,
        config.segment_count,
        config.total_hours,
        config.sync_mode.label()
    );

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }

    let result = run(&mut terminal, model);
    let restore = restore_terminal(&mut terminal);
    result?;
    restore
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableMouseCapture);
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut model: AppModel,
) -> Result<(), app::AppError> {
    loop {
        terminal.draw(|frame| ui::render(frame, &model))?;

        let event = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Release => continue,
            Event::Key(key) => AppEvent::Key(key),
            Event::Mouse(mouse) => AppEvent::Mouse(mouse),
            Event::Resize(width, height) => AppEvent::Resize(width, height),
            _ => continue,
        };

        let (next, command) = app::update(model, event);
        model = next;
        if let AppCommand::Quit = command {
            log::info!("quit");
            return Ok(());
        }
    }
}
