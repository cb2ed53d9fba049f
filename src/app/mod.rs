mod controller;
mod intent;
mod layout;
mod mouse;
mod render;

use crate::domain::{CellId, PolicyError, SessionState};
use crate::infra::{
    ConfigError, InitLoggingError, LoadWallConfigError, ResolveCamwallHomeError, WallConfig,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use thiserror::Error;

pub use controller::*;
pub use intent::*;
pub use layout::*;
pub use render::*;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid wall config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    LoadConfig(#[from] LoadWallConfigError),

    #[error(transparent)]
    ResolveHome(#[from] ResolveCamwallHomeError),

    #[error(transparent)]
    Logging(#[from] InitLoggingError),
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub controller: SessionController,
    /// Segment highlighted for keyboard activation; follows the active segment.
    pub timeline_cursor: usize,
    pub terminal_size: (u16, u16),
    pub notice: Option<String>,
    pub help_open: bool,
}

impl AppModel {
    pub fn new(config: WallConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: SessionController::new(config)?,
            timeline_cursor: 0,
            terminal_size: (0, 0),
            notice: None,
            help_open: false,
        })
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    fn move_timeline_cursor(&mut self, delta: isize) {
        let last = self.controller.timeline().segment_count().saturating_sub(1);
        self.timeline_cursor = self
            .timeline_cursor
            .saturating_add_signed(delta)
            .min(last);
    }

    fn sync_timeline_cursor(&mut self) {
        if let Some(index) = self.controller.state().active_segment {
            self.timeline_cursor = index;
        }
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

#[derive(Clone, Debug)]
pub enum AppCommand {
    None,
    Quit,
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Mouse(mouse) => mouse::update_on_mouse(model, mouse),
        AppEvent::Resize(width, height) => {
            (model.with_terminal_size(width, height), AppCommand::None)
        }
    }
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    model.notice = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (model, AppCommand::Quit);
    }

    if model.help_open {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
        ) {
            model.help_open = false;
        }
        return (model, AppCommand::None);
    }

    let active_cell = model.controller.state().active_cell;
    let model = match key.code {
        KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Char('?') | KeyCode::F(1) => {
            model.help_open = true;
            model
        }
        KeyCode::Left => select_neighbor(model, Direction::Left),
        KeyCode::Right => select_neighbor(model, Direction::Right),
        KeyCode::Up => select_neighbor(model, Direction::Up),
        KeyCode::Down => select_neighbor(model, Direction::Down),
        KeyCode::Char(digit @ '1'..='9') => {
            let cell_id = CellId::new(digit.to_digit(10).unwrap_or(1));
            apply_intent(model, Intent::SelectCell { cell_id })
        }
        KeyCode::Char('a') => match active_cell {
            Some(cell_id) => apply_intent(model, Intent::CellGoArchive { cell_id }),
            None => model.with_notice(Some("Select a cell first (1-9 or arrows).".to_string())),
        },
        KeyCode::Char('l') => match active_cell {
            Some(cell_id) => apply_intent(model, Intent::CellGoLive { cell_id }),
            None => model.with_notice(Some("Select a cell first (1-9 or arrows).".to_string())),
        },
        KeyCode::Char('g') => apply_intent(model, Intent::GlobalGoLive),
        KeyCode::Char('s') => {
            let mode = model.controller.state().sync_mode.toggle();
            apply_intent(model, Intent::ToggleSync { mode })
        }
        KeyCode::Char('[') => {
            model.move_timeline_cursor(-1);
            model
        }
        KeyCode::Char(']') => {
            model.move_timeline_cursor(1);
            model
        }
        KeyCode::Home => {
            model.timeline_cursor = 0;
            model
        }
        KeyCode::End => {
            model.move_timeline_cursor(isize::MAX);
            model
        }
        KeyCode::Enter => {
            let segment_index = model.timeline_cursor;
            apply_intent(model, Intent::TimelineActivate { segment_index })
        }
        _ => model,
    };

    (model, AppCommand::None)
}

/// Runs one intent through the controller. Rejections become a notice; the state is unchanged.
pub(super) fn apply_intent(mut model: AppModel, intent: Intent) -> AppModel {
    match model.controller.dispatch(intent) {
        Ok(_diff) => {
            model.sync_timeline_cursor();
            model
        }
        Err(IntentError::Rejected(PolicyError::ArchiveWhileSynced { .. })) => model.with_notice(
            Some("The wall is synced: press s for independent mode to archive one cell.".into()),
        ),
        Err(IntentError::UnknownCell(cell_id)) => {
            let count = model.controller.state().cell_count();
            model.with_notice(Some(format!("No cell {cell_id} on a wall of {count}.")))
        }
        Err(error) => model.with_notice(Some(error.to_string())),
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
}

fn select_neighbor(model: AppModel, direction: Direction) -> AppModel {
    let state = model.controller.state();
    let Some(target) = neighbor(state, direction) else {
        return model;
    };
    if state.active_cell == Some(target) {
        return model;
    }
    apply_intent(model, Intent::SelectCell { cell_id: target })
}

fn neighbor(state: &SessionState, direction: Direction) -> Option<CellId> {
    let ids = state.cell_ids().collect::<Vec<_>>();
    let Some(active) = state.active_cell else {
        return ids.first().copied();
    };
    let index = ids.iter().position(|id| *id == active)?;
    let (cols, _rows) = grid_shape(ids.len());

    let next = match direction {
        Direction::Left if index % cols > 0 => index - 1,
        Direction::Right if index % cols + 1 < cols => index + 1,
        Direction::Up if index >= cols => index - cols,
        Direction::Down => index + cols,
        _ => index,
    };
    ids.get(next).copied().or(Some(active))
}
