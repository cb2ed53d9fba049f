use super::{Intent, RenderDiff};
use crate::domain::{
    CellId, Effect, InvalidTransitionError, PolicyError, SessionState, SynchronizationPolicy,
    TimelineError, TimelineModel,
};
use crate::infra::{ConfigError, WallConfig};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum IntentError {
    #[error("unknown cell {0}")]
    UnknownCell(CellId),

    #[error(transparent)]
    OutOfRange(#[from] TimelineError),

    #[error(transparent)]
    Rejected(#[from] PolicyError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransitionError),
}

/// Single owner of the wall state.
///
/// Each intent is planned against one snapshot, applied to a staged copy and committed only when
/// every planned transition succeeded. A failed intent leaves the state exactly as it was.
#[derive(Clone, Debug)]
pub struct SessionController {
    config: WallConfig,
    timeline: TimelineModel,
    state: SessionState,
}

impl SessionController {
    pub fn new(config: WallConfig) -> Result<Self, ConfigError> {
        let timeline = config.timeline()?;
        let state = SessionState::new(config.cell_count, config.sync_mode);
        Ok(Self {
            config,
            timeline,
            state,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timeline(&self) -> &TimelineModel {
        &self.timeline
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    pub fn policy(&self) -> SynchronizationPolicy {
        SynchronizationPolicy::new(self.state.sync_mode, self.config.independent_timeline_rule)
    }

    pub fn default_archive_position(&self) -> u32 {
        self.timeline
            .clamp_seconds(i64::from(self.config.default_archive_position))
    }

    pub fn full_render(&self) -> RenderDiff {
        RenderDiff::full(&self.state)
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<RenderDiff, IntentError> {
        let effect = match self.plan(intent) {
            Ok(effect) => effect,
            Err(error) => {
                log::debug!("dropped {intent:?}: {error}");
                return Err(error);
            }
        };

        if effect.is_empty() {
            log::debug!("{intent:?} has nothing to do");
            return Ok(RenderDiff::default());
        }

        let next = match self.state.staged(&effect) {
            Ok(next) => next,
            Err(error) => {
                log::warn!("dropped {intent:?}: {error}");
                return Err(error.into());
            }
        };

        let diff = RenderDiff::between(&self.state, &next);
        self.state = next;
        if diff.is_empty() {
            log::debug!("{intent:?} left the wall unchanged");
        } else {
            log::debug!(
                "{intent:?} repainted {} cells in {} render events",
                diff.cells_rendered(),
                diff.events.len()
            );
        }
        Ok(diff)
    }

    fn plan(&self, intent: Intent) -> Result<Effect, IntentError> {
        let policy = self.policy();
        let state = &self.state;

        let effect = match intent {
            Intent::SelectCell { cell_id } => {
                self.require_cell(cell_id)?;
                policy.on_select_cell(state, &self.timeline, cell_id)
            }
            Intent::CellGoLive { cell_id } => {
                self.require_cell(cell_id)?;
                policy.on_cell_go_live(state, cell_id)
            }
            Intent::CellGoArchive { cell_id } => {
                self.require_cell(cell_id)?;
                policy.on_cell_go_archive(
                    state,
                    &self.timeline,
                    cell_id,
                    self.default_archive_position(),
                )?
            }
            Intent::TimelineActivate { segment_index } => {
                let midpoint = self.timeline.midpoint_of(segment_index)?;
                let segment = self.timeline.segment_at(midpoint)?;
                policy.on_timeline_activate(state, segment)
            }
            Intent::TimelineActivateAt { seconds } => {
                let time = self.timeline.clamp_seconds(seconds);
                let segment = self.timeline.segment_at(time)?;
                policy.on_timeline_activate(state, segment)
            }
            Intent::GlobalGoLive => policy.on_global_go_live(state),
            Intent::ToggleSync { mode } => policy.on_toggle_sync(state, &self.timeline, mode),
        };

        Ok(effect)
    }

    fn require_cell(&self, cell_id: CellId) -> Result<(), IntentError> {
        if self.state.contains(cell_id) {
            Ok(())
        } else {
            Err(IntentError::UnknownCell(cell_id))
        }
    }
}
