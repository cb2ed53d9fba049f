use crate::domain::{CellId, CellTransition, Segment, SessionState, TimelineModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Synced,
    Independent,
}

impl SyncMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Synced => Self::Independent,
            Self::Independent => Self::Synced,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Synced => "Synced",
            Self::Independent => "Independent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "synced" | "sync" | "on" => Some(Self::Synced),
            "independent" | "off" => Some(Self::Independent),
            _ => None,
        }
    }
}

/// What a timeline click does in independent mode when the focused cell is not archived.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndependentTimelineRule {
    /// Switch the wall to synced mode and archive every cell.
    #[default]
    PromoteToSynced,
    /// Archive the focused cell only; ignored when nothing is focused.
    ArchiveActiveCell,
    Ignore,
}

impl IndependentTimelineRule {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "promote" | "promote_to_synced" => Some(Self::PromoteToSynced),
            "active" | "archive_active_cell" => Some(Self::ArchiveActiveCell),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// Planned changes for one intent, computed from a single snapshot of the state.
///
/// For the optional fields, `None` keeps the current value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Effect {
    pub transitions: Vec<(CellId, CellTransition)>,
    pub active_cell: Option<Option<CellId>>,
    pub sync_mode: Option<SyncMode>,
    pub active_segment: Option<Option<usize>>,
}

impl Effect {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn all(state: &SessionState, transition: CellTransition) -> Self {
        Self {
            transitions: state.cell_ids().map(|id| (id, transition)).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum PolicyError {
    #[error("cell {cell_id} cannot be archived on its own while the wall is synced")]
    ArchiveWhileSynced { cell_id: CellId },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SynchronizationPolicy {
    Synced,
    Independent {
        timeline_rule: IndependentTimelineRule,
    },
}

impl SynchronizationPolicy {
    pub fn new(mode: SyncMode, timeline_rule: IndependentTimelineRule) -> Self {
        match mode {
            SyncMode::Synced => Self::Synced,
            SyncMode::Independent => Self::Independent { timeline_rule },
        }
    }

    pub fn mode(self) -> SyncMode {
        match self {
            Self::Synced => SyncMode::Synced,
            Self::Independent { .. } => SyncMode::Independent,
        }
    }

    pub fn on_select_cell(
        self,
        state: &SessionState,
        timeline: &TimelineModel,
        target: CellId,
    ) -> Effect {
        match self {
            Self::Synced => Effect {
                active_cell: Some(Some(target)),
                ..Effect::none()
            },
            Self::Independent { .. } => {
                let mut effect = Effect {
                    transitions: revert_previous_focus(state, target).into_iter().collect(),
                    active_cell: Some(Some(target)),
                    ..Effect::none()
                };
                let position = state.cell(target).and_then(|cell| cell.position());
                effect.active_segment =
                    Some(position.and_then(|time| timeline.segment_index_for_time(time).ok()));
                effect
            }
        }
    }

    pub fn on_timeline_activate(self, state: &SessionState, segment: &Segment) -> Effect {
        let position = segment.midpoint_seconds;
        let timeline_rule = match self {
            Self::Synced => return archive_everything(state, segment),
            Self::Independent { timeline_rule } => timeline_rule,
        };

        match state.active() {
            Some(active) if active.is_archive() => Effect {
                transitions: vec![(active.id, CellTransition::Retarget { position })],
                active_segment: Some(Some(segment.index)),
                ..Effect::none()
            },
            active => match timeline_rule {
                IndependentTimelineRule::PromoteToSynced => {
                    log::debug!(
                        "timeline segment {} promoted the wall to synced mode",
                        segment.index
                    );
                    Effect {
                        sync_mode: Some(SyncMode::Synced),
                        ..archive_everything(state, segment)
                    }
                }
                IndependentTimelineRule::ArchiveActiveCell => match active {
                    Some(active) => Effect {
                        transitions: vec![(active.id, CellTransition::GoArchive { position })],
                        active_segment: Some(Some(segment.index)),
                        ..Effect::none()
                    },
                    None => Effect::none(),
                },
                IndependentTimelineRule::Ignore => Effect::none(),
            },
        }
    }

    pub fn on_cell_go_live(self, state: &SessionState, cell_id: CellId) -> Effect {
        let others_archived = state
            .cells()
            .any(|cell| cell.id != cell_id && cell.is_archive());
        let focused = state.active_cell == Some(cell_id);
        let clear_segment = !others_archived || (self.mode() == SyncMode::Independent && focused);

        Effect {
            transitions: vec![(cell_id, CellTransition::GoLive)],
            active_segment: clear_segment.then_some(None),
            ..Effect::none()
        }
    }

    pub fn on_cell_go_archive(
        self,
        state: &SessionState,
        timeline: &TimelineModel,
        cell_id: CellId,
        position: u32,
    ) -> Result<Effect, PolicyError> {
        if self == Self::Synced {
            return Err(PolicyError::ArchiveWhileSynced { cell_id });
        }

        let mut transitions = revert_previous_focus(state, cell_id)
            .into_iter()
            .collect::<Vec<_>>();
        transitions.push((cell_id, CellTransition::GoArchive { position }));

        Ok(Effect {
            transitions,
            active_cell: Some(Some(cell_id)),
            active_segment: Some(timeline.segment_index_for_time(position).ok()),
            ..Effect::none()
        })
    }

    pub fn on_global_go_live(self, state: &SessionState) -> Effect {
        Effect {
            active_cell: Some(None),
            sync_mode: Some(SyncMode::Synced),
            active_segment: Some(None),
            ..Effect::all(state, CellTransition::GoLive)
        }
    }

    pub fn on_toggle_sync(
        self,
        state: &SessionState,
        timeline: &TimelineModel,
        requested: SyncMode,
    ) -> Effect {
        match requested {
            SyncMode::Synced => self.on_global_go_live(state),
            SyncMode::Independent => {
                let seed = state
                    .active()
                    .filter(|cell| cell.is_archive())
                    .or_else(|| state.first_archived())
                    .and_then(|cell| cell.position());
                Effect {
                    sync_mode: Some(SyncMode::Independent),
                    active_segment: Some(
                        seed.and_then(|time| timeline.segment_index_for_time(time).ok()),
                    ),
                    ..Effect::none()
                }
            }
        }
    }
}

fn archive_everything(state: &SessionState, segment: &Segment) -> Effect {
    Effect {
        active_cell: Some(None),
        active_segment: Some(Some(segment.index)),
        ..Effect::all(
            state,
            CellTransition::GoArchive {
                position: segment.midpoint_seconds,
            },
        )
    }
}

// Losing focus in independent mode sends an archived cell back to live.
fn revert_previous_focus(state: &SessionState, target: CellId) -> Option<(CellId, CellTransition)> {
    state
        .active()
        .filter(|previous| previous.id != target && previous.is_archive())
        .map(|previous| (previous.id, CellTransition::GoLive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    const INDEPENDENT: SynchronizationPolicy = SynchronizationPolicy::Independent {
        timeline_rule: IndependentTimelineRule::PromoteToSynced,
    };

    fn timeline() -> TimelineModel {
        TimelineModel::new(24, 12).expect("timeline")
    }

    fn id(value: u32) -> CellId {
        CellId::new(value)
    }

    fn archived_focus(cell: u32, position: u32) -> SessionState {
        let state = SessionState::new(4, SyncMode::Independent);
        let effect = INDEPENDENT
            .on_cell_go_archive(&state, &timeline(), id(cell), position)
            .expect("archive");
        state.staged(&effect).expect("staged")
    }

    #[test]
    fn synced_selection_only_moves_focus() {
        let state = SessionState::new(4, SyncMode::Synced);
        let effect = SynchronizationPolicy::Synced.on_select_cell(&state, &timeline(), id(2));
        assert!(effect.transitions.is_empty());
        assert_eq!(effect.active_cell, Some(Some(id(2))));
        assert_eq!(effect.active_segment, None);
    }

    #[test]
    fn independent_selection_reverts_previous_archived_focus() {
        let state = archived_focus(1, 3600);
        let effect = INDEPENDENT.on_select_cell(&state, &timeline(), id(2));
        assert_eq!(effect.transitions, vec![(id(1), CellTransition::GoLive)]);
        assert_eq!(effect.active_cell, Some(Some(id(2))));
        assert_eq!(effect.active_segment, Some(None));
    }

    #[test]
    fn reselecting_the_focused_cell_keeps_it_archived() {
        let state = archived_focus(1, 3600);
        let effect = INDEPENDENT.on_select_cell(&state, &timeline(), id(1));
        assert!(effect.transitions.is_empty());
        assert_eq!(effect.active_segment, Some(Some(0)));
    }

    #[test]
    fn synced_timeline_archives_every_cell_and_clears_focus() {
        let timeline = timeline();
        let mut state = SessionState::new(4, SyncMode::Synced);
        state.active_cell = Some(id(3));
        let segment = timeline.segment(0).expect("segment");

        let effect = SynchronizationPolicy::Synced.on_timeline_activate(&state, segment);
        let next = state.staged(&effect).expect("staged");
        assert!(next.cells().all(|cell| cell.position() == Some(3600)));
        assert_eq!(next.active_cell, None);
        assert_eq!(next.active_segment, Some(0));
    }

    #[test]
    fn independent_timeline_scrubs_only_the_archived_focus() {
        let timeline = timeline();
        let state = archived_focus(2, 3600);
        let segment = timeline.segment(4).expect("segment");

        let effect = INDEPENDENT.on_timeline_activate(&state, segment);
        assert_eq!(
            effect.transitions,
            vec![(
                id(2),
                CellTransition::Retarget {
                    position: segment.midpoint_seconds
                }
            )]
        );
        assert_eq!(effect.sync_mode, None);
        assert_eq!(effect.active_segment, Some(Some(4)));
    }

    #[test]
    fn independent_timeline_without_archived_focus_follows_the_rule() {
        let timeline = timeline();
        let mut state = SessionState::new(3, SyncMode::Independent);
        state.active_cell = Some(id(2));
        let segment = timeline.segment(5).expect("segment");

        let promote = INDEPENDENT.on_timeline_activate(&state, segment);
        assert_eq!(promote.sync_mode, Some(SyncMode::Synced));
        assert_eq!(promote.transitions.len(), 3);
        assert_eq!(promote.active_cell, Some(None));

        let active_only = SynchronizationPolicy::Independent {
            timeline_rule: IndependentTimelineRule::ArchiveActiveCell,
        }
        .on_timeline_activate(&state, segment);
        assert_eq!(
            active_only.transitions,
            vec![(
                id(2),
                CellTransition::GoArchive {
                    position: segment.midpoint_seconds
                }
            )]
        );
        assert_eq!(active_only.sync_mode, None);

        let ignore = SynchronizationPolicy::Independent {
            timeline_rule: IndependentTimelineRule::Ignore,
        }
        .on_timeline_activate(&state, segment);
        assert!(ignore.is_empty());
    }

    #[test]
    fn archive_active_cell_rule_ignores_clicks_without_focus() {
        let timeline = timeline();
        let state = SessionState::new(3, SyncMode::Independent);
        let effect = SynchronizationPolicy::Independent {
            timeline_rule: IndependentTimelineRule::ArchiveActiveCell,
        }
        .on_timeline_activate(&state, timeline.segment(1).expect("segment"));
        assert!(effect.is_empty());
    }

    #[test]
    fn cell_go_live_touches_one_cell() {
        let timeline = timeline();
        let state = SessionState::new(3, SyncMode::Synced);
        let state = state
            .staged(&SynchronizationPolicy::Synced.on_timeline_activate(
                &state,
                timeline.segment(2).expect("segment"),
            ))
            .expect("staged");

        let effect = SynchronizationPolicy::Synced.on_cell_go_live(&state, id(1));
        assert_eq!(effect.transitions, vec![(id(1), CellTransition::GoLive)]);
        assert_eq!(effect.active_segment, None);

        let next = state.staged(&effect).expect("staged");
        assert!(next.cell(id(1)).is_some_and(Cell::is_live));
        assert!(next.cell(id(2)).is_some_and(Cell::is_archive));
    }

    #[test]
    fn last_cell_going_live_clears_the_timeline() {
        let state = archived_focus(1, 3600);
        let effect = INDEPENDENT.on_cell_go_live(&state, id(1));
        assert_eq!(effect.active_segment, Some(None));
    }

    #[test]
    fn archiving_a_lone_cell_is_rejected_when_synced() {
        let state = SessionState::new(2, SyncMode::Synced);
        assert_eq!(
            SynchronizationPolicy::Synced.on_cell_go_archive(&state, &timeline(), id(1), 3600),
            Err(PolicyError::ArchiveWhileSynced { cell_id: id(1) })
        );
    }

    #[test]
    fn independent_archive_moves_focus_and_reverts_previous() {
        let state = archived_focus(2, 3600);
        let effect = INDEPENDENT
            .on_cell_go_archive(&state, &timeline(), id(3), 3600)
            .expect("archive");
        let next = state.staged(&effect).expect("staged");
        assert!(next.cell(id(2)).is_some_and(Cell::is_live));
        assert_eq!(next.cell(id(3)).and_then(Cell::position), Some(3600));
        assert_eq!(next.active_cell, Some(id(3)));
        assert_eq!(next.active_segment, Some(0));
    }

    #[test]
    fn global_go_live_remasters_the_wall() {
        let state = archived_focus(1, 3600);
        let next = state
            .staged(&INDEPENDENT.on_global_go_live(&state))
            .expect("staged");
        assert!(next.all_live());
        assert_eq!(next.sync_mode, SyncMode::Synced);
        assert_eq!(next.active_cell, None);
        assert_eq!(next.active_segment, None);
    }

    #[test]
    fn toggling_to_independent_seeds_timeline_from_archived_cells() {
        let timeline = timeline();
        let state = SessionState::new(2, SyncMode::Synced);
        let state = state
            .staged(&SynchronizationPolicy::Synced.on_timeline_activate(
                &state,
                timeline.segment(7).expect("segment"),
            ))
            .expect("staged");

        let effect = SynchronizationPolicy::Synced.on_toggle_sync(
            &state,
            &timeline,
            SyncMode::Independent,
        );
        assert!(effect.transitions.is_empty());
        assert_eq!(effect.sync_mode, Some(SyncMode::Independent));
        assert_eq!(effect.active_segment, Some(Some(7)));
    }

    #[test]
    fn toggling_to_independent_prefers_the_focused_archived_cell() {
        let timeline = timeline();
        let state = SessionState::new(4, SyncMode::Synced);
        let state = state
            .staged(&SynchronizationPolicy::Synced.on_timeline_activate(
                &state,
                timeline.segment(0).expect("segment"),
            ))
            .expect("staged");
        let state = state
            .staged(&SynchronizationPolicy::Synced.on_toggle_sync(
                &state,
                &timeline,
                SyncMode::Independent,
            ))
            .expect("staged");
        let state = state
            .staged(&INDEPENDENT.on_select_cell(&state, &timeline, id(3)))
            .expect("staged");
        let state = state
            .staged(&INDEPENDENT.on_timeline_activate(
                &state,
                timeline.segment(7).expect("segment"),
            ))
            .expect("staged");
        assert_eq!(state.cell(id(1)).and_then(Cell::position), Some(3600));
        assert_eq!(
            state.cell(id(3)).and_then(Cell::position),
            timeline.midpoint_of(7).ok()
        );

        let effect = INDEPENDENT.on_toggle_sync(&state, &timeline, SyncMode::Independent);
        assert!(effect.transitions.is_empty());
        assert_eq!(effect.active_segment, Some(Some(7)));

        let mut unfocused = state.clone();
        unfocused.active_cell = None;
        let effect = INDEPENDENT.on_toggle_sync(&unfocused, &timeline, SyncMode::Independent);
        assert_eq!(effect.active_segment, Some(Some(0)));
    }

    #[test]
    fn parses_modes_and_rules() {
        assert_eq!(SyncMode::parse("Independent"), Some(SyncMode::Independent));
        assert_eq!(SyncMode::parse("synced"), Some(SyncMode::Synced));
        assert_eq!(SyncMode::parse("sideways"), None);
        assert_eq!(
            IndependentTimelineRule::parse("active"),
            Some(IndependentTimelineRule::ArchiveActiveCell)
        );
        assert_eq!(IndependentTimelineRule::parse("?"), None);
    }
}
