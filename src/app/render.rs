use crate::domain::{CellId, CellMode, SessionState, SyncMode, format_clock};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent {
    CellRendered {
        cell_id: CellId,
        mode: CellMode,
        position: Option<u32>,
    },
    ActiveCellChanged {
        cell_id: Option<CellId>,
    },
    SyncModeChanged {
        mode: SyncMode,
    },
    ActiveSegmentChanged {
        index: Option<usize>,
    },
}

impl fmt::Display for RenderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellRendered {
                cell_id,
                mode,
                position: Some(position),
            } => write!(
                f,
                "cell {cell_id}: {} ({})",
                mode.label(),
                format_clock(*position)
            ),
            Self::CellRendered { cell_id, mode, .. } => {
                write!(f, "cell {cell_id}: {}", mode.label())
            }
            Self::ActiveCellChanged {
                cell_id: Some(cell_id),
            } => write!(f, "active cell: {cell_id}"),
            Self::ActiveCellChanged { cell_id: None } => write!(f, "active cell: none"),
            Self::SyncModeChanged { mode } => write!(f, "sync mode: {}", mode.label()),
            Self::ActiveSegmentChanged { index: Some(index) } => {
                write!(f, "active segment: {index}")
            }
            Self::ActiveSegmentChanged { index: None } => write!(f, "active segment: none"),
        }
    }
}

/// What the view has to repaint after one intent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RenderDiff {
    pub events: Vec<RenderEvent>,
}

impl RenderDiff {
    /// Only cells and fields that differ between the two states.
    pub fn between(prev: &SessionState, next: &SessionState) -> Self {
        let mut events = next
            .cells()
            .filter(|cell| prev.cell(cell.id) != Some(*cell))
            .map(|cell| RenderEvent::CellRendered {
                cell_id: cell.id,
                mode: cell.mode(),
                position: cell.position(),
            })
            .collect::<Vec<_>>();

        if prev.active_cell != next.active_cell {
            events.push(RenderEvent::ActiveCellChanged {
                cell_id: next.active_cell,
            });
        }
        if prev.sync_mode != next.sync_mode {
            events.push(RenderEvent::SyncModeChanged {
                mode: next.sync_mode,
            });
        }
        if prev.active_segment != next.active_segment {
            events.push(RenderEvent::ActiveSegmentChanged {
                index: next.active_segment,
            });
        }

        Self { events }
    }

    /// Every cell and field, for the first paint.
    pub fn full(state: &SessionState) -> Self {
        let mut events = state
            .cells()
            .map(|cell| RenderEvent::CellRendered {
                cell_id: cell.id,
                mode: cell.mode(),
                position: cell.position(),
            })
            .collect::<Vec<_>>();
        events.push(RenderEvent::ActiveCellChanged {
            cell_id: state.active_cell,
        });
        events.push(RenderEvent::SyncModeChanged {
            mode: state.sync_mode,
        });
        events.push(RenderEvent::ActiveSegmentChanged {
            index: state.active_segment,
        });
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn cells_rendered(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RenderEvent::CellRendered { .. }))
            .count()
    }
}
