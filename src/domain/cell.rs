use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u32);

impl CellId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellMode {
    Live,
    Archive,
}

impl CellMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Archive => "Archive",
        }
    }
}

/// What a cell is showing. An archived cell always carries its position (seconds from the
/// timeline start) and a live one never does.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Playback {
    Live,
    Archive { position: u32 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub playback: Playback,
}

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum InvalidTransitionError {
    #[error("cell {cell_id} is live and cannot be retargeted")]
    RetargetLive { cell_id: CellId },
}

impl Cell {
    pub fn live(id: CellId) -> Self {
        Self {
            id,
            playback: Playback::Live,
        }
    }

    pub fn mode(&self) -> CellMode {
        match self.playback {
            Playback::Live => CellMode::Live,
            Playback::Archive { .. } => CellMode::Archive,
        }
    }

    pub fn position(&self) -> Option<u32> {
        match self.playback {
            Playback::Live => None,
            Playback::Archive { position } => Some(position),
        }
    }

    pub fn is_live(&self) -> bool {
        self.playback == Playback::Live
    }

    pub fn is_archive(&self) -> bool {
        !self.is_live()
    }

    pub fn go_live(self) -> Self {
        Self {
            id: self.id,
            playback: Playback::Live,
        }
    }

    /// The caller clamps `position` into the timeline span before calling.
    pub fn go_archive(self, position: u32) -> Self {
        Self {
            id: self.id,
            playback: Playback::Archive { position },
        }
    }

    pub fn retarget(self, position: u32) -> Result<Self, InvalidTransitionError> {
        match self.playback {
            Playback::Archive { .. } => Ok(self.go_archive(position)),
            Playback::Live => Err(InvalidTransitionError::RetargetLive { cell_id: self.id }),
        }
    }

    pub fn apply(self, transition: CellTransition) -> Result<Self, InvalidTransitionError> {
        match transition {
            CellTransition::GoLive => Ok(self.go_live()),
            CellTransition::GoArchive { position } => Ok(self.go_archive(position)),
            CellTransition::Retarget { position } => self.retarget(position),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CellTransition {
    GoLive,
    GoArchive { position: u32 },
    Retarget { position: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Cell {
        Cell::live(CellId::new(1))
    }

    #[test]
    fn new_cells_are_live_without_position() {
        let cell = cell();
        assert_eq!(cell.mode(), CellMode::Live);
        assert_eq!(cell.position(), None);
    }

    #[test]
    fn archive_then_live_clears_position() {
        let archived = cell().go_archive(3600);
        assert_eq!(archived.mode(), CellMode::Archive);
        assert_eq!(archived.position(), Some(3600));

        let live = archived.go_live();
        assert_eq!(live.mode(), CellMode::Live);
        assert_eq!(live.position(), None);
        assert_eq!(live.id, CellId::new(1));
    }

    #[test]
    fn retarget_moves_archived_cells_only() {
        let archived = cell().go_archive(100);
        assert_eq!(archived.retarget(200).map(|c| c.position()), Ok(Some(200)));

        assert_eq!(
            cell().retarget(200),
            Err(InvalidTransitionError::RetargetLive {
                cell_id: CellId::new(1)
            })
        );
    }

    #[test]
    fn transitions_are_idempotent() {
        let once = cell().go_archive(42);
        assert_eq!(once.go_archive(42), once);
        assert_eq!(cell().go_live().go_live(), cell());
        assert_eq!(once.retarget(42), Ok(once));
    }

    #[test]
    fn apply_dispatches_each_transition() {
        let archived = cell()
            .apply(CellTransition::GoArchive { position: 10 })
            .expect("archive");
        assert_eq!(archived.position(), Some(10));
        let moved = archived
            .apply(CellTransition::Retarget { position: 20 })
            .expect("retarget");
        assert_eq!(moved.position(), Some(20));
        let live = moved.apply(CellTransition::GoLive).expect("live");
        assert!(live.is_live());
    }
}
