use crate::domain::{Cell, CellId, CellTransition, Effect, InvalidTransitionError, SyncMode};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutMode {
    Live,
    Archive,
}

impl LayoutMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Archive => "Archive",
        }
    }
}

/// Everything the wall shows: one entry per cell plus focus, sync mode and the highlighted
/// timeline segment.
///
/// The set of cell ids is fixed at construction. Cells only change through
/// [`SessionState::staged`], which runs the planned transitions of an [`Effect`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionState {
    cells: BTreeMap<CellId, Cell>,
    pub active_cell: Option<CellId>,
    pub sync_mode: SyncMode,
    pub active_segment: Option<usize>,
}

impl SessionState {
    pub fn new(cell_count: u32, sync_mode: SyncMode) -> Self {
        let cells = (1..=cell_count)
            .map(CellId::new)
            .map(|id| (id, Cell::live(id)))
            .collect();
        Self {
            cells,
            active_cell: None,
            sync_mode,
            active_segment: None,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.keys().copied()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn active(&self) -> Option<&Cell> {
        self.active_cell.and_then(|id| self.cells.get(&id))
    }

    pub fn first_archived(&self) -> Option<&Cell> {
        self.cells.values().find(|cell| cell.is_archive())
    }

    pub fn all_live(&self) -> bool {
        self.cells.values().all(Cell::is_live)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        if self.all_live() {
            LayoutMode::Live
        } else {
            LayoutMode::Archive
        }
    }

    /// Returns the state that results from `effect`, leaving `self` untouched.
    ///
    /// Transitions are planned against `self`, so a failing one rejects the whole effect.
    pub fn staged(&self, effect: &Effect) -> Result<Self, InvalidTransitionError> {
        let mut next = self.clone();
        for (id, transition) in &effect.transitions {
            next.apply_transition(*id, *transition)?;
        }
        if let Some(active_cell) = effect.active_cell {
            next.active_cell = active_cell.filter(|id| next.cells.contains_key(id));
        }
        if let Some(sync_mode) = effect.sync_mode {
            next.sync_mode = sync_mode;
        }
        if let Some(active_segment) = effect.active_segment {
            next.active_segment = active_segment;
        }
        Ok(next)
    }

    fn apply_transition(
        &mut self,
        id: CellId,
        transition: CellTransition,
    ) -> Result<(), InvalidTransitionError> {
        if let Some(cell) = self.cells.get_mut(&id) {
            *cell = cell.apply(transition)?;
        }
        Ok(())
    }
}
