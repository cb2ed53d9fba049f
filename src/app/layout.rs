use ratatui::layout::{Constraint, Direction, Layout, Rect};

const HEADER_HEIGHT: u16 = 1;
const RULER_HEIGHT: u16 = 1;
const TIMELINE_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;

/// Screen regions of the wall. Shared by drawing and mouse hit-testing so both agree on where
/// things are.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WallLayout {
    pub header: Rect,
    pub cells: Vec<Rect>,
    pub ruler: Rect,
    pub timeline: Rect,
    pub footer: Rect,
}

impl WallLayout {
    pub fn compute(area: Rect, cell_count: usize) -> Self {
        let [header, grid, ruler, timeline, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(RULER_HEIGHT),
                Constraint::Length(TIMELINE_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .areas(area);

        Self {
            header,
            cells: grid_cells(grid, cell_count),
            ruler,
            timeline,
            footer,
        }
    }

    /// The strip inside the timeline border where segments are drawn.
    pub fn timeline_strip(&self) -> Rect {
        inner(self.timeline)
    }

    /// Zero-based index into `cells` for a terminal position.
    pub fn cell_at(&self, col: u16, row: u16) -> Option<usize> {
        self.cells
            .iter()
            .position(|rect| contains(*rect, col, row))
    }

    /// Seconds from the timeline start for a click inside the strip.
    pub fn timeline_seconds_at(&self, col: u16, row: u16, total_seconds: u32) -> Option<i64> {
        let strip = self.timeline_strip();
        if strip.width == 0 || !contains(strip, col, row) {
            return None;
        }
        let offset = u64::from(col - strip.x);
        let seconds = offset * u64::from(total_seconds) / u64::from(strip.width);
        i64::try_from(seconds).ok()
    }
}

/// Columns and rows for a near-square grid holding `cell_count` cells.
pub fn grid_shape(cell_count: usize) -> (usize, usize) {
    if cell_count == 0 {
        return (0, 0);
    }
    let mut cols = 1;
    while cols * cols < cell_count {
        cols += 1;
    }
    let rows = cell_count.div_ceil(cols);
    (cols, rows)
}

fn grid_cells(area: Rect, cell_count: usize) -> Vec<Rect> {
    let (cols, rows) = grid_shape(cell_count);
    if cols == 0 {
        return Vec::new();
    }

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
                .split(*row)
                .to_vec()
        })
        .take(cell_count)
        .collect()
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
