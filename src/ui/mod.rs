mod theme;

use crate::app::{AppModel, WallLayout};
use crate::domain::{Cell, TimelineModel, format_clock, format_range, ruler_marks};
use ratatui::prelude::*;
use ratatui::widgets::*;
use unicode_width::UnicodeWidthStr;

const RULER_STEP_HOURS: u32 = 6;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    frame.render_widget(Block::default().style(Style::default().bg(theme::BG)), full_area);

    let state = model.controller.state();
    let layout = WallLayout::compute(full_area, state.cell_count());

    render_header(frame, layout.header, model);
    for (cell, area) in state.cells().zip(layout.cells.iter()) {
        render_cell(frame, *area, model, cell);
    }
    render_ruler(frame, layout.ruler, &layout, model.controller.timeline());
    render_timeline(frame, layout.timeline, model);
    render_footer(frame, layout.footer);

    if model.help_open {
        render_help_overlay(frame, full_area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, model: &AppModel) {
    let state = model.controller.state();
    let base = Style::default().fg(theme::FG).bg(theme::BAR_BG);
    let layout_mode = state.layout_mode();
    let layout_style = match layout_mode {
        crate::domain::LayoutMode::Live => base.fg(theme::LIVE),
        crate::domain::LayoutMode::Archive => base.fg(theme::ARCHIVE),
    };

    let mut spans = vec![
        Span::styled(" camwall", base.add_modifier(Modifier::BOLD)),
        Span::styled(" · ", base.fg(theme::DIM)),
        Span::styled(layout_mode.label(), layout_style),
        Span::styled(" · ", base.fg(theme::DIM)),
        Span::styled(state.sync_mode.label(), base.fg(theme::MUTED)),
    ];

    if let Some(active) = state.active_cell {
        spans.push(Span::styled(" · ", base.fg(theme::DIM)));
        spans.push(Span::styled(format!("cell {active}"), base.fg(theme::MUTED)));
    }

    if let Some(notice) = &model.notice {
        let used = spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum::<usize>();
        let notice_width = UnicodeWidthStr::width(notice.as_str()) + 1;
        let gap = (area.width as usize).saturating_sub(used + notice_width).max(1);
        spans.push(Span::styled(" ".repeat(gap), base));
        spans.push(Span::styled(format!("{notice} "), base.fg(theme::NOTICE)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}

fn render_cell(frame: &mut Frame, area: Rect, model: &AppModel, cell: &Cell) {
    let state = model.controller.state();
    let is_active = state.active_cell == Some(cell.id);
    let border_style = if is_active {
        Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::BORDER)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(Style::default().bg(theme::SURFACE))
        .padding(Padding::horizontal(1))
        .title(format!(" Cell {} ", cell.id));

    let mut lines = vec![Line::from(cell_status_spans(cell))];
    if let Some(position) = cell.position() {
        if let Ok(segment) = model.controller.timeline().segment_at(position) {
            lines.push(Line::from(Span::styled(
                format!(
                    "segment {} · {}",
                    segment.index + 1,
                    format_range(segment.start_seconds, segment.end_seconds)
                ),
                Style::default().fg(theme::DIM),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn cell_status_spans(cell: &Cell) -> Vec<Span<'static>> {
    match cell.position() {
        None => vec![
            Span::styled("● ", Style::default().fg(theme::LIVE)),
            Span::styled("Live", Style::default().fg(theme::LIVE)),
        ],
        Some(position) => vec![
            Span::styled("◼ ", Style::default().fg(theme::ARCHIVE)),
            Span::styled(
                format!("Archive ({})", format_clock(position)),
                Style::default().fg(theme::ARCHIVE),
            ),
        ],
    }
}

fn render_ruler(frame: &mut Frame, area: Rect, layout: &WallLayout, timeline: &TimelineModel) {
    let strip = layout.timeline_strip();
    let text = ruler_line(strip.width as usize, timeline.total_hours());
    let ruler_area = Rect {
        x: strip.x,
        y: area.y,
        width: strip.width,
        height: area.height,
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(theme::DIM)),
        ruler_area,
    );
}

fn render_timeline(frame: &mut Frame, area: Rect, model: &AppModel) {
    let timeline = model.controller.timeline();
    let state = model.controller.state();

    let title = match state.active_segment.and_then(|index| timeline.segment(index)) {
        Some(segment) => format!(
            " Timeline · {} ",
            format_range(segment.start_seconds, segment.end_seconds)
        ),
        None => " Timeline ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(title);
    let strip = block.inner(area);
    frame.render_widget(block, area);

    let width = strip.width as usize;
    let columns = segment_columns(width, timeline);
    let markers = state
        .cells()
        .filter_map(Cell::position)
        .filter_map(|position| column_for_time(width, timeline.total_seconds(), position))
        .collect::<Vec<_>>();

    let spans = columns
        .iter()
        .enumerate()
        .map(|(column, &index)| {
            let bg = if state.active_segment == Some(index) {
                theme::ACCENT_BG
            } else if index % 2 == 0 {
                theme::SEGMENT
            } else {
                theme::SURFACE
            };
            let mut style = Style::default().bg(bg).fg(theme::ACCENT);
            if index == model.timeline_cursor {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            let symbol = if markers.contains(&column) { "│" } else { " " };
            Span::styled(symbol, style)
        })
        .collect::<Vec<_>>();

    frame.render_widget(Paragraph::new(Line::from(spans)), strip);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let style = Style::default().fg(theme::MUTED).bg(theme::BAR_BG);
    let hints = " 1-9/arrows select · a archive · l live · g go live · s sync · [ ] Enter timeline · ? help · q quit";
    frame.render_widget(Paragraph::new(hints).style(style), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(64, 70, area);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from("Cells"),
        Line::from("  - 1-9 or arrows: select a cell"),
        Line::from("  - a: archive the selected cell (independent mode)"),
        Line::from("  - l: send the selected cell back to live"),
        Line::from(""),
        Line::from("Timeline"),
        Line::from("  - [ / ]: move the timeline cursor, Home/End jump"),
        Line::from("  - Enter or click: jump to the segment"),
        Line::from("  - Synced: every cell follows the timeline"),
        Line::from("  - Independent: the timeline scrubs the selected archived cell"),
        Line::from(""),
        Line::from("Wall"),
        Line::from("  - s: toggle synced / independent"),
        Line::from("  - g: everything live, synced"),
        Line::from("  - q or Ctrl+C: quit"),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .style(Style::default().fg(theme::FG).bg(theme::SURFACE))
            .title("Help (? to close)"),
    );
    frame.render_widget(paragraph, popup);
}

/// Segment index drawn in each column of a strip `width` columns wide.
fn segment_columns(width: usize, timeline: &TimelineModel) -> Vec<usize> {
    if width == 0 {
        return Vec::new();
    }
    let total = u64::from(timeline.total_seconds());
    (0..width)
        .map(|column| {
            let time = (column as u64 * total) / width as u64;
            let time = u32::try_from(time).unwrap_or(u32::MAX);
            timeline
                .segment_index_for_time(time)
                .unwrap_or(timeline.segment_count().saturating_sub(1))
        })
        .collect()
}

fn column_for_time(width: usize, total_seconds: u32, time: u32) -> Option<usize> {
    if width == 0 || total_seconds == 0 {
        return None;
    }
    let column = (u64::from(time) * width as u64) / u64::from(total_seconds);
    usize::try_from(column).ok().map(|column| column.min(width - 1))
}

/// Hour labels centered on their offsets, kept inside `width`.
fn ruler_line(width: usize, total_hours: u32) -> String {
    let mut line = vec![' '; width];
    let mut next_free = 0usize;
    for mark in ruler_marks(total_hours, RULER_STEP_HOURS) {
        let label_width = UnicodeWidthStr::width(mark.label.as_str());
        if label_width > width {
            continue;
        }
        let center = (mark.offset * width as f64).round() as usize;
        let start = center
            .saturating_sub(label_width / 2)
            .min(width - label_width)
            .max(next_free);
        if start + label_width > width {
            continue;
        }
        for (offset, ch) in mark.label.chars().enumerate() {
            line[start + offset] = ch;
        }
        next_free = start + label_width + 1;
    }
    line.into_iter().collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::WallConfig;
    use ratatui::backend::TestBackend;

    #[test]
    fn columns_follow_segment_boundaries() {
        let timeline = TimelineModel::new(24, 12).expect("timeline");
        let columns = segment_columns(24, &timeline);
        assert_eq!(columns.len(), 24);
        assert_eq!(&columns[..4], &[0, 0, 1, 1]);
        assert_eq!(columns[23], 11);
    }

    #[test]
    fn positions_map_to_columns() {
        assert_eq!(column_for_time(24, 86_400, 0), Some(0));
        assert_eq!(column_for_time(24, 86_400, 43_200), Some(12));
        assert_eq!(column_for_time(24, 86_400, 86_399), Some(23));
        assert_eq!(column_for_time(0, 86_400, 10), None);
    }

    #[test]
    fn ruler_keeps_labels_inside_the_strip() {
        let line = ruler_line(40, 24);
        assert_eq!(line.chars().count(), 40);
        assert!(line.starts_with("00:00"));
        assert!(line.ends_with("24:00"));
        assert!(line.contains("12:00"));
    }

    #[test]
    fn renders_the_wall_into_a_buffer() {
        let model = AppModel::new(WallConfig::default())
            .expect("model")
            .with_terminal_size(80, 30);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("terminal");
        terminal
            .draw(|frame| render(frame, &model))
            .expect("draw");

        let buffer = terminal.backend().buffer();
        let text = buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(text.contains("camwall"));
        assert!(text.contains("Cell 4"));
        assert!(text.contains("Timeline"));
    }
}
