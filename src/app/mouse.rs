use super::{AppCommand, AppModel, Intent, WallLayout, apply_intent};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

pub(super) fn update_on_mouse(model: AppModel, mouse: MouseEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    if model.terminal_size.0 == 0 || model.terminal_size.1 == 0 {
        return (model, AppCommand::None);
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            model = apply_left_click(model, mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp => {
            model.move_timeline_cursor(-1);
        }
        MouseEventKind::ScrollDown => {
            model.move_timeline_cursor(1);
        }
        _ => {}
    }

    (model, AppCommand::None)
}

fn apply_left_click(mut model: AppModel, col: u16, row: u16) -> AppModel {
    model.notice = None;
    if model.help_open {
        model.help_open = false;
        return model;
    }

    let (width, height) = model.terminal_size;
    let layout = WallLayout::compute(
        Rect::new(0, 0, width, height),
        model.controller.state().cell_count(),
    );

    if let Some(index) = layout.cell_at(col, row) {
        let Some(cell_id) = model.controller.state().cell_ids().nth(index) else {
            return model;
        };
        return apply_intent(model, Intent::SelectCell { cell_id });
    }

    let total_seconds = model.controller.timeline().total_seconds();
    if let Some(seconds) = layout.timeline_seconds_at(col, row, total_seconds) {
        return apply_intent(model, Intent::TimelineActivateAt { seconds });
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppEvent;
    use crate::domain::{CellId, SyncMode};
    use crate::infra::WallConfig;
    use crossterm::event::KeyModifiers;

    fn model() -> AppModel {
        AppModel::new(WallConfig::default())
            .expect("model")
            .with_terminal_size(80, 30)
    }

    fn click(col: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn clicking_a_cell_selects_it() {
        let layout = WallLayout::compute(Rect::new(0, 0, 80, 30), 4);
        let target = layout.cells[3];
        let (next, cmd) = super::super::update(model(), click(target.x + 2, target.y + 1));
        assert!(matches!(cmd, AppCommand::None));
        assert_eq!(next.controller.state().active_cell, Some(CellId::new(4)));
    }

    #[test]
    fn clicking_the_timeline_archives_the_synced_wall() {
        let layout = WallLayout::compute(Rect::new(0, 0, 80, 30), 4);
        let strip = layout.timeline_strip();
        let (next, _cmd) = super::super::update(model(), click(strip.x, strip.y));

        let state = next.controller.state();
        assert_eq!(state.sync_mode, SyncMode::Synced);
        assert!(state.cells().all(|cell| cell.position() == Some(3600)));
        assert_eq!(next.timeline_cursor, 0);
    }

    #[test]
    fn clicking_clears_a_stale_notice() {
        let layout = WallLayout::compute(Rect::new(0, 0, 80, 30), 4);
        let target = layout.cells[1];
        let noticed = model().with_notice(Some("No cell 9 on a wall of 4.".to_string()));
        let (next, _cmd) = super::super::update(noticed, click(target.x + 2, target.y + 1));
        assert_eq!(next.notice, None);
        assert_eq!(next.controller.state().active_cell, Some(CellId::new(2)));

        let noticed = model().with_notice(Some("stale".to_string()));
        let (next, _cmd) = super::super::update(noticed, click(0, layout.footer.y));
        assert_eq!(next.notice, None);
    }

    #[test]
    fn clicks_are_ignored_before_the_first_resize() {
        let model = AppModel::new(WallConfig::default()).expect("model");
        let (next, _cmd) = super::super::update(model, click(1, 1));
        assert_eq!(next.controller.state().active_cell, None);
    }
}
