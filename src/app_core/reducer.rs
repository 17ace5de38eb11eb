//! Event reducer: handlers for key and mouse events.
//!
//! The runtime converts crossterm events to [`AppKeyEvent`] / [`AppMouseEvent`]
//! and calls these functions. Anything that touches the network is left in
//! `app.pending_action`.

use crate::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use crate::app_core::state::{AppAction, AppState, FocusPane};

pub const SCROLL_LINES: u16 = 1;

/// Returns the pane that contains the given cell coordinates, if any.
pub fn pane_at(app: &AppState, column: u16, row: u16) -> Option<FocusPane> {
    if let Some(area) = app.tree_area
        && area.contains((column, row).into())
    {
        return Some(FocusPane::Tree);
    }
    if let Some(area) = app.details_area
        && area.contains((column, row).into())
    {
        return Some(FocusPane::Details);
    }
    None
}

/// Expands the selected node, or collapses it when already expanded.
///
/// Nodes whose children are cached expand in place; the rest go through
/// `AppAction::Expand` so the runtime can show a loading state first.
fn toggle_selected(app: &mut AppState) {
    let Some(path) = app.selected_path() else {
        return;
    };
    if app.is_expanded(&path) {
        app.collapse_path(&path);
        return;
    }
    let Some(node) = app.node_at(&path) else {
        return;
    };
    if node.is_leaf() {
        return;
    }
    if app.children_cached(&path) || node.children_error().is_some() {
        app.expand_path(path);
    } else {
        app.pending_action = Some(AppAction::Expand(path));
    }
}

/// Collapses the selected node, or moves to its parent.
fn collapse_or_parent(app: &mut AppState) {
    let Some(path) = app.selected_path() else {
        return;
    };
    if app.is_expanded(&path) {
        app.collapse_path(&path);
        return;
    }
    if path.len() > 1 {
        let parent = &path[..path.len() - 1];
        if let Some(idx) = app.rows.iter().position(|row| row.path == parent) {
            app.list_state.select(Some(idx));
            app.details_scroll = 0;
        }
    }
}

fn page_size(app: &AppState) -> isize {
    app.tree_content_area.map(|a| a.height).unwrap_or(10).max(1) as isize
}

/// Handle a key event, mutating `app` in place.
///
/// May set `app.pending_action`; the runtime is responsible for acting on it
/// after this function returns.
pub fn handle_key_event(app: &mut AppState, event: AppKeyEvent) {
    if event.is_release {
        return;
    }

    let code = event.code;
    let ctrl = event.ctrl;

    if ctrl && code == AppKeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.show_help {
        if matches!(code, AppKeyCode::Char('?') | AppKeyCode::Esc | AppKeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match code {
        AppKeyCode::Tab | AppKeyCode::BackTab => app.focus_next_pane(),
        AppKeyCode::Char('q') => app.should_quit = true,
        AppKeyCode::Char('?') => app.show_help = true,
        AppKeyCode::Esc => app.status = None,
        AppKeyCode::Char(' ') => app.toggle_selected_in_queue(),
        AppKeyCode::Char('d') => {
            if app.download_queue.is_empty() {
                app.set_status("Download queue is empty (Space queues a playlist)", true);
            } else {
                app.pending_action = Some(AppAction::DownloadQueue);
            }
        }
        AppKeyCode::Up | AppKeyCode::Char('k') => {
            if app.focused_pane == FocusPane::Details {
                app.scroll_details_up();
            } else {
                app.move_selection(-1);
            }
        }
        AppKeyCode::Down | AppKeyCode::Char('j') => {
            if app.focused_pane == FocusPane::Details {
                app.scroll_details_down();
            } else {
                app.move_selection(1);
            }
        }
        AppKeyCode::PageUp => {
            if app.focused_pane == FocusPane::Details {
                app.details_scroll = app.details_scroll.saturating_sub(page_size(app) as u16);
            } else {
                app.move_selection(-page_size(app));
            }
        }
        AppKeyCode::PageDown => {
            if app.focused_pane == FocusPane::Details {
                app.details_scroll = app.details_scroll.saturating_add(page_size(app) as u16);
            } else {
                app.move_selection(page_size(app));
            }
        }
        AppKeyCode::Home => {
            if app.focused_pane == FocusPane::Details {
                app.details_scroll = 0;
            } else {
                app.select_first();
            }
        }
        AppKeyCode::End => {
            if app.focused_pane == FocusPane::Tree {
                app.select_last();
            }
        }
        AppKeyCode::Enter | AppKeyCode::Right | AppKeyCode::Char('l') => toggle_selected(app),
        AppKeyCode::Left | AppKeyCode::Char('h') => collapse_or_parent(app),
        _ => {}
    }
}

/// Handle a mouse event.
///
/// `event.column` and `event.row` must already be in terminal cell coordinates.
/// Returns `true` if the UI needs to be redrawn.
pub fn handle_mouse_event(app: &mut AppState, event: AppMouseEvent) -> bool {
    let column = event.column;
    let row = event.row;
    let hovered_pane = pane_at(app, column, row);
    let mut transitioned = false;

    match event.kind {
        AppMouseKind::ScrollUp | AppMouseKind::ScrollDown => {
            let scroll_down = event.kind == AppMouseKind::ScrollDown;
            match hovered_pane {
                Some(FocusPane::Tree) if !app.rows.is_empty() => {
                    let delta = SCROLL_LINES as isize;
                    app.move_selection(if scroll_down { delta } else { -delta });
                    transitioned = true;
                }
                Some(FocusPane::Details) => {
                    for _ in 0..SCROLL_LINES {
                        if scroll_down {
                            app.scroll_details_down();
                        } else {
                            app.scroll_details_up();
                        }
                    }
                    transitioned = true;
                }
                _ => {}
            }
        }
        AppMouseKind::LeftDown => {
            if let Some(pane) = hovered_pane
                && app.focused_pane != pane
            {
                app.focus_pane(pane);
                transitioned = true;
            }

            if hovered_pane == Some(FocusPane::Tree)
                && let Some(content_area) = app.tree_content_area
                && content_area.contains((column, row).into())
                && !app.rows.is_empty()
            {
                let list_row = row.saturating_sub(content_area.y) as usize;
                let clicked = (app.list_state.offset() + list_row).min(app.rows.len() - 1);
                if app.list_state.selected() != Some(clicked) {
                    app.list_state.select(Some(clicked));
                    app.details_scroll = 0;
                    transitioned = true;
                }
            }
        }
    }

    transitioned
}
