//! Application state: the browsing tree, selection, download queue.
//!
//! Nodes are addressed by their index path from the roots (`[2, 0, 5]` is the
//! sixth child of the first child of the third root). Only resolved children
//! are ever walked here; fetching happens in [`AppState::expand_path`], which
//! the runtime calls outside the reducer.

use ratatui::widgets::ListState;

use crate::download::DownloadOptions;
use crate::responses::Response;
use crate::session::Session;
use crate::theme::ThemeConfig;

pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Tree,
    Details,
}

/// Work the reducer cannot do itself because it blocks on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Expand(NodePath),
    DownloadQueue,
}

/// One visible line of the tree pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: NodePath,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Application state for the Ratatui app.
pub struct AppState {
    /// Classifier and transport used for lazy children
    pub session: Session,
    /// Start shelves
    pub roots: Vec<Response>,
    /// Paths whose children are shown
    pub expanded: foldhash::HashSet<NodePath>,
    /// Flattened visible tree, rebuilt on expand/collapse
    pub rows: Vec<TreeRow>,
    /// Tree selection state managed by ratatui
    pub list_state: ListState,
    /// Which pane currently has keyboard focus
    pub focused_pane: FocusPane,
    /// Vertical offset of the details pane
    pub details_scroll: u16,
    /// Paths of playlists marked for download
    pub download_queue: Vec<NodePath>,
    pub download_options: DownloadOptions,
    pub theme: ThemeConfig,
    pub status: Option<StatusMessage>,
    /// App version string
    pub app_version: String,
    /// Name of the credentials in use
    pub account_label: String,
    /// Screen region of the tree pane (including borders)
    pub tree_area: Option<ratatui::layout::Rect>,
    /// Screen region of tree content (inside borders)
    pub tree_content_area: Option<ratatui::layout::Rect>,
    /// Screen region of the details pane (including borders)
    pub details_area: Option<ratatui::layout::Rect>,
    pub should_quit: bool,
    pub show_help: bool,
    /// Pending action to execute after input handling
    pub pending_action: Option<AppAction>,
}

impl AppState {
    pub fn new(
        session: Session,
        roots: Vec<Response>,
        download_options: DownloadOptions,
        theme: ThemeConfig,
        app_version: String,
        account_label: String,
    ) -> Self {
        let mut app = Self {
            session,
            roots,
            expanded: foldhash::HashSet::default(),
            rows: Vec::new(),
            list_state: ListState::default(),
            focused_pane: FocusPane::Tree,
            details_scroll: 0,
            download_queue: Vec::new(),
            download_options,
            theme,
            status: None,
            app_version,
            account_label,
            tree_area: None,
            tree_content_area: None,
            details_area: None,
            should_quit: false,
            show_help: false,
            pending_action: None,
        };
        app.rebuild_rows();
        app
    }

    /// Looks a node up by path, walking only already-resolved children.
    pub fn node_at(&self, path: &[usize]) -> Option<&Response> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for idx in rest {
            node = node.cached_children()?.get(*idx)?;
        }
        Some(node)
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.list_state.selected().and_then(|idx| self.rows.get(idx))
    }

    pub fn selected_path(&self) -> Option<NodePath> {
        self.selected_row().map(|row| row.path.clone())
    }

    pub fn selected_node(&self) -> Option<&Response> {
        self.selected_row().and_then(|row| self.node_at(&row.path))
    }

    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded.contains(path)
    }

    /// Recomputes visible rows, keeping the selection on the same node when possible.
    pub fn rebuild_rows(&mut self) {
        let selected = self.selected_path();
        let mut rows = Vec::new();
        let mut prefix = Vec::new();
        push_rows(&self.roots, &mut prefix, 0, &self.expanded, &mut rows);
        self.rows = rows;

        let idx = selected
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .or(if self.rows.is_empty() { None } else { Some(0) });
        self.list_state.select(idx);
        self.clamp_selection();
    }

    /// Clamps the current tree selection to valid bounds.
    pub fn clamp_selection(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        if let Some(selected) = self.list_state.selected()
            && selected >= len
        {
            self.list_state.select(Some(len - 1));
        }
    }

    /// Moves selection by `delta` rows.
    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let last = self.rows.len() as isize - 1;
        let next = (current + delta).clamp(0, last) as usize;
        self.list_state.select(Some(next));
        self.details_scroll = 0;
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
            self.details_scroll = 0;
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
            self.details_scroll = 0;
        }
    }

    /// Expands `path`, resolving its children over the network on first use.
    ///
    /// Failures are reported in the status bar; the node stays collapsed.
    pub fn expand_path(&mut self, path: NodePath) {
        let outcome = match self.node_at(&path) {
            Some(node) if !node.is_leaf() => {
                let title = node.to_string();
                Some((title, node.children(&self.session).map(|c| c.len())))
            }
            _ => None,
        };

        match outcome {
            Some((title, Ok(count))) => {
                tracing::info!(node = %title, count, "expanded");
                self.expanded.insert(path);
                self.set_status(format!("{}: {} items", title, count), false);
            }
            Some((title, Err(err))) => {
                tracing::warn!(node = %title, error = %err, "failed to expand");
                self.set_status(format!("{}: {}", title, err), true);
            }
            None => {}
        }
        self.rebuild_rows();
    }

    /// Hides the children of `path` and of everything below it.
    pub fn collapse_path(&mut self, path: &[usize]) {
        self.expanded.retain(|p| !p.starts_with(path));
        self.rebuild_rows();
    }

    /// Whether expanding `path` needs no network round-trip.
    pub fn children_cached(&self, path: &[usize]) -> bool {
        self.node_at(path)
            .is_some_and(|node| node.cached_children().is_some())
    }

    /// Adds the selected playlist to the download queue, or removes it.
    ///
    /// The same playlist reached from two shelves is queued once.
    pub fn toggle_selected_in_queue(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        let Some(node) = self.node_at(&path) else {
            return;
        };
        if node.as_playlist().is_none() {
            self.set_status("Only playlists can be queued for download", true);
            return;
        }
        let label = node.to_string();
        if let Some(pos) = self.queued_position(&path) {
            self.download_queue.remove(pos);
            self.set_status(format!("Removed '{}' from the download queue", label), false);
        } else {
            self.download_queue.push(path);
            self.set_status(format!("Queued '{}' for download", label), false);
        }
    }

    fn queued_position(&self, path: &[usize]) -> Option<usize> {
        let item_id = self
            .node_at(path)
            .and_then(Response::as_playlist)
            .and_then(|p| p.item_id());
        self.download_queue.iter().position(|queued| {
            queued == path
                || item_id.is_some_and(|id| {
                    self.node_at(queued)
                        .and_then(Response::as_playlist)
                        .and_then(|p| p.item_id())
                        == Some(id)
                })
        })
    }

    pub fn is_queued(&self, path: &[usize]) -> bool {
        self.queued_position(path).is_some()
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    pub fn focus_pane(&mut self, pane: FocusPane) {
        self.focused_pane = pane;
    }

    pub fn focus_next_pane(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusPane::Tree => FocusPane::Details,
            FocusPane::Details => FocusPane::Tree,
        };
    }

    pub fn scroll_details_up(&mut self) {
        self.details_scroll = self.details_scroll.saturating_sub(1);
    }

    pub fn scroll_details_down(&mut self) {
        self.details_scroll = self.details_scroll.saturating_add(1);
    }
}

fn push_rows(
    nodes: &[Response],
    prefix: &mut NodePath,
    depth: usize,
    expanded: &foldhash::HashSet<NodePath>,
    rows: &mut Vec<TreeRow>,
) {
    for (idx, node) in nodes.iter().enumerate() {
        prefix.push(idx);
        rows.push(TreeRow {
            path: prefix.clone(),
            depth,
        });
        if expanded.contains(prefix.as_slice())
            && let Some(children) = node.cached_children()
        {
            push_rows(children, prefix, depth + 1, expanded, rows);
        }
        prefix.pop();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::classifier::Classifier;
    use crate::client::{ClientError, Transport};
    use crate::responses::fixtures::{playlist_raw, track_raw};
    use crate::start_endpoints;
    use serde_json::{Map, Value, json};
    use std::path::PathBuf;

    /// Serves playlists for browse requests and tracks for queue requests.
    pub struct FakeYtm;

    impl Transport for FakeYtm {
        fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError> {
            if payload.contains_key("browse_id") {
                Ok(json!({"contents": {"content": {"contents": {"items": [playlist_raw()]}}}}))
            } else if payload.contains_key("playlistId") {
                Ok(json!({"queueDatas": [
                    {"content": {"playlistPanelVideoRenderer": track_raw("t1", "One")}},
                    {"content": {"playlistPanelVideoRenderer": track_raw("t2", "Two")}}
                ]}))
            } else {
                Err(ClientError::Status(500))
            }
        }
    }

    pub fn make_test_app() -> AppState {
        let classifier = Classifier::default();
        let roots = start_endpoints::endpoints(&classifier).unwrap();
        AppState::new(
            Session::new(classifier, Box::new(FakeYtm)),
            roots,
            DownloadOptions::new(PathBuf::from("/tmp/ytm-test")),
            crate::theme::Theme::Dracula.config(),
            "v0".to_string(),
            "test".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::make_test_app;
    use super::*;

    #[test]
    fn test_initial_rows_are_roots() {
        let app = make_test_app();
        assert_eq!(app.rows.len(), 4);
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.selected_node().and_then(|n| n.title()), Some("New releases albums"));
    }

    #[test]
    fn test_expand_and_collapse() {
        let mut app = make_test_app();
        assert!(!app.children_cached(&[0]));
        app.expand_path(vec![0]);
        assert!(app.is_expanded(&[0]));
        assert_eq!(app.rows.len(), 5);
        assert_eq!(app.rows[1], TreeRow { path: vec![0, 0], depth: 1 });

        app.expand_path(vec![0, 0]);
        assert_eq!(app.rows.len(), 7);
        assert_eq!(app.node_at(&[0, 0, 1]).and_then(|n| n.title()), Some("Two"));

        app.collapse_path(&[0]);
        assert_eq!(app.rows.len(), 4);
        assert!(!app.is_expanded(&[0, 0]));
        // Children stay cached on the node
        assert!(app.children_cached(&[0]));
    }

    #[test]
    fn test_expand_failure_sets_error_status() {
        let mut app = make_test_app();
        app.roots[1] = app
            .session
            .classifier()
            .classify(&serde_json::json!({"title": "Broken", "payload": {"other": 1}}))
            .unwrap();
        app.expand_path(vec![1]);
        assert!(!app.is_expanded(&[1]));
        assert_eq!(app.rows.len(), 4);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
        assert!(app.node_at(&[1]).unwrap().children_error().is_some());
    }

    #[test]
    fn test_expanding_a_track_is_a_no_op() {
        let mut app = make_test_app();
        app.expand_path(vec![0]);
        app.expand_path(vec![0, 0]);
        app.status = None;
        app.expand_path(vec![0, 0, 0]);
        assert!(!app.is_expanded(&[0, 0, 0]));
        assert!(app.status.is_none());
    }

    #[test]
    fn test_selection_follows_node_across_rebuild() {
        let mut app = make_test_app();
        app.move_selection(3);
        assert_eq!(app.selected_path(), Some(vec![3]));
        app.expand_path(vec![0]);
        assert_eq!(app.selected_path(), Some(vec![3]));
        assert_eq!(app.list_state.selected(), Some(4));
    }

    #[test]
    fn test_toggle_queue_only_accepts_playlists() {
        let mut app = make_test_app();
        app.toggle_selected_in_queue();
        assert!(app.download_queue.is_empty());
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));

        app.expand_path(vec![0]);
        app.move_selection(1);
        app.toggle_selected_in_queue();
        assert_eq!(app.download_queue, vec![vec![0, 0]]);
        assert!(app.is_queued(&[0, 0]));
        app.toggle_selected_in_queue();
        assert!(app.download_queue.is_empty());
    }

    #[test]
    fn test_queue_dedupes_same_playlist_across_shelves() {
        let mut app = make_test_app();
        app.expand_path(vec![0]);
        app.expand_path(vec![1]);
        assert_eq!(app.selected_path(), Some(vec![0]));
        app.move_selection(1);
        app.toggle_selected_in_queue();

        // Shelf 1 serves the same playlist tile
        assert!(app.is_queued(&[1, 0]));
        app.move_selection(2);
        assert_eq!(app.selected_path(), Some(vec![1, 0]));
        app.toggle_selected_in_queue();
        assert!(app.download_queue.is_empty());
    }

    #[test]
    fn test_queued_playlist_shares_children_cache_with_tree() {
        let mut app = make_test_app();
        app.expand_path(vec![0]);
        app.move_selection(1);
        app.toggle_selected_in_queue();

        let path = app.download_queue[0].clone();
        let node = app.node_at(&path).unwrap();
        assert_eq!(node.children(&app.session).unwrap().len(), 2);
        assert!(app.children_cached(&[0, 0]));
    }
}
