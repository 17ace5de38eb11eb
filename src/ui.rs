use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState,
    },
};
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app_core::state::{AppState, FocusPane};
use crate::responses::Response;
use crate::theme;

const INDENT: &str = "  ";

/// Main UI entry point that renders the entire application layout.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Tree and details
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    app.tree_area = Some(main_chunks[0]);
    app.details_area = Some(main_chunks[1]);

    render_tree(f, app, main_chunks[0]);
    render_details(f, app, main_chunks[1]);
    render_status_bar(f, app, chunks[1]);

    if app.show_help {
        render_help_overlay(f, app);
    }
}

/// Marker shown in front of a tree row.
pub fn row_marker(node: &Response, expanded: bool) -> &'static str {
    if node.is_leaf() {
        "♪ "
    } else if node.children_error().is_some() {
        "✗ "
    } else if expanded {
        "▾ "
    } else {
        "▸ "
    }
}

/// Renders the browsing tree.
fn render_tree(f: &mut Frame, app: &mut AppState, area: Rect) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .filter_map(|row| {
            let node = app.node_at(&row.path)?;
            let mut spans = vec![
                Span::raw(INDENT.repeat(row.depth)),
                Span::styled(
                    row_marker(node, app.is_expanded(&row.path)),
                    if node.children_error().is_some() {
                        app.theme.error
                    } else {
                        app.theme.accent
                    },
                ),
            ];
            if app.is_queued(&row.path) {
                spans.push(Span::styled("[x] ", app.theme.accent));
            }
            spans.push(Span::raw(node.to_string()));
            Some(ListItem::new(Line::from(spans)))
        })
        .collect();

    let is_focused = app.focused_pane == FocusPane::Tree;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .title_style(app.theme.title)
        .title(format!(" YouTube Music ({}) ", app.account_label))
        .title_bottom(if is_focused {
            Line::from(" ↑/↓ move • Enter expand • Space queue ").right_aligned()
        } else {
            Line::from("").right_aligned()
        })
        .title_alignment(Alignment::Left)
        .style(app.theme.list_normal);

    app.tree_content_area = Some(block.inner(area));

    let list = List::new(items)
        .block(block)
        .style(app.theme.list_normal)
        .scroll_padding(2)
        .highlight_style(app.theme.list_selected);

    f.render_stateful_widget(list, area, &mut app.list_state);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
    let mut scrollbar_state =
        ScrollbarState::new(app.rows.len()).position(app.list_state.selected().unwrap_or(0));

    f.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Header lines describing a node, shown above its payload.
pub fn node_summary(node: &Response, theme: &theme::ThemeConfig) -> Vec<Line<'static>> {
    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{: <10}", name), theme.title),
            Span::styled(value, theme.text),
        ])
    };

    let mut lines = vec![
        field("Title", node.title().unwrap_or("(untitled)").to_string()),
        field("Kind", node.kind().to_string()),
    ];

    if let Some(track) = node.as_track() {
        lines.push(field("Artist", track.artist().to_string()));
        lines.push(field("Duration", track.duration().to_string()));
        lines.push(field("Video", track.watch_url()));
    } else if let Some(err) = node.children_error() {
        lines.push(Line::from(vec![
            Span::styled(format!("{: <10}", "Children"), theme.title),
            Span::styled(err.to_string(), theme.error),
        ]));
    } else {
        let children = match node.cached_children() {
            Some(children) => format!("{} loaded", children.len()),
            None => "not loaded (Enter)".to_string(),
        };
        lines.push(field("Children", children));
    }
    lines
}

/// Renders the details pane: node summary followed by its request payload.
fn render_details(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Details;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .style(app.theme.text)
        .title(" Details ")
        .title_alignment(Alignment::Left)
        .title_style(app.theme.title)
        .title_bottom(if is_focused {
            Line::from(" ↑/↓ scroll • Tab cycle ").right_aligned()
        } else {
            Line::from("").right_aligned()
        });

    let inner_area = block.inner(area);
    f.render_widget(block, area);
    if inner_area.width == 0 || inner_area.height == 0 {
        return;
    }

    let Some(node) = app.selected_node() else {
        return;
    };

    let mut lines = node_summary(node, &app.theme);
    if let Some(payload) = node.payload() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Payload", app.theme.title)));
        lines.extend(highlight_json(
            &Value::Object(payload.clone()),
            &app.theme.json_style,
        ));
    }

    let max_scroll = (lines.len() as u16).saturating_sub(inner_area.height);
    if app.details_scroll > max_scroll {
        app.details_scroll = max_scroll;
    }

    let content_area = inner_area.inner(Margin::new(1, 0));
    f.render_widget(
        Paragraph::new(lines)
            .style(app.theme.text)
            .scroll((app.details_scroll, 0)),
        content_area,
    );
}

/// Renders the multisection status bar at the bottom.
fn render_status_bar(f: &mut Frame, app: &mut AppState, area: Rect) {
    let area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        area.height,
    );

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(50),
            Constraint::Percentage(15),
        ])
        .split(area);

    let key_style = app.theme.title;
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);

    let shortcuts = Line::from(vec![
        Span::styled("d ", key_style),
        Span::raw(format!("download ({})  ", app.download_queue.len())),
        Span::styled("? ", key_style),
        Span::raw("help  "),
        Span::styled("q ", key_style),
        Span::raw("quit"),
    ]);
    f.render_widget(
        Paragraph::new(shortcuts)
            .style(bar_style)
            .alignment(Alignment::Left),
        chunks[0],
    );

    if let Some(status) = &app.status {
        let style = if status.is_error {
            app.theme.error
        } else {
            app.theme.text
        };
        let text = truncate_to_width(&status.text, chunks[1].width as usize);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center),
            chunks[1],
        );
    }

    f.render_widget(
        Paragraph::new(Line::from(app.app_version.as_str()))
            .style(bar_style)
            .alignment(Alignment::Right),
        chunks[2],
    );
}

fn render_help_overlay(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    let popup_width = area.width.min(60).saturating_sub(4);
    let popup_height = 18.min(area.height.saturating_sub(2));
    if popup_width == 0 || popup_height == 0 {
        return;
    }
    let popup_rect = Rect::new(
        area.x + (area.width.saturating_sub(popup_width)) / 2,
        area.y + (area.height.saturating_sub(popup_height)) / 2,
        popup_width,
        popup_height,
    );

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(" Help ")
        .border_type(BorderType::Double)
        .title_style(app.theme.title);

    let inner_area = block.inner(popup_rect);
    f.render_widget(block, popup_rect);

    let key_style = app.theme.title;
    let desc_style = app.theme.text;
    let header_style = key_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let format_section = |title: &str, items: Vec<(&str, &str)>| -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(title.to_string(), header_style))];
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("{: <14}", key), key_style),
                Span::styled(desc.to_string(), desc_style),
            ]));
        }
        lines
    };

    let mut lines = format_section(
        "Browse",
        vec![
            ("↑/↓ | j/k", "move"),
            ("Enter | →", "expand or collapse"),
            ("← | h", "collapse or go to parent"),
            ("Tab", "switch pane"),
            ("Mouse", "select and scroll"),
        ],
    );
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Download",
        vec![
            ("Space", "queue or unqueue playlist"),
            ("d", "download queued playlists"),
        ],
    ));
    lines.push(Line::from(""));
    lines.extend(format_section(
        "General",
        vec![("Esc", "clear message"), ("?", "close help"), ("q", "quit")],
    ));

    f.render_widget(Paragraph::new(lines), inner_area.inner(Margin::new(1, 1)));
}

/// Pretty-prints `value` as colored lines.
pub fn highlight_json(value: &Value, style: &theme::JsonStyle) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    push_json(value, style, 0, Vec::new(), false, &mut lines);
    lines
}

fn push_json(
    value: &Value,
    style: &theme::JsonStyle,
    depth: usize,
    mut prefix: Vec<Span<'static>>,
    trailing_comma: bool,
    lines: &mut Vec<Line<'static>>,
) {
    let indent = INDENT.repeat(depth);
    let comma = if trailing_comma { "," } else { "" };
    if prefix.is_empty() {
        prefix.push(Span::raw(indent.clone()));
    }

    let (open, close, entries): (&str, &str, Vec<(Option<&String>, &Value)>) = match value {
        Value::Object(map) if !map.is_empty() => {
            ("{", "}", map.iter().map(|(k, v)| (Some(k), v)).collect())
        }
        Value::Array(items) if !items.is_empty() => {
            ("[", "]", items.iter().map(|v| (None, v)).collect())
        }
        scalar => {
            prefix.push(scalar_span(scalar, style));
            prefix.push(Span::raw(comma));
            lines.push(Line::from(prefix));
            return;
        }
    };

    prefix.push(Span::raw(open));
    lines.push(Line::from(prefix));
    let last = entries.len() - 1;
    for (idx, (key, child)) in entries.into_iter().enumerate() {
        let mut child_prefix = vec![Span::raw(INDENT.repeat(depth + 1))];
        if let Some(key) = key {
            child_prefix.push(Span::styled(
                format!("\"{}\"", key),
                Style::default().fg(style.key).add_modifier(Modifier::BOLD),
            ));
            child_prefix.push(Span::raw(": "));
        }
        push_json(child, style, depth + 1, child_prefix, idx != last, lines);
    }
    lines.push(Line::from(format!("{}{}{}", indent, close, comma)));
}

fn scalar_span(value: &Value, style: &theme::JsonStyle) -> Span<'static> {
    match value {
        Value::String(s) => Span::styled(
            Value::String(s.clone()).to_string(),
            Style::default().fg(style.string),
        ),
        Value::Number(n) => Span::styled(n.to_string(), Style::default().fg(style.number)),
        Value::Bool(_) | Value::Null => {
            Span::styled(value.to_string(), Style::default().fg(style.boolean))
        }
        // Empty containers
        other => Span::raw(other.to_string()),
    }
}

/// Cuts `text` to at most `width` terminal cells, marking the cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_core::state::test_support::make_test_app;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_json_layout() {
        let style = theme::Theme::Dracula.config().json_style;
        let lines = highlight_json(&json!({"browseId": "FE1", "n": 2, "a": []}), &style);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            text,
            vec!["{", "  \"browseId\": \"FE1\",", "  \"n\": 2,", "  \"a\": []", "}"]
        );
        assert_eq!(lines[2].spans[3].style.fg, Some(style.number));
    }

    #[test]
    fn test_highlight_nested() {
        let style = theme::Theme::Gruvbox.config().json_style;
        let lines = highlight_json(&json!({"outer": {"inner": true}}), &style);
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            text,
            vec!["{", "  \"outer\": {", "    \"inner\": true", "  }", "}"]
        );
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_row_markers() {
        let mut app = make_test_app();
        assert_eq!(row_marker(&app.roots[0], false), "▸ ");
        app.expand_path(vec![0]);
        app.expand_path(vec![0, 0]);
        assert_eq!(row_marker(app.node_at(&[0, 0]).unwrap(), true), "▾ ");
        assert_eq!(row_marker(app.node_at(&[0, 0, 0]).unwrap(), false), "♪ ");
    }

    #[test]
    fn test_render_records_pane_areas() {
        let mut app = make_test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        assert_eq!(app.tree_area, Some(Rect::new(0, 0, 40, 29)));
        assert_eq!(app.tree_content_area, Some(Rect::new(1, 1, 38, 27)));
        assert!(app.details_area.is_some());

        let buffer = terminal.backend().buffer().clone();
        let first_row: String = (0..40u16)
            .map(|x| buffer[(x, 1u16)].symbol().to_string()).collect();
        assert!(first_row.contains("New releases albums"));
    }
}
