use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::{BrowserModel, FilterState, Margins, ITEM_HEIGHT, ITEM_SPACING};

const COLOR_TITLE_BG: Color = Color::Rgb(98, 114, 164);
const COLOR_TITLE_FG: Color = Color::Rgb(248, 248, 242);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(127, 132, 156);
const COLOR_ACCENT: Color = Color::Rgb(203, 166, 247);
const COLOR_ACCENT_DIM: Color = Color::Rgb(166, 132, 214);
const COLOR_DOT_INACTIVE: Color = Color::Rgb(69, 71, 90);

const SELECTED_MARKER: &str = "│ ";
const UNSELECTED_MARKER: &str = "  ";
const ELLIPSIS: char = '…';

const SHORT_HELP: &[(&str, &str)] = &[
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("/", "filter"),
    ("enter", "open"),
    ("q", "quit"),
    ("?", "more"),
];

const FULL_HELP: &[(&str, &str)] = &[
    ("↑/k", "up"),
    ("↓/j", "down"),
    ("←/h/pgup", "prev page"),
    ("→/l/pgdn", "next page"),
    ("g/home", "go to start"),
    ("G/end", "go to end"),
    ("/", "filter"),
    ("esc", "clear filter"),
    ("enter", "open link"),
    ("q", "quit"),
    ("?", "close help"),
];

const FILTER_HELP: &[(&str, &str)] = &[
    ("enter", "apply filter"),
    ("esc", "cancel"),
    ("ctrl+c", "quit"),
];

#[derive(Debug, Clone)]
pub struct Renderer {
    margins: Margins,
    title: String,
}

impl Renderer {
    pub fn new<S: Into<String>>(margins: Margins, title: S) -> Self {
        Self {
            margins,
            title: title.into(),
        }
    }

    pub fn content_area(&self, full: Rect, model: &BrowserModel) -> Rect {
        let inner = full.inner(&Margin {
            vertical: self.margins.vertical,
            horizontal: self.margins.horizontal,
        });
        let (width, height) = model.viewport();
        Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width.min(width),
            height: inner.height.min(height),
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>, model: &BrowserModel) {
        let area = self.content_area(frame.size(), model);
        if area.width == 0 || area.height == 0 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let width = usize::from(area.width);
        frame.render_widget(Paragraph::new(self.title_line(model, width)), rows[0]);
        frame.render_widget(Paragraph::new(status_line(model, width)), rows[1]);
        frame.render_widget(Paragraph::new(item_lines(model, width)), rows[3]);
        frame.render_widget(Paragraph::new(pagination_line(model, width)), rows[4]);
        frame.render_widget(Paragraph::new(help_line(model, width)), rows[5]);
    }

    fn title_line(&self, model: &BrowserModel, width: usize) -> Line<'static> {
        if model.is_filtering() {
            let prompt = "Filter: ";
            let query = truncate(
                model.filter_text(),
                width.saturating_sub(UnicodeWidthStr::width(prompt) + 1),
            );
            return Line::from(vec![
                Span::styled(prompt, Style::default().fg(COLOR_ACCENT)),
                Span::styled(query, Style::default().fg(COLOR_TEXT_PRIMARY)),
                Span::styled(
                    " ",
                    Style::default().add_modifier(Modifier::REVERSED),
                ),
            ]);
        }

        let label = truncate(&format!(" {} ", self.title), width);
        Line::from(Span::styled(
            label,
            Style::default()
                .fg(COLOR_TITLE_FG)
                .bg(COLOR_TITLE_BG)
                .add_modifier(Modifier::BOLD),
        ))
    }
}

fn status_line(model: &BrowserModel, width: usize) -> Line<'static> {
    let total = model.items().len();
    let shown = model.visible_len();
    let narrowed =
        model.filter_state() != FilterState::Unfiltered && !model.filter_text().is_empty();

    let text = if total == 0 {
        "No items.".to_string()
    } else if shown == 0 {
        "Nothing matched.".to_string()
    } else if narrowed {
        format!(
            "{shown} of {total} {} · “{}”",
            noun(total),
            model.filter_text()
        )
    } else {
        format!("{total} {}", noun(total))
    };

    Line::from(Span::styled(
        truncate(&text, width),
        Style::default().fg(COLOR_TEXT_SECONDARY),
    ))
}

fn noun(count: usize) -> &'static str {
    if count == 1 {
        "item"
    } else {
        "items"
    }
}

fn item_lines(model: &BrowserModel, width: usize) -> Text<'static> {
    let (start, end) = model.page_bounds();
    let text_width = width.saturating_sub(UnicodeWidthStr::width(SELECTED_MARKER));
    let mut lines = Vec::with_capacity((end - start) * usize::from(ITEM_HEIGHT + ITEM_SPACING));

    for (position, item) in model
        .visible_items()
        .enumerate()
        .skip(start)
        .take(end - start)
    {
        if position > start {
            for _ in 0..ITEM_SPACING {
                lines.push(Line::default());
            }
        }

        let selected = position == model.selected_index();
        let (marker, title_style, desc_style) = if selected {
            (
                SELECTED_MARKER,
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
                Style::default().fg(COLOR_ACCENT_DIM),
            )
        } else {
            (
                UNSELECTED_MARKER,
                Style::default().fg(COLOR_TEXT_PRIMARY),
                Style::default().fg(COLOR_TEXT_SECONDARY),
            )
        };
        let marker_style = Style::default().fg(COLOR_ACCENT);

        lines.push(Line::from(vec![
            Span::styled(marker, marker_style),
            Span::styled(truncate(&item.title, text_width), title_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled(marker, marker_style),
            Span::styled(truncate(&item.description, text_width), desc_style),
        ]));
    }

    Text::from(lines)
}

fn pagination_line(model: &BrowserModel, width: usize) -> Line<'static> {
    let total = model.total_pages();
    if total <= 1 {
        return Line::default();
    }

    let current = model.page();
    let indent = UNSELECTED_MARKER.to_string();
    if total + indent.len() <= width {
        let mut spans = vec![Span::raw(indent)];
        spans.extend((0..total).map(|page| {
            if page == current {
                Span::styled("•", Style::default().fg(COLOR_ACCENT))
            } else {
                Span::styled("○", Style::default().fg(COLOR_DOT_INACTIVE))
            }
        }));
        Line::from(spans)
    } else {
        let label = format!("{}/{}", current + 1, total);
        Line::from(Span::styled(
            truncate(&label, width),
            Style::default().fg(COLOR_TEXT_SECONDARY),
        ))
    }
}

fn help_line(model: &BrowserModel, width: usize) -> Line<'static> {
    let bindings = if model.is_filtering() {
        FILTER_HELP
    } else if model.show_full_help() {
        FULL_HELP
    } else {
        SHORT_HELP
    };
    let text = bindings
        .iter()
        .map(|(key, action)| format!("{key} {action}"))
        .collect::<Vec<_>>()
        .join(" • ");
    Line::from(Span::styled(
        truncate(&text, width),
        Style::default().fg(COLOR_TEXT_SECONDARY),
    ))
}

fn truncate(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push(ELLIPSIS);
    out
}
