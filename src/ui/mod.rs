use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::macros::format_description;
use time::Date;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::state::{DashboardState, EmptyReason};
use crate::config::themes::accent_color;
use crate::config::AppConfig;
use crate::feed::{Status, UpdateRecord};
use crate::highlight::build_highlight_regex;
use crate::prefs::ViewMode;

pub fn draw_app(
    frame: &mut Frame,
    state: &DashboardState,
    list_state: &mut ListState,
    config: &AppConfig,
) {
    let accent = accent_color(&config.theme);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_header(frame, state, accent, vertical[0]);

    if let Some(reason) = state.empty_reason() {
        draw_empty_state(frame, reason, vertical[1]);
    } else {
        match state.view {
            ViewMode::Grid => draw_grid(frame, state, list_state, accent, config, vertical[1]),
            ViewMode::Timeline => draw_timeline(frame, state, accent, vertical[1]),
        }
    }

    draw_footer(frame, state, vertical[2]);

    if state.filters_open {
        draw_filters_panel(frame, state, accent, frame.size());
    }
}

fn draw_header(frame: &mut Frame, state: &DashboardState, accent: Color, area: Rect) {
    let mut title_spans = vec![
        Span::styled(
            "Pulse",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" product updates  "),
        Span::styled(
            format!("[{}]", state.view),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {}/{} shown",
            state.visible_len(),
            state.store().len()
        )),
    ];
    if let Some(message) = &state.status_message {
        title_spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let filter_line = if state.search_active {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(accent)),
            Span::raw(state.criteria.search_text.clone()),
            Span::styled("▏", Style::default().fg(accent)),
        ])
    } else {
        let chips = state.filter_chips();
        if chips.is_empty() {
            Line::from(Span::styled(
                "no filters active",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![Span::styled(
                format!("{} filter(s): ", state.active_filter_count()),
                Style::default().fg(accent),
            )];
            for (i, chip) in chips.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw("  "));
                }
                spans.push(Span::styled(
                    chip.clone(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ));
            }
            spans.push(Span::styled(
                "  (x clears)",
                Style::default().fg(Color::DarkGray),
            ));
            Line::from(spans)
        }
    };

    let header = Paragraph::new(vec![Line::from(title_spans), filter_line])
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_grid(
    frame: &mut Frame,
    state: &DashboardState,
    list_state: &mut ListState,
    accent: Color,
    config: &AppConfig,
    area: Rect,
) {
    let highlight = build_highlight_regex(&state.criteria.search_text);
    let width = area.width.saturating_sub(4) as usize;
    let preview_lines = config.preview_lines as usize;

    let records = state.visible_records();
    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        items.push(ListItem::new(card_lines(
            record,
            highlight.as_ref(),
            width,
            preview_lines,
        )));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title("Updates"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▌ ");
    frame.render_stateful_widget(list, area, list_state);
}

fn card_lines<'a>(
    record: &'a UpdateRecord,
    highlight: Option<&Regex>,
    width: usize,
    preview_lines: usize,
) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(2 + preview_lines);

    let mut title = vec![Span::styled(
        format!("[{}] ", record.status),
        Style::default()
            .fg(status_color(record.status))
            .add_modifier(Modifier::BOLD),
    )];
    title.extend(highlight_spans(
        &record.title,
        highlight,
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(title));

    let mut meta = format!("{}  {}", format_card_date(record.date), record.categories.join(", "));
    if record.link.is_some() {
        meta.push_str("  ↗");
    }
    lines.push(Line::from(Span::styled(
        truncate_to_width(&meta, width),
        Style::default().fg(Color::DarkGray),
    )));

    for raw in record.description.lines().take(preview_lines) {
        lines.push(Line::from(highlight_spans_owned(
            truncate_to_width(raw, width),
            highlight,
            Style::default(),
        )));
    }
    lines.push(Line::from(""));
    lines
}

fn draw_timeline(frame: &mut Frame, state: &DashboardState, accent: Color, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let mut lines = Vec::new();
    for group in state.month_groups() {
        lines.push(Line::from(Span::styled(
            group.label.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )));
        for record in &group.records {
            let row = format!(
                "  {:<7} [{}] {}",
                format_card_date(record.date),
                record.status,
                record.title
            );
            lines.push(Line::from(vec![Span::raw(truncate_to_width(&row, width))]));
        }
        lines.push(Line::from(""));
    }

    let timeline = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title("Timeline"),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(timeline, area);
}

fn draw_empty_state(frame: &mut Frame, reason: EmptyReason, area: Rect) {
    let lines = match reason {
        EmptyReason::NoData => vec![
            Line::from("No updates loaded."),
            Line::from("Point pulsetui at a feed with --feed or set feed.path in the config."),
        ],
        EmptyReason::FiltersTooNarrow => vec![
            Line::from("No updates match the active filters."),
            Line::from("Press x to clear them."),
        ],
    };
    let empty = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Updates"));
    frame.render_widget(empty, area);
}

fn draw_footer(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let help = if state.search_active {
        "type to search  Enter keep  Esc clear".to_string()
    } else {
        "q quit  / search  c/C category  w/W week  v view  f filters  x clear  Ctrl-r reload"
            .to_string()
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

fn draw_filters_panel(frame: &mut Frame, state: &DashboardState, accent: Color, area: Rect) {
    let panel_area = centered_rect(50, 40, area);
    frame.render_widget(Clear, panel_area);

    let search = if state.criteria.search_text.is_empty() {
        "(empty)".to_string()
    } else {
        state.criteria.search_text.clone()
    };
    let category = state
        .criteria
        .category
        .clone()
        .unwrap_or_else(|| "all".to_string());
    let week = state
        .week_filter_label()
        .unwrap_or("all weeks")
        .to_string();

    let lines = vec![
        Line::from(vec![
            Span::styled("Search   ", Style::default().fg(accent)),
            Span::raw(search),
        ]),
        Line::from(vec![
            Span::styled("Category ", Style::default().fg(accent)),
            Span::raw(format!(
                "{category}  ({} available)",
                state.categories().len()
            )),
        ]),
        Line::from(vec![
            Span::styled("Week     ", Style::default().fg(accent)),
            Span::raw(format!("{week}  ({} derived)", state.week_buckets().len())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} filter(s) active", state.active_filter_count()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "/ edit search  c/C cycle category  w/W cycle week  x clear  f close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title("Filters"),
    );
    frame.render_widget(panel, panel_area);
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Ga => Color::Green,
        Status::Preview => Color::Yellow,
        Status::Deprecated => Color::Magenta,
        Status::Retired => Color::Red,
        Status::New => Color::Cyan,
    }
}

fn format_card_date(date: Date) -> String {
    let fmt = format_description!("[month repr:short] [day padding:none]");
    date.format(&fmt).unwrap_or_else(|_| date.to_string())
}

/// Splits `text` into base and highlighted spans around regex matches.
fn highlight_spans<'a>(
    text: &'a str,
    highlight: Option<&Regex>,
    base: Style,
) -> Vec<Span<'a>> {
    let highlight_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let Some(regex) = highlight else {
        return vec![Span::styled(text, base)];
    };
    let mut spans = Vec::new();
    let mut cursor = 0;
    for found in regex.find_iter(text) {
        if found.start() > cursor {
            spans.push(Span::styled(&text[cursor..found.start()], base));
        }
        spans.push(Span::styled(found.as_str(), highlight_style));
        cursor = found.end();
    }
    if cursor < text.len() {
        spans.push(Span::styled(&text[cursor..], base));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text, base));
    }
    spans
}

fn highlight_spans_owned(
    text: String,
    highlight: Option<&Regex>,
    base: Style,
) -> Vec<Span<'static>> {
    highlight_spans(&text, highlight, base)
        .into_iter()
        .map(|span| Span::styled(span.content.into_owned(), span.style))
        .collect()
}

fn truncate_to_width(text: &str, max: usize) -> String {
    if max == 0 || text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
