use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table};

use crate::ranking::{RankMode, RowDisplay};
use crate::tui::app::{App, InputMode, Stage};
use crate::tui::theme;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title + breadcrumb
        Constraint::Fill(1),   // Selection list or results table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    match app.stage {
        Stage::Results => render_results(frame, chunks[1], app),
        _ => render_selection_list(frame, chunks[1], app),
    }
    render_status_bar(frame, chunks[2], app);

    match app.input_mode {
        InputMode::HighlightInput => render_highlight_popup(frame, app),
        InputMode::Help => render_help_popup(frame),
        InputMode::Normal => {}
    }

    // Loading overlay sits on top of everything
    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "studrank",
        Style::default().fg(theme::TITLE_COLOR).bold(),
    )];

    let mut crumbs = Vec::new();
    if let Some(f) = &app.selected_faculty {
        crumbs.push(f.text.clone());
    }
    if let Some(s) = &app.selected_speciality {
        crumbs.push(s.text.clone());
    }
    if let Some(c) = app.selected_course {
        crumbs.push(format!("Course {}", c));
    }
    if !crumbs.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            crumbs.join(" > "),
            Style::default().fg(theme::MUTED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_selection_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let (title, labels): (&str, Vec<String>) = match app.stage {
        Stage::Faculties => (
            " Select faculty ",
            app.faculties.iter().map(|f| f.text.clone()).collect(),
        ),
        Stage::Specialities => (
            " Select speciality ",
            app.specialities.iter().map(|s| s.text.clone()).collect(),
        ),
        Stage::Courses => (
            " Select course ",
            app.courses
                .iter()
                .map(|c| format!("Course {}", c.course))
                .collect(),
        ),
        Stage::Results => return,
    };

    if labels.is_empty() && !app.is_loading {
        let empty = Paragraph::new("Nothing here")
            .alignment(Alignment::Center)
            .block(Block::bordered().title(title));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(Block::bordered().title(title))
        .highlight_style(theme::ROW_SELECTED);

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_results(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Subject / type / mode controls
        Constraint::Fill(1),   // Ranked table
    ])
    .split(area);

    render_controls(frame, chunks[0], app);

    let rows_data = app.visible_rows();
    if rows_data.is_empty() {
        let msg = if app.ranked.is_empty() {
            "No marks for this subject"
        } else {
            "All rows outside the highlight range"
        };
        let empty = Paragraph::new(msg).alignment(Alignment::Center);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    // Scale bars to the best visible value of the active metric
    let metric = |entry: &crate::ranking::RankedStudent| match app.mode {
        RankMode::ByAverage => entry.result.average,
        RankMode::BySum => entry.result.sum,
    };
    let max_metric = rows_data
        .iter()
        .map(|&(_, entry, _)| metric(entry))
        .fold(0.0_f64, f64::max);

    let rows: Vec<Row> = rows_data
        .iter()
        .enumerate()
        .map(|(visible_idx, &(_, entry, state))| {
            let value = metric(entry);
            let bar = metric_bar(value, max_metric, 8);
            let color = theme::mark_color(value, max_metric);

            let mut value_spans = vec![Span::styled(
                format!("{:>6.2} ", value),
                Style::default().fg(color),
            )];
            value_spans.extend(bar.spans);

            let row_style = match state {
                RowDisplay::Highlighted => theme::HIGHLIGHT_STYLE,
                _ if visible_idx % 2 == 1 => Style::default().bg(theme::ROW_ALT_BG),
                _ => Style::default(),
            };

            Row::new(vec![
                Cell::from(format!("{}.", entry.rank))
                    .style(Style::default().fg(theme::INDEX_COLOR)),
                Cell::from(entry.result.student_card_number.clone()),
                Cell::from(Line::from(value_spans)),
                Cell::from(format!("{:>8.2}", entry.result.sum)),
                Cell::from(format!("{:>5}", entry.result.count)),
            ])
            .style(row_style)
        })
        .collect();

    let metric_header = match app.mode {
        RankMode::ByAverage => "Average",
        RankMode::BySum => "Sum",
    };
    let widths = [
        Constraint::Length(5),  // Rank: "99."
        Constraint::Length(12), // Card number
        Constraint::Length(16), // Metric + bar
        Constraint::Length(10), // Sum
        Constraint::Length(6),  // Mark count
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Card", metric_header, "Sum", "Marks"])
                .style(theme::HEADER_STYLE)
                .bottom_margin(1),
        )
        .row_highlight_style(theme::ROW_SELECTED);

    frame.render_stateful_widget(table, chunks[1], &mut app.table_state);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let subject = app.current_subject().unwrap_or("-");
    let lesson_type = app.current_lesson_type().unwrap_or("all");

    let mut spans = vec![
        Span::styled("Subject: ", Style::default().fg(theme::MUTED)),
        Span::styled(subject, Style::default().bold()),
        Span::styled("  Type: ", Style::default().fg(theme::MUTED)),
        Span::raw(lesson_type),
        Span::styled("  Rank by: ", Style::default().fg(theme::MUTED)),
        Span::raw(app.mode.label()),
    ];

    if let Some(spec) = &app.highlight {
        spans.push(Span::styled(
            format!(
                "  top {:.0}% of [{:.0}, {:.0}]",
                spec.percent, spec.from, spec.to
            ),
            Style::default().fg(theme::FLASH_SUCCESS),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Error") || msg.starts_with("Invalid") {
            theme::FLASH_ERROR
        } else {
            theme::FLASH_SUCCESS
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = match app.stage {
            Stage::Faculties => format!("{} faculties", app.faculties.len()),
            Stage::Specialities => format!("{} specialities", app.specialities.len()),
            Stage::Courses => format!("{} courses", app.courses.len()),
            Stage::Results => format!("{} students", app.visible_rows().len()),
        };

        let hints: Vec<(&str, &str)> = match app.stage {
            Stage::Results => vec![
                ("j/k", ":nav "),
                ("Tab", ":subject "),
                ("t", ":type "),
                ("m", ":mode "),
                ("h", ":highlight "),
                ("c", ":clear "),
                ("Esc", ":back "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            _ => vec![
                ("j/k", ":nav "),
                ("Enter", ":select "),
                ("Esc", ":back "),
                ("r", ":refresh "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme::MUTED)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                *key,
                Style::default().fg(theme::STATUS_KEY_COLOR),
            ));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme::STATUS_BAR_BG)),
        area,
    );
}

fn metric_bar(value: f64, max_value: f64, width: usize) -> Line<'static> {
    let ratio = if max_value > 0.0 {
        (value / max_value).min(1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_color = theme::mark_color(value, max_value);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(bar_color),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled(
            "░".repeat(empty),
            Style::default().fg(theme::BAR_EMPTY),
        ));
    }

    Line::from(spans)
}

/// Render the highlight spec input popup
fn render_highlight_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(44, 5, frame.area());

    frame.render_widget(Clear, popup_area);
    let block = Block::bordered().title(" Highlight top N% ");
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    let input_text = format!("{}|", app.highlight_input);
    frame.render_widget(Paragraph::new(input_text), chunks[0]);

    let help = Paragraph::new("PERCENT FROM TO | Enter: apply | Esc: cancel")
        .style(Style::default().fg(theme::MUTED));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect_fixed(52, 17, frame.area());

    frame.render_widget(Clear, popup_area);
    let block = Block::bordered().title(" Keyboard Shortcuts ");
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(Color::Cyan).bold();
    let help_lines = vec![
        Line::from(vec![
            Span::styled("j / Down      ", key_style),
            Span::raw("Move down"),
        ]),
        Line::from(vec![
            Span::styled("k / Up        ", key_style),
            Span::raw("Move up"),
        ]),
        Line::from(vec![
            Span::styled("Enter         ", key_style),
            Span::raw("Select / descend"),
        ]),
        Line::from(vec![
            Span::styled("Esc           ", key_style),
            Span::raw("Back up one level"),
        ]),
        Line::from(vec![
            Span::styled("Tab / BackTab ", key_style),
            Span::raw("Next / previous subject"),
        ]),
        Line::from(vec![
            Span::styled("t             ", key_style),
            Span::raw("Cycle lesson type filter"),
        ]),
        Line::from(vec![
            Span::styled("m             ", key_style),
            Span::raw("Rank by average / by sum"),
        ]),
        Line::from(vec![
            Span::styled("h             ", key_style),
            Span::raw("Highlight top N% in id range"),
        ]),
        Line::from(vec![
            Span::styled("c             ", key_style),
            Span::raw("Clear highlight"),
        ]),
        Line::from(vec![
            Span::styled("r             ", key_style),
            Span::raw("Refresh current view"),
        ]),
        Line::from(vec![
            Span::styled("q / Ctrl-c    ", key_style),
            Span::raw("Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(theme::MUTED),
        )),
    ];

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());

    frame.render_widget(Clear, popup_area);
    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % 10];

    let text = match app.stage {
        Stage::Results => format!("{} Refreshing...", spinner),
        _ => format!("{} Loading...", spinner),
    };

    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(loading_text, inner);
}
