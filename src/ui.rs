use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use crate::app::App;
use crate::balance::BalanceDisplay;
use crate::render;
use crate::transcript::TranscriptEntry;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, body_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_preset_picker {
        render_preset_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" satchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    // Wallet readout on the right; the cost suffix gets its own red span
    let mut balance_spans = vec![Span::styled(
        app.balance.headline(),
        match app.balance {
            BalanceDisplay::Unavailable => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::White),
        },
    )];
    if let Some(suffix) = app.balance.cost_suffix() {
        balance_spans.push(Span::raw(" "));
        balance_spans.push(Span::styled(
            suffix,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    balance_spans.push(Span::raw(" "));
    let balance_line = Line::from(balance_spans);

    let balance_width = balance_line.width() as u16;
    let [title_area, balance_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(balance_width)]).areas(area);

    let header_style = Style::default().bg(Color::DarkGray);
    frame.render_widget(Paragraph::new(title).style(header_style), title_area);
    frame.render_widget(Paragraph::new(balance_line).style(header_style), balance_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.transcript_height = area.height.saturating_sub(2);
    app.transcript_width = area.width.saturating_sub(2);

    let entries = app.pipeline.transcript().entries();
    let text = if entries.is_empty() {
        Text::from(Span::styled(
            "Ask anything. Each answer costs a few sats.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for entry in entries {
            match entry {
                TranscriptEntry::User(content) => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    // User text is literal: no markup interpretation
                    lines.extend(render::literal(content));
                    lines.push(Line::default());
                }
                TranscriptEntry::Assistant(content) => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(app.renderer.render(content).lines);
                    lines.push(Line::default());
                }
                TranscriptEntry::Error(message) => {
                    lines.push(Line::from(vec![
                        Span::styled(
                            "! ",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(message.clone(), Style::default().fg(Color::Red)),
                    ]));
                    lines.push(Line::default());
                }
                TranscriptEntry::Loading => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat((app.animation_frame as usize) + 1);
                    lines.push(Line::from(Span::styled(
                        format!("Thinking{}", dots),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
            }
        }

        Text::from(lines)
    };

    // Estimate wrapped line count so follow-bottom can pin the newest entry
    let wrap_width = app.transcript_width.max(1) as usize;
    let mut total_lines: u16 = 0;
    for line in &text.lines {
        total_lines = total_lines.saturating_add((line.width() / wrap_width) as u16 + 1);
    }
    app.transcript_total_lines = total_lines;

    let max_scroll = app.max_transcript_scroll();
    if app.follow_bottom {
        app.transcript_scroll = max_scroll;
    } else {
        app.transcript_scroll = app.transcript_scroll.min(max_scroll);
    }

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let sending = app.pipeline.is_sending();
    let (title, border_color) = if sending {
        (" Waiting for reply... ", Color::DarkGray)
    } else {
        (" Ask ", Color::Yellow)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Get the visible slice of the input
    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor unless the picker is on top
    if !app.show_preset_picker {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.pipeline.is_sending() {
        (" THINKING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" ^P ", key_style),
        Span::styled(" presets ", label_style),
        Span::styled(" ^R ", key_style),
        Span::styled(" balance ", label_style),
        Span::styled(" \u{2191}/\u{2193} ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_preset_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 40, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Preset Prompts (Enter to send, Esc to close) ");

    let items: Vec<ListItem> = app
        .presets
        .iter()
        .map(|p| ListItem::new(format!(" {} ", p)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_widget(Clear, popup_area);
    frame.render_stateful_widget(list, popup_area, &mut app.preset_state);
}

/// Centered popup rect, sized as a percentage of the containing area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}
