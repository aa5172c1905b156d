use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::chat_list::{ChatId, Unread};
use crate::config::COMMANDS;
use crate::message::{self, Origin, Reaction};
use crate::platform::Permission;
use crate::sheet::SheetId;
use crate::ui_state::Focus;

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub panel: Color,
    pub accent: Color,
    pub warm: Color,
    pub highlight: Color,
    pub success: Color,
    pub danger: Color,
    pub text: Color,
    pub text_dim: Color,
    pub muted: Color,
    pub border: Color,
    pub bubble_me: Color,
    pub bubble_other: Color,
}

// Copper Sapphire night
const DARK: Palette = Palette {
    bg: Color::Rgb(12, 12, 16),
    panel: Color::Rgb(18, 18, 24),
    accent: Color::Rgb(101, 150, 243),    // #6596F3
    warm: Color::Rgb(164, 103, 38),       // #A46726
    highlight: Color::Rgb(178, 220, 226), // #B2DCE2
    success: Color::Rgb(131, 179, 102),   // #83B366
    danger: Color::Rgb(204, 92, 68),      // #CC5C44
    text: Color::Rgb(240, 240, 245),
    text_dim: Color::Rgb(180, 180, 190),
    muted: Color::Rgb(105, 116, 133),
    border: Color::Rgb(45, 50, 60),
    bubble_me: Color::Rgb(84, 112, 156),
    bubble_other: Color::Rgb(216, 180, 169),
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(246, 246, 249),
    panel: Color::Rgb(234, 236, 242),
    accent: Color::Rgb(47, 99, 204),
    warm: Color::Rgb(138, 72, 38),
    highlight: Color::Rgb(25, 90, 110),
    success: Color::Rgb(60, 120, 40),
    danger: Color::Rgb(176, 52, 32),
    text: Color::Rgb(20, 22, 28),
    text_dim: Color::Rgb(60, 64, 74),
    muted: Color::Rgb(120, 126, 140),
    border: Color::Rgb(200, 204, 214),
    bubble_me: Color::Rgb(47, 99, 204),
    bubble_other: Color::Rgb(138, 72, 38),
};

pub fn palette(app: &App) -> Palette {
    if app.theme.is_light() {
        LIGHT
    } else {
        DARK
    }
}

/// Screen regions, shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct Areas {
    pub search: Option<Rect>,
    pub list: Option<Rect>,
    pub status: Option<Rect>,
    pub header: Rect,
    pub messages: Rect,
    pub typing: Rect,
    pub input: Rect,
    pub sheet: Option<Rect>,
}

pub fn layout(area: Rect, app: &App) -> Areas {
    let padded = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let (sidebar, main) = if app.ui.sidebar_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(app.config.sidebar_width), // Sidebar
                Constraint::Length(1),                        // Gap
                Constraint::Min(30),                          // Thread
            ])
            .split(padded);
        (Some(chunks[0]), chunks[2])
    } else {
        (None, padded)
    };

    let (search, list, status) = match sidebar {
        Some(area) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Search
                    Constraint::Min(4),    // Chat list
                    Constraint::Length(4), // Theme + hints
                ])
                .split(area);
            (Some(chunks[0]), Some(chunks[1]), Some(chunks[2]))
        }
        None => (None, None, None),
    };

    // Input grows with content (min 3, max 6)
    let input_width = main.width.saturating_sub(6) as usize;
    let input_lines = if input_width > 0 {
        app.ui.input.width() / input_width + 1
    } else {
        1
    };
    let input_height = (input_lines as u16 + 2).clamp(3, 6);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Header
            Constraint::Min(5),               // Messages
            Constraint::Length(1),            // Typing / toast line
            Constraint::Length(input_height), // Input
        ])
        .split(main);

    let input = chunks[3];
    let sheet = app
        .sheets
        .open()
        .map(|sheet| sheet_rect(sheet, input, main).intersection(area));

    Areas {
        search,
        list,
        status,
        header: chunks[0],
        messages: chunks[1],
        typing: chunks[2],
        input,
        sheet,
    }
}

fn sheet_rect(sheet: SheetId, input: Rect, main: Rect) -> Rect {
    let (width, height) = match sheet {
        SheetId::Attach => (24, sheet.items().len() as u16 + 2),
        SheetId::Emoji => (30, 4),
    };
    let width = width.min(main.width);
    let x = match sheet {
        SheetId::Attach => input.x,
        SheetId::Emoji => input.x + input.width.saturating_sub(width),
    };
    Rect {
        x,
        y: input.y.saturating_sub(height),
        width,
        height,
    }
}

/// Which chat entry sits under a click, if any. Each entry takes two rows.
pub fn chat_at(app: &App, areas: &Areas, column: u16, row: u16) -> Option<ChatId> {
    let list = areas.list?;
    let inner = Block::default().borders(Borders::ALL).inner(list);
    if !inner.contains(Position::new(column, row)) {
        return None;
    }
    let idx = ((row - inner.y) / 2) as usize;
    app.chats.visible().nth(idx).map(|e| e.id)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let p = palette(app);
    let area = frame.area();
    let bg = Block::default().style(Style::default().bg(p.bg));
    frame.render_widget(bg, area);

    let areas = layout(area, app);

    if let (Some(search), Some(list), Some(status)) = (areas.search, areas.list, areas.status) {
        draw_search(frame, app, &p, search);
        draw_chat_list(frame, app, &p, list);
        draw_status(frame, app, &p, status);
    }
    draw_header(frame, app, &p, areas.header);
    draw_messages(frame, app, &p, areas.messages);
    draw_typing(frame, app, &p, areas.typing);
    draw_input(frame, app, &p, areas.input);

    if app.showing_command_popup() {
        draw_command_popup(frame, app, &p, areas.input);
    }
    if let (Some(sheet), Some(rect)) = (app.sheets.open(), areas.sheet) {
        draw_sheet(frame, app, &p, sheet, rect);
    }
    if app.notify_prompt_visible {
        draw_notify_prompt(frame, &p, area);
    }
    if app.ui.show_help {
        draw_help(frame, &p, area);
    }
    if let Some(confirm) = app.confirm {
        draw_confirm(frame, &p, confirm.prompt(), area);
    }
}

fn panel(title: &str, focused: bool, p: &Palette) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(p.text).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { p.accent } else { p.border }))
}

fn draw_search(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let focused = app.ui.focus == Focus::Search;
    let block = panel(" Search ", focused, p);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = if app.ui.search.is_empty() && !focused {
        Line::from(Span::styled(" Ctrl+K to search", Style::default().fg(p.muted)))
    } else {
        let cursor = if focused && app.animation_frame % 30 < 15 { "|" } else { "" };
        Line::from(Span::styled(
            format!(" {}{}", app.ui.search, cursor),
            Style::default().fg(p.text),
        ))
    };
    frame.render_widget(Paragraph::new(line), inner);
}

fn draw_chat_list(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = panel(" Chats ", app.ui.focus == Focus::ChatList, p);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for entry in app.chats.visible() {
        let active = app.chats.active_id() == Some(entry.id);
        let cursor = app.ui.focus == Focus::ChatList && app.ui.list_cursor == Some(entry.id);

        let marker = if active { "▌" } else { " " };
        let title_style = if active {
            Style::default().fg(p.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.text_dim)
        };
        let title_style = if cursor {
            title_style.add_modifier(Modifier::REVERSED)
        } else {
            title_style
        };

        let badge = match entry.unread {
            Unread::Visible(n) => Span::styled(
                format!(" {} ", n),
                Style::default().fg(p.bg).bg(p.accent).add_modifier(Modifier::BOLD),
            ),
            Unread::Fading => Span::styled(" · ", Style::default().fg(p.muted)),
            Unread::Hidden => Span::raw(""),
        };
        let muted = if entry.muted { " 🔕" } else { "" };

        let title_room = width.saturating_sub(2 + badge.width() + muted.width());
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(p.accent)),
            Span::styled(format!("{} ", truncate(&entry.title, title_room)), title_style),
            Span::styled(muted, Style::default().fg(p.muted)),
            badge,
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.activity_label),
            Style::default().fg(p.muted),
        )));
    }
    if lines.is_empty() {
        let text = if app.chats.is_empty() {
            " No chats. Ctrl+N for new."
        } else {
            " No matches"
        };
        lines.push(Line::from(Span::styled(text, Style::default().fg(p.muted))));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_status(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let notify = match app.permission {
        Permission::Granted => "on",
        Permission::Denied => "off",
        Permission::Default => "ask",
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Theme ", Style::default().fg(p.muted)),
            Span::styled(app.theme.label(), Style::default().fg(p.warm).add_modifier(Modifier::BOLD)),
            Span::styled("  Notify ", Style::default().fg(p.muted)),
            Span::styled(notify, Style::default().fg(p.text_dim)),
        ]),
        Line::from(vec![
            Span::styled("^N", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
            Span::styled(" new ", Style::default().fg(p.muted)),
            Span::styled("^T", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
            Span::styled(" theme ", Style::default().fg(p.muted)),
            Span::styled("/", Style::default().fg(p.warm).add_modifier(Modifier::BOLD)),
            Span::styled(" cmds", Style::default().fg(p.muted)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn draw_header(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let nav = if app.ui.sidebar_open { "◀ " } else { "☰ " };
    let mut spans = vec![
        Span::styled(nav, Style::default().fg(p.muted)),
        Span::styled(
            app.header_title().to_string(),
            Style::default().fg(p.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if app.is_recording() {
        spans.push(Span::styled("  ● REC", Style::default().fg(p.danger).add_modifier(Modifier::BOLD)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

/// Greedy word wrap by display width. Overlong words are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let sep = if current.is_empty() { 0 } else { 1 };
        if current.width() + sep + word.width() <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if current.width() + w > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if out.width() + w + 1 > width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

fn pad_left(line: Vec<Span<'static>>, used: usize, width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(width.saturating_sub(used)))];
    spans.extend(line);
    Line::from(spans)
}

/// Transcript as display lines: one name row per group, bubbles under it.
pub fn message_lines(app: &App, p: &Palette, width: usize) -> Vec<Line<'static>> {
    let transcript = app.transcript();
    let bubble_width = (width * 7 / 10).max(10);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut assistant_index = 0;

    for group in message::groups(transcript) {
        let mine = group.origin == Origin::Me;
        let first = &transcript[group.start];
        let name_color = if mine { p.bubble_me } else { p.bubble_other };
        let name = Span::styled(
            first.author.clone(),
            Style::default().fg(name_color).add_modifier(Modifier::BOLD),
        );
        if mine {
            let used = first.author.width();
            lines.push(pad_left(vec![name], used, width));
        } else {
            lines.push(Line::from(vec![Span::styled("◆ ", Style::default().fg(p.warm)), name]));
        }

        for msg in &transcript[group.start..group.start + group.len] {
            let body_style = Style::default().fg(p.text);
            for row in wrap(&msg.text, bubble_width) {
                if mine {
                    let used = row.width() + 2;
                    lines.push(pad_left(
                        vec![
                            Span::styled(row, body_style),
                            Span::styled(" │", Style::default().fg(p.bubble_me)),
                        ],
                        used,
                        width,
                    ));
                } else {
                    lines.push(Line::from(vec![
                        Span::styled("│ ", Style::default().fg(p.bubble_other)),
                        Span::styled(row, body_style),
                    ]));
                }
            }

            if mine {
                let status = format!("{} {}", msg.time_label(), msg.delivery.tick_glyph());
                let used = status.width() + 2;
                let color = if msg.delivery == message::DeliveryState::Read {
                    p.accent
                } else {
                    p.muted
                };
                lines.push(pad_left(
                    vec![Span::styled(status, Style::default().fg(color)), Span::raw("  ")],
                    used,
                    width,
                ));
            } else {
                assistant_index += 1;
                let reaction = match msg.reaction {
                    Reaction::Liked => " 👍",
                    Reaction::Disliked => " 👎",
                    Reaction::None => "",
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {}  #{}", msg.time_label(), assistant_index),
                        Style::default().fg(p.muted),
                    ),
                    Span::styled(reaction, Style::default().fg(p.warm)),
                ]));
            }
        }
        lines.push(Line::from(""));
    }
    lines
}

fn draw_messages(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = panel("", app.ui.focus == Focus::Thread, p);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Rect {
        x: inner.x + 1,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    };

    if app.transcript().is_empty() {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No messages yet",
                Style::default().fg(p.text_dim).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Say hello, or ask about color tokens",
                Style::default().fg(p.muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(welcome, padded);
        return;
    }

    let lines = message_lines(app, p, padded.width as usize);
    let height = padded.height as usize;
    let max_offset = lines.len().saturating_sub(height);
    let offset = app.ui.scroll_offset.min(max_offset);
    let start = lines.len().saturating_sub(height + offset);
    let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
    frame.render_widget(Paragraph::new(visible), padded);

    if offset > 0 {
        let hint = Rect {
            x: padded.x + padded.width.saturating_sub(12),
            y: padded.y + padded.height.saturating_sub(1),
            width: 12.min(padded.width),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("↓ {} more", offset), Style::default().fg(p.muted))),
            hint,
        );
    }
}

fn draw_typing(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let line = if let Some(toast) = app.ui.toast_text() {
        Line::from(Span::styled(
            format!(" {} ", toast),
            Style::default().fg(p.bg).bg(p.success).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
    } else if let Some(label) = app.typing() {
        let dots = ["·  ", "·· ", "···"][(app.animation_frame / 20) % 3];
        Line::from(vec![
            Span::styled(format!(" {} ", dots), Style::default().fg(p.accent)),
            Span::styled(label, Style::default().fg(p.muted).add_modifier(Modifier::ITALIC)),
        ])
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_input(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let focused = app.ui.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { p.accent } else { p.border }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if focused && app.animation_frame % 30 < 15 { "|" } else { " " };
    let mut spans = vec![
        Span::styled(" 📎 ", Style::default().fg(p.muted)),
        Span::styled(format!("{}{}", app.ui.input, cursor), Style::default().fg(p.text)),
    ];
    if app.ui.input.is_empty() && !focused {
        spans[1] = Span::styled("Type a message", Style::default().fg(p.muted));
    }
    let input = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false });
    frame.render_widget(input, inner);
}

fn draw_command_popup(frame: &mut Frame, app: &App, p: &Palette, input: Rect) {
    let filtered = app.get_filtered_commands();
    if filtered.is_empty() {
        return;
    }

    // +1 for the "your input" option, +2 for borders
    let popup_height = (filtered.len() + 3) as u16;
    let popup_area = Rect {
        x: input.x + 2,
        y: input.y.saturating_sub(popup_height),
        width: 44.min(input.width.saturating_sub(4)),
        height: popup_height.min(input.y),
    };

    frame.render_widget(Clear, popup_area);
    let block = Block::default()
        .title(Span::styled(" Commands ", Style::default().fg(p.warm).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.warm))
        .style(Style::default().bg(p.panel));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();
    let input_selected = app.ui.command_selection.is_none();
    let input_style = if input_selected {
        Style::default().fg(p.highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.text_dim)
    };
    let indicator = if input_selected { ">" } else { " " };
    lines.push(Line::from(vec![
        Span::styled(format!("{} {} ", indicator, &app.ui.input), input_style),
        Span::styled("(your input)", Style::default().fg(p.muted).add_modifier(Modifier::ITALIC)),
    ]));

    for (i, (cmd, desc)) in filtered.iter().enumerate() {
        let is_selected = app.ui.command_selection == Some(i);
        let style = if is_selected {
            Style::default().fg(p.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.text_dim)
        };
        let indicator = if is_selected { ">" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!("{} {} ", indicator, cmd), style),
            Span::styled(format!("- {}", desc), Style::default().fg(p.muted)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_sheet(frame: &mut Frame, app: &App, p: &Palette, sheet: SheetId, area: Rect) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(sheet.title(), Style::default().fg(p.warm).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.warm))
        .style(Style::default().bg(p.panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focus = app.sheets.focus();
    let item_style = |i: usize| {
        if i == focus {
            Style::default().fg(p.bg).bg(p.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.text)
        }
    };

    let lines: Vec<Line> = match sheet {
        SheetId::Attach => sheet
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| Line::from(Span::styled(format!(" {} ", item), item_style(i))))
            .collect(),
        SheetId::Emoji => {
            let per_row = 6;
            sheet
                .items()
                .chunks(per_row)
                .enumerate()
                .map(|(row, chunk)| {
                    Line::from(
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(col, e)| Span::styled(format!(" {} ", e), item_style(row * per_row + col)))
                            .collect::<Vec<_>>(),
                    )
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_confirm(frame: &mut Frame, p: &Palette, prompt: &str, area: Rect) {
    let rect = centered(area, 40, 5);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(" Confirm ", Style::default().fg(p.danger).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.danger))
        .style(Style::default().bg(p.panel));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    let lines = vec![
        Line::from(Span::styled(prompt.to_string(), Style::default().fg(p.text))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(p.danger).add_modifier(Modifier::BOLD)),
            Span::styled(" yes   ", Style::default().fg(p.muted)),
            Span::styled("n", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
            Span::styled(" no", Style::default().fg(p.muted)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn draw_notify_prompt(frame: &mut Frame, p: &Palette, area: Rect) {
    let width = 38.min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 4,
    }
    .intersection(area);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(" Notifications ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.panel));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    let lines = vec![
        Line::from(Span::styled("Get notified of new replies?", Style::default().fg(p.text))),
        Line::from(vec![
            Span::styled("F9", Style::default().fg(p.success).add_modifier(Modifier::BOLD)),
            Span::styled(" allow  ", Style::default().fg(p.muted)),
            Span::styled("F10", Style::default().fg(p.danger).add_modifier(Modifier::BOLD)),
            Span::styled(" not now", Style::default().fg(p.muted)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(frame: &mut Frame, p: &Palette, area: Rect) {
    let rect = centered(area, 56, COMMANDS.len() as u16 + 4);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.panel));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let mut lines: Vec<Line> = COMMANDS
        .iter()
        .map(|(cmd, desc)| {
            Line::from(vec![
                Span::styled(format!(" {:<10}", cmd), Style::default().fg(p.warm).add_modifier(Modifier::BOLD)),
                Span::styled(*desc, Style::default().fg(p.text_dim)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Esc to close", Style::default().fg(p.muted))));
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::fake::{FakeClipboard, FakeNotifier};
    use ratatui::{backend::TestBackend, Terminal};

    fn app(dir: &tempfile::TempDir) -> App {
        let config = Config {
            seed: Some(3),
            notify_prompt: false,
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        App::with_platform(config, Box::new(FakeClipboard::default()), Box::new(FakeNotifier::granting()))
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
        assert_eq!(wrap("hello world", 7), vec!["hello", "world"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Design Review", 20), "Design Review");
        assert_eq!(truncate("Design Review", 7), "Design…");
    }

    #[test]
    fn test_draw_shows_header_and_chats() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let screen = render(&app, 120, 40);
        assert!(screen.contains("Design Review"));
        assert!(screen.contains("Mesh Network"));
        assert!(screen.contains("Morning!"));
    }

    #[test]
    fn test_draw_typing_and_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.submit("hello");
        app.toggle_sheet(SheetId::Attach);
        let screen = render(&app, 120, 40);
        assert!(screen.contains("Assistant is typing"));
        assert!(screen.contains("Document"));
    }

    #[test]
    fn test_draw_confirm_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.request_clear();
        let screen = render(&app, 120, 40);
        assert!(screen.contains("Clear all messages in this chat?"));
    }

    #[test]
    fn test_chat_at_maps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let areas = layout(Rect::new(0, 0, 120, 40), &app);
        let list = areas.list.unwrap();
        let second = app.chats.entries()[1].id;
        // border row, then two rows per entry
        assert_eq!(chat_at(&app, &areas, list.x + 2, list.y + 3), Some(second));
        assert_eq!(chat_at(&app, &areas, list.x + 2, list.y), None);
    }

    #[test]
    fn test_overlays_fit_small_terminals() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.notify_prompt_visible = true;
        for sheet in [SheetId::Attach, SheetId::Emoji] {
            app.toggle_sheet(sheet);
            for (w, h) in [(20, 4), (10, 3), (40, 6), (12, 2)] {
                render(&app, w, h);
                let frame = Rect::new(0, 0, w, h);
                let rect = layout(frame, &app).sheet.unwrap();
                assert_eq!(rect.intersection(frame), rect);
            }
            app.sheets.close_all();
        }
    }

    #[test]
    fn test_sidebar_hidden_has_no_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.toggle_sidebar();
        let areas = layout(Rect::new(0, 0, 120, 40), &app);
        assert!(areas.list.is_none());
    }
}
