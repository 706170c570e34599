use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use super::app::{App, AppMode, ComposeField, SettingsField};
use crate::core::{data_uri, GeneratedImage};
use crate::studio::View;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Settings => draw_settings(frame, app),
        _ => draw_studio(frame, app),
    }
}

fn draw_studio(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title and tabs
            Constraint::Min(10),    // Active view
            Constraint::Length(3),  // Input or status bar
            Constraint::Length(2),  // Help line
        ])
        .split(frame.area());

    draw_title(frame, app, chunks[0]);

    match app.studio.view() {
        View::Compose => draw_compose(frame, app, chunks[1]),
        View::Preview => draw_preview(frame, app, chunks[1]),
        View::History => draw_history(frame, app, chunks[1]),
    }

    match app.mode {
        AppMode::EditPrompt | AppMode::EditImagePath => draw_input(frame, app, chunks[2]),
        _ => draw_status(frame, app, chunks[2]),
    }

    draw_help(frame, app, chunks[3]);
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(20)])
        .split(area);

    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "P2L Studio",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Memory over marketing", Style::default().fg(Color::Gray)),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(title, chunks[0]);

    let views = [View::Compose, View::Preview, View::History];
    let selected = views.iter().position(|v| *v == app.studio.view()).unwrap_or(0);
    let titles: Vec<Line> = views
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let label = match v {
                View::History => format!("{} {} ({})", i + 1, v.label(), app.studio.history().len()),
                _ => format!("{} {}", i + 1, v.label()),
            };
            Line::from(label)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[1]);
}

fn compose_value(app: &App, field: ComposeField) -> String {
    let settings = app.studio.settings();
    match field {
        ComposeField::Style => format!("◀ {} ▶", settings.style),
        ComposeField::Prompt if settings.prompt.is_empty() => {
            "(describe a memory, a place, a feeling)".to_string()
        }
        ComposeField::Prompt => settings.prompt.clone(),
        ComposeField::SourceImage => match &settings.source_image {
            Some(uri) => format!(
                "{} attached",
                data_uri::mime_type(uri).unwrap_or("image")
            ),
            None => "(none)".to_string(),
        },
        ComposeField::Lighting => level_bar(settings.lighting),
        ComposeField::Complexity => level_bar(settings.complexity),
        ComposeField::AspectRatio => format!("◀ {} ▶", settings.aspect_ratio),
        ComposeField::Quality => {
            let note = if settings.tier().is_high() { "  (paid key)" } else { "" };
            format!("◀ {} ▶{}", settings.quality, note)
        }
    }
}

fn level_bar(level: u8) -> String {
    let filled = usize::from(level.min(10));
    format!("{}{} {}/10", "█".repeat(filled), "░".repeat(10 - filled), level)
}

fn draw_compose(frame: &mut Frame, app: &App, area: Rect) {
    let fields = ComposeField::all();
    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = i == app.compose_selected;
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<20}", field.label()),
                    if is_selected {
                        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
                Span::styled(compose_value(app, *field), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let title = if app.studio.can_submit() {
        "Compose (g: Visualize)"
    } else {
        "Compose"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default().with_selected(Some(app.compose_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn image_lines<'a>(image: &'a GeneratedImage, app: &App) -> Vec<Line<'a>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);
    let heading = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let settings = &image.settings;

    let mut lines = vec![
        Line::from(vec![
            Span::styled(settings.style.name(), heading),
            Span::styled(format!(" • {}", settings.quality), label),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", label),
            Span::styled(image.id.as_str(), value),
        ]),
        Line::from(vec![
            Span::styled("Created: ", label),
            Span::styled(image.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Format: ", label),
            Span::styled(
                format!("{} ({} KB)", image.mime_type(), image.byte_len() / 1024),
                value,
            ),
        ]),
        Line::from(vec![
            Span::styled("Aspect Ratio: ", label),
            Span::styled(settings.aspect_ratio.as_str(), value),
        ]),
        Line::from(vec![
            Span::styled("Tone: ", label),
            Span::styled(
                format!("lighting {}/10, complexity {}/10", settings.lighting, settings.complexity),
                value,
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("Master Prompt", heading)),
        Line::from(Span::styled(
            if image.prompt.is_empty() {
                "(from source image)"
            } else {
                image.prompt.as_str()
            },
            value,
        )),
    ];

    if let Some(path) = &app.last_saved {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Saved: ", label),
            Span::styled(path.display().to_string(), Style::default().fg(Color::Green)),
        ]));
    }

    lines
}

fn draw_preview(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Preview");

    let lines = if app.studio.is_generating() {
        vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    SPINNER[app.tick % SPINNER.len()],
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    " WEAVING PIXELS...",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("Rendering {}", app.studio.settings().style),
                Style::default().fg(Color::Gray),
            )),
        ]
    } else if let Some(image) = app.studio.last_generated() {
        image_lines(image, app)
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Ready to visualize",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Compose a scene and press g.",
                Style::default().fg(Color::Gray),
            )),
        ]
    };

    let preview = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(preview, area);
}

fn draw_history(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.studio.history();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Archives ({})", history.len()));

    if history.is_empty() {
        let empty = Paragraph::new("The gallery is waiting for your first spark of genius.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let content = Line::from(vec![
                Span::styled(
                    format!("{:<22}", image.settings.style.name()),
                    if i == app.history_selected {
                        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
                Span::styled(
                    format!("{:<9}", image.settings.quality.as_str()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    image.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(image.prompt_preview(50), Style::default().fg(Color::White)),
            ]);

            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(Some(app.history_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.mode {
        AppMode::EditImagePath => "Source image path (Enter to load, Esc to cancel)",
        _ => "Scene description (Enter to keep, Esc to cancel)",
    };

    let input = Paragraph::new(app.input.text.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        );
    frame.render_widget(input, area);

    // Show cursor
    frame.set_cursor_position((
        area.x + app.input.cursor as u16 + 1,
        area.y + 1,
    ));
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (message, style, title) = if let Some(err) = app.studio.error() {
        (err.to_string(), Style::default().fg(Color::Red), "Error (e: Dismiss)")
    } else if app.studio.is_generating() {
        (
            format!("{} Weaving pixels...", SPINNER[app.tick % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
            "Status",
        )
    } else if let Some(status) = &app.status_message {
        (status.clone(), Style::default().fg(Color::Green), "Status")
    } else {
        ("Ready".to_string(), Style::default().fg(Color::Gray), "Status")
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match (app.mode, app.studio.view()) {
        (AppMode::EditPrompt, _) | (AppMode::EditImagePath, _) => "Enter: Confirm | Esc: Cancel",
        (_, View::Compose) => {
            "↑↓: Field | ←→: Adjust | Enter/i: Edit prompt | u: Upload | x: Clear image | g: Visualize | 1-3: Views | s: Settings | q: Quit"
        }
        (_, View::Preview) => "d: Download | c: Create another | 1-3: Views | s: Settings | q: Quit",
        (_, View::History) => "↑↓: Select | Enter: Restore | w: Wipe archive | 1-3: Views | q: Quit",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Draw settings screen
fn draw_settings(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Settings list
            Constraint::Length(3),  // Status
            Constraint::Length(2),  // Help
        ])
        .split(area);

    // Header
    let header = Paragraph::new("Settings")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    // Settings list
    let fields = SettingsField::all();
    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = i == app.settings_selected;
            let value = if app.settings_editing && is_selected {
                let shown = if field.is_secret() {
                    "*".repeat(app.settings_edit_buffer.chars().count())
                } else {
                    app.settings_edit_buffer.clone()
                };
                format!("{}▏", shown)
            } else {
                app.get_settings_value(field)
            };

            let has_options = app.get_settings_options(field).is_some();
            let hint = if has_options { " [←→]" } else { "" };

            let content = Line::from(vec![
                Span::styled(
                    format!("{:<24}", field.label()),
                    if is_selected {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
                Span::styled(
                    format!("{}{}", value, hint),
                    if is_selected && app.settings_editing {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::Gray)
                    },
                ),
            ]);

            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_widget(list, chunks[1]);

    // Status
    draw_status(frame, app, chunks[2]);

    // Help
    let help_text = if app.settings_editing {
        "Enter: Save | Esc: Cancel"
    } else {
        "↑↓: Navigate | Enter/Space: Edit/Toggle | Esc/q: Back"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
