//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Screen, TextForm};
use crate::audio::TransportState;
use crate::catalog::Language;
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected / confirm seek");
    map.insert("space/p", "play/pause");
    // H/L is filled dynamically from config.
    map.insert("s", "stop");
    map.insert("[/]", "language");
    map.insert("r", "reload");
    map.insert("i/u", "sign in/up");
    map.insert("o", "sign out");
    map.insert("d", "donate");
    map.insert("q", "quit");
    map
});

/// Render the home controls help text, incorporating the scrub step.
fn controls_text(scrub_step_ms: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "H/L", "s", "[/]", "r", "i/u", "o", "d", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_step_ms / 1000))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn screen_controls(screen: Screen) -> &'static str {
    match screen {
        Screen::Home => "",
        Screen::SignIn => "[tab] next field | [enter] sign in | [ctrl-u] create account | [esc] back",
        Screen::SignUp => "[tab] next field | [enter] sign up | [ctrl-l] have an account | [esc] back",
        Screen::Donation => "[←/→] preset | [0-9] custom amount | [enter] next | [esc] back",
        Screen::Upload => "[tab] next field | [enter] upload | [esc] back",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" nidra ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::Home => draw_home(frame, app, ui_settings, chunks[1]),
        Screen::SignIn | Screen::SignUp => {
            let form = if app.screen == Screen::SignIn {
                &app.sign_in
            } else {
                &app.sign_up
            };
            draw_form(frame, app.screen.title(), form, None, app.busy, chunks[1]);
        }
        Screen::Donation => draw_donation(frame, app, chunks[1]),
        Screen::Upload => {
            let intro = format!("Donating {}. Attach your payment screenshot.", app.upload_amount());
            draw_form(
                frame,
                app.screen.title(),
                &app.upload,
                Some(intro),
                app.busy,
                chunks[1],
            );
        }
    }

    let footer_text = match app.screen {
        Screen::Home => controls_text(controls_settings.scrub_step_ms),
        other => screen_controls(other).to_string(),
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);

    if app.donation_prompt {
        draw_popup(
            frame,
            " welcome ",
            "Your donation keeps these chants free for everyone.\n\nWould you like to donate? [y/n]",
            chunks[1],
        );
    }
    if let Some(alert) = app.alert() {
        let title = format!(" {} ", alert.title);
        let body = format!("{}\n\n[enter] ok", alert.message);
        draw_popup(frame, &title, &body, chunks[1]);
    }
}

fn draw_home(frame: &mut Frame, app: &App, ui_settings: &UiSettings, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(area);

    // Language selector
    let language = app.catalog.language();
    let mut parts: Vec<Span> = Language::ALL
        .iter()
        .map(|&l| {
            if l == language {
                Span::from(format!(" {} ", l.label())).reversed()
            } else {
                Span::from(format!(" {} ", l.label()))
            }
        })
        .collect();
    if app.catalog.is_loading() {
        parts.push(Span::from(format!("  loading {}…", app.catalog.requested().label())).italic());
    }
    let account = if app.signed_in() {
        "signed in"
    } else {
        "guest"
    };
    let selector = Paragraph::new(Line::from(parts)).block(
        Block::bordered()
            .padding(left_pad())
            .title(" language ")
            .title_bottom(Line::from(format!(" {account} ")).right_aligned()),
    );
    frame.render_widget(selector, rows[0]);

    // Chant list
    let active = app.active_track();
    let items: Vec<ListItem> = app
        .catalog
        .tracks()
        .iter()
        .map(|track| {
            if Some(track.name.as_str()) == active {
                ListItem::new(format!("♪ {}", track.name)).bold()
            } else {
                ListItem::new(format!("  {}", track.name))
            }
        })
        .collect();
    let empty = app.catalog.is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(app.screen.title()))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, rows[1], &mut state);
    if empty && !app.catalog.is_loading() {
        let hint = Paragraph::new("No chants for this language.")
            .alignment(Alignment::Center)
            .italic();
        frame.render_widget(hint, centered_rect_sized(40, 5, rows[1]));
    }

    draw_player(frame, app, ui_settings, rows[2]);
}

fn draw_player(frame: &mut Frame, app: &App, ui_settings: &UiSettings, area: Rect) {
    let transport = &app.transport;
    let title = match transport.track() {
        Some(name) => format!(" {} • {} ", transport.state().label(), name),
        None => format!(" {} ", transport.state().label()),
    };

    let mut label = transport.time_text(&ui_settings.time_fields, &ui_settings.time_separator);
    if transport.seek_in_flight() {
        label.push_str("  (seeking)");
    }
    let gauge = Gauge::default()
        .block(Block::bordered().padding(left_pad()).title(title))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(transport.ratio())
        .label(label);

    if transport.state() == TransportState::Loading {
        let loading = Paragraph::new("Loading chant…")
            .italic()
            .block(Block::bordered().padding(left_pad()).title(" Loading "));
        frame.render_widget(loading, area);
    } else {
        frame.render_widget(gauge, area);
    }
}

fn draw_form(
    frame: &mut Frame,
    title: &str,
    form: &TextForm,
    intro: Option<String>,
    busy: bool,
    area: Rect,
) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(intro) = intro {
        lines.push(Line::from(intro));
        lines.push(Line::default());
    }
    for (i, field) in form.fields().iter().enumerate() {
        let value = if field.secret {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let focused = i == form.focus();
        let marker = if focused { "> " } else { "  " };
        let mut line = Line::from(vec![
            Span::from(format!("{marker}{:<16}", field.label)),
            Span::from(value),
        ]);
        if focused {
            line = line.bold();
            line.push_span(Span::from("_").slow_blink());
        }
        lines.push(line);
    }
    if busy {
        lines.push(Line::default());
        lines.push(Line::from("Please wait…").italic());
    }

    let body = Paragraph::new(lines)
        .block(Block::bordered().padding(left_pad()).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(body, area);
}

fn draw_donation(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.donation;
    let presets: Vec<Span> = form
        .presets()
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            if form.selected() == Some(i) {
                Span::from(format!(" [{amount}] ")).reversed()
            } else {
                Span::from(format!("  {amount}  "))
            }
        })
        .collect();

    let custom = if form.custom().is_empty() {
        Span::from("(type an amount)").italic()
    } else {
        Span::from(format!("{}rs", form.custom())).bold()
    };
    let lines = vec![
        Line::from("Choose an amount to donate:"),
        Line::default(),
        Line::from(presets),
        Line::default(),
        Line::from(vec![Span::from("Custom amount: "), custom]),
    ];
    let body = Paragraph::new(lines)
        .block(Block::bordered().padding(left_pad()).title(app.screen.title()))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn draw_popup(frame: &mut Frame, title: &str, body: &str, area: Rect) {
    let width = body
        .lines()
        .map(|l| l.chars().count() as u16)
        .max()
        .unwrap_or(20)
        .saturating_add(6)
        .max(title.chars().count() as u16 + 4);
    let height = body.lines().count() as u16 + 2;
    let popup_area = centered_rect_sized(width.min(72), height, area);
    frame.render_widget(Clear, popup_area);

    let popup = Paragraph::new(body.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
