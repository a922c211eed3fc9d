use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use brewlog_core::{Area, Route};

use crate::app::{App, AppState};

use super::screens::{auth, brewings, coffees, new_brewing};
use super::styles;

const LOGO: [&str; 3] = [
    "   ╔╗ ╦═╗╔═╗╦ ╦╦  ╔═╗╔═╗",
    "   ╠╩╗╠╦╝║╣ ║║║║  ║ ║║ ╦",
    "   ╚═╝╩╚═╚═╝╚╩╝╩═╝╚═╝╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    if app.is_restoring() {
        render_restoring(frame);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_confirm_overlay(
            frame,
            "Are you sure you want to quit?",
            "to quit",
        ),
        AppState::ConfirmingLogout => render_confirm_overlay(
            frame,
            "Log out of Brewlog?",
            "to log out",
        ),
        AppState::ConfirmingDelete(id) => {
            let name = app
                .brewing_by_id(id)
                .map(|b| format!("Delete this {} brewing?", b.coffee_name()))
                .unwrap_or_else(|| "Delete this brewing?".to_string());
            render_confirm_overlay(frame, &name, "to delete")
        }
        _ => {}
    }
}

/// Shown while the stored credential is being read
fn render_restoring(frame: &mut Frame) {
    let area = centered_rect_fixed(36, 7, frame.area());
    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "      Restoring session...",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Brewlog - {}", app.route.title());
    let help_hint = if app.route.area() == Area::Protected {
        "[?] Help"
    } else {
        ""
    };

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.chars().count() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    if app.route.area() == Area::Public {
        return;
    }

    let on_brewings = matches!(
        app.route,
        Route::Brewings | Route::BrewingDetail(_) | Route::NewBrewing
    );
    let tabs = [
        ("[1] Brewings", on_brewings),
        ("[2] Coffees", !on_brewings),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    if app.loading {
        spans.push(Span::styled("   loading...", styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.route {
        Route::Login | Route::Register => auth::render(frame, app, area),
        Route::Brewings => brewings::render(frame, app, area),
        Route::BrewingDetail(id) => brewings::render_detail_page(frame, app, id, area),
        Route::NewBrewing => new_brewing::render(frame, app, area),
        Route::Coffees => coffees::render(frame, app, area),
        Route::CoffeeDetail(id) => coffees::render_detail_page(frame, app, id, area),
    }
}

fn shortcuts_for(app: &App) -> &'static str {
    match app.route {
        Route::Login => "[Tab] next | [Enter] select | [Esc] quit",
        Route::Register => "[Tab] next | [Enter] select | [Esc] back",
        Route::NewBrewing => "[Tab] next | [←/→] adjust | [Esc] cancel",
        Route::Brewings => "[n]ew | [d]elete | [/] search | [u]pdate | [q]uit",
        Route::BrewingDetail(_) => "[d]elete | [Esc] back | [q]uit",
        Route::Coffees => "[Enter] detail | [u]pdate | [q]uit",
        Route::CoffeeDetail(_) => "[Esc] back | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if matches!(app.state, AppState::Searching) {
        format!(" Search: {}▌", app.search_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if !app.search_query.is_empty() {
        format!(" Filter: {} ", app.search_query)
    } else {
        String::new()
    };
    let left_style = if matches!(app.state, AppState::Searching) {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let right_text = format!(" {} ", shortcuts_for(app));

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(format!("          {}", l), styles::title_style())))
        .collect();
    help_text.push(Line::from(Span::styled(
        format!("                  version {}", version),
        styles::muted_style(),
    )));
    help_text.extend([
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1/2", "Brewings / Coffees"),
        help_line("↑/↓ j/k", "Navigate list"),
        help_line("Enter", "Open detail"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Brewings", styles::highlight_style())),
        help_line("n", "New brewing"),
        help_line("d", "Delete brewing"),
        help_line("/", "Search"),
        help_line("t/c/o", "Sort by date/coffee/overall"),
        Line::from(""),
        Line::from(Span::styled(" Session", styles::highlight_style())),
        help_line("u", "Refresh from server"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 9, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(format!("     {}", l), styles::title_style())))
        .collect();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
