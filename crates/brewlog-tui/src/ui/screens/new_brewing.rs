use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use brewlog_core::models::rating::stars;

use crate::app::App;
use crate::form::{BrewingField, NewBrewingForm};
use crate::ui::styles;

/// Visible width of a text input
const FIELD_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_rating(frame, &app.brewing_form, chunks[1]);
}

fn coffee_label(app: &App) -> String {
    let form = &app.brewing_form;
    if app.coffees.is_empty() {
        return if app.loading {
            "loading catalog...".to_string()
        } else {
            "no coffees in the catalog".to_string()
        };
    }
    match form.selected_coffee(&app.coffees) {
        Some(coffee) => match coffee.brand_name(&app.brands) {
            Some(brand) => format!("◀ {} ({}) ▶", coffee.name, brand),
            None => format!("◀ {} ▶", coffee.name),
        },
        None => "◀ choose with ←/→ ▶".to_string(),
    }
}

fn input_line(label: &'static str, value: &str, focused: bool) -> Line<'static> {
    let count = value.chars().count();
    let shown: String = value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect();
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled(format!("  {:>11}: ", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
    ])
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.brewing_form;
    let mut lines = vec![Line::from("")];

    lines.push(Line::from(vec![
        Span::styled(format!("  {:>11}: ", BrewingField::Coffee.label()), styles::muted_style()),
        Span::styled(
            coffee_label(app),
            styles::field_style(form.focus == BrewingField::Coffee),
        ),
    ]));

    for field in BrewingField::ORDER {
        if let Some(value) = form.text(field) {
            lines.push(input_line(field.label(), value, form.focus == field));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Latitude and longitude are optional; give both or neither.",
        styles::muted_style(),
    )));
    lines.push(Line::from(""));

    let submit_focused = form.focus == BrewingField::Submit;
    let label = if form.submitting { "Saving..." } else { BrewingField::Submit.label() };
    if submit_focused {
        lines.push(Line::from(vec![
            Span::raw("               ["),
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style()),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("               ["),
            Span::styled(format!("   {}   ", label), styles::list_item_style()),
            Span::raw("]"),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" New Brewing ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(!matches!(form.focus, BrewingField::Score(_))));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_rating(frame: &mut Frame, form: &NewBrewingForm, area: Rect) {
    let mut lines = vec![Line::from("")];

    for field in BrewingField::ORDER {
        if let BrewingField::Score(dimension) = field {
            let score = form.scores.get(dimension);
            let focused = form.focus == field;
            let marker = if focused { "▶ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}{:<12}", marker, dimension.label()),
                    styles::field_style(focused),
                ),
                Span::styled(stars(score), styles::score_style(score)),
                Span::styled(format!(" {}", score), styles::muted_style()),
            ]));
        }
    }

    let overall = form.overall_preview();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<12}", "Overall"), styles::success_style()),
        Span::styled(stars(overall), styles::score_style(overall)),
        Span::styled(format!(" {}", overall), styles::success_style()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ←/→ or 1-5 to score",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Rating ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(matches!(form.focus, BrewingField::Score(_))));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
