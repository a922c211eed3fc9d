use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use brewlog_core::models::rating::stars;
use brewlog_core::models::{Brewing, RatingDimension};
use brewlog_core::utils::{format_coordinates, format_date, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_preview(frame, app, chunks[1]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let brewings = app.filtered_brewings();
    let sort_marker = if app.brewing_sort_ascending { "▲" } else { "▼" };

    let header = Line::from(Span::styled(
        format!(
            " {:<12} {:<22} {:<12} {:>7}",
            "Date", "Coffee", "Method", "Overall"
        ),
        styles::muted_style(),
    ));

    let items: Vec<ListItem> = brewings
        .iter()
        .enumerate()
        .map(|(i, brewing)| {
            let overall = brewing
                .overall()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string());
            let line = Line::from(format!(
                " {:<12} {:<22} {:<12} {:>7}",
                format_date(&brewing.created_at),
                truncate_string(brewing.coffee_name(), 22),
                truncate_string(&brewing.method, 12),
                overall
            ));

            let style = if i == app.brewing_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let focused = matches!(app.focus, Focus::List);
    let title = format!(
        " Brewings ({}) - by {} {} ",
        brewings.len(),
        app.brewing_sort_column.label(),
        sort_marker
    );
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(header), parts[0]);

    if items.is_empty() {
        let message = if app.loading {
            "Loading brewings..."
        } else if !app.search_query.is_empty() {
            "No brewings match the search"
        } else {
            "No brewings yet. Press [n] to log one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", message), styles::muted_style())),
            parts[1],
        );
        return;
    }

    let list = List::new(items);
    let mut state = ListState::default();
    state.select(Some(app.brewing_selection));
    frame.render_stateful_widget(list, parts[1], &mut state);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let (title, content) = match app.selected_brewing() {
        Some(brewing) => (format!(" {} ", brewing.coffee_name()), detail_lines(brewing)),
        None => (
            " No Brewing Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a brewing from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Full screen view of one brewing
pub fn render_detail_page(frame: &mut Frame, app: &App, id: i64, area: Rect) {
    let (title, content) = match app.brewing_by_id(id) {
        Some(brewing) => (format!(" {} ", brewing.coffee_name()), detail_lines(brewing)),
        None => (
            " Brewing ".to_string(),
            vec![Line::from(Span::styled(
                if app.loading { "Loading..." } else { "Brewing not found" },
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn labeled(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::highlight_style()),
        Span::raw(value),
    ])
}

fn detail_lines(brewing: &Brewing) -> Vec<Line<'static>> {
    let mut lines = vec![
        labeled("Brand", brewing.brand_name().unwrap_or("-").to_string()),
        labeled("Method", brewing.method.clone()),
        labeled(
            "Dose",
            format!(
                "{}g coffee / {}ml water ({})",
                brewing.grams,
                brewing.ml,
                brewing.ratio_display()
            ),
        ),
        labeled("Brewed", format_date(&brewing.created_at)),
    ];

    if let Some(ref location) = brewing.location {
        lines.push(labeled("Location", location.clone()));
    }
    if let Some((lat, lon)) = brewing.coordinates() {
        lines.push(labeled("Coordinates", format_coordinates(lat, lon)));
    }

    lines.push(Line::from(""));
    match brewing.rating {
        Some(ref rating) => {
            lines.push(Line::from(Span::styled("Rating", styles::title_style())));
            let scores = rating.scores();
            for dimension in RatingDimension::ALL {
                let score = scores.get(dimension);
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<12}", dimension.label()), styles::muted_style()),
                    Span::styled(stars(score), styles::score_style(score)),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", "Overall"), styles::highlight_style()),
                Span::styled(stars(rating.overall), styles::score_style(rating.overall)),
                Span::raw(format!(" {}/5", rating.overall)),
            ]));
        }
        None => lines.push(Line::from(Span::styled("Not rated", styles::muted_style()))),
    }

    if let Some(ref notes) = brewing.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes", styles::title_style())));
        lines.push(Line::from(notes.clone()));
    }

    lines
}
