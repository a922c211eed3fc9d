use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use brewlog_core::models::rating::stars;
use brewlog_core::models::CoffeeDetail;
use brewlog_core::utils::{format_date, truncate_string};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_list(frame, app, chunks[0]);
    match app.selected_coffee() {
        Some(coffee) => render_coffee(frame, app, coffee, chunks[1], false),
        None => {
            let block = Block::default()
                .title(" No Coffee Selected ")
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false));
            frame.render_widget(
                Paragraph::new(Span::styled("Select a coffee from the list", styles::muted_style()))
                    .block(block),
                chunks[1],
            );
        }
    }
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .coffees
        .iter()
        .enumerate()
        .map(|(i, coffee)| {
            let brand = coffee.brand_name(&app.brands).unwrap_or("-");
            let line = Line::from(format!(
                " {:<24} {:<16} {:>8}",
                truncate_string(&coffee.name, 24),
                truncate_string(brand, 16),
                coffee.display_price()
            ));
            let style = if i == app.coffee_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Coffees ({}) ", app.coffees.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if items.is_empty() {
        let message = if app.loading { " Loading coffees..." } else { " No coffees in the catalog" };
        frame.render_widget(
            Paragraph::new(Span::styled(message, styles::muted_style())).block(block),
            area,
        );
        return;
    }

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(app.coffee_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Full screen view of one coffee with its brewing history
pub fn render_detail_page(frame: &mut Frame, app: &App, id: i64, area: Rect) {
    match app.coffee_by_id(id) {
        Some(coffee) => render_coffee(frame, app, coffee, area, true),
        None => {
            let block = Block::default()
                .title(" Coffee ")
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true));
            frame.render_widget(
                Paragraph::new(Span::styled("Coffee not found", styles::muted_style())).block(block),
                area,
            );
        }
    }
}

fn render_coffee(frame: &mut Frame, app: &App, coffee: &CoffeeDetail, area: Rect, focused: bool) {
    let brand = coffee
        .coffee_brand_id
        .and_then(|id| app.brands.iter().find(|b| b.id == id));

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<10}", "Brand"), styles::highlight_style()),
            Span::raw(brand.map(|b| b.name.clone()).unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Origin"), styles::highlight_style()),
            Span::raw(brand.map(|b| b.country.clone()).unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Price"), styles::highlight_style()),
            Span::raw(coffee.display_price()),
        ]),
        Line::from(""),
    ];

    let history = app.coffee_history(coffee.id);
    lines.push(Line::from(Span::styled(
        format!("Brewing History ({})", history.len()),
        styles::title_style(),
    )));
    if history.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Not brewed yet",
            styles::muted_style(),
        )));
    }
    for brewing in history {
        let overall = brewing.overall();
        let mut spans = vec![Span::raw(format!(
            "  {:<12} {:<14} {:>8} ",
            format_date(&brewing.created_at),
            truncate_string(&brewing.method, 14),
            brewing.ratio_display()
        ))];
        match overall {
            Some(score) => spans.push(Span::styled(stars(score), styles::score_style(score))),
            None => spans.push(Span::styled("unrated", styles::muted_style())),
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .title(format!(" {} ", coffee.name))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
