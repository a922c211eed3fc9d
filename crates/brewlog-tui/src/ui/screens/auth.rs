use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::form::{AuthField, AuthForm, AuthMode};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Visible width of an input box
const FIELD_WIDTH: usize = 24;

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    // Show the tail of long input so the cursor stays in view
    let shown: String = {
        let count = value.chars().count();
        value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:>9}: [", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn masked(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

fn button_line<'a>(label: &'a str, focused: bool) -> Line<'a> {
    if focused {
        Line::from(vec![
            Span::raw("             ["),
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style()),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("             ["),
            Span::styled(format!("   {}   ", label), styles::list_item_style()),
            Span::raw("]"),
        ])
    }
}

/// Login or register form, centered in `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form: &AuthForm = &app.auth_form;
    let register = form.mode == AuthMode::Register;

    let mut height = if register { 13 } else { 12 };
    if form.error.is_some() {
        height += 2;
    }
    let dialog = centered_rect_fixed(46, height, area);

    // Clear the area
    frame.render_widget(Clear, dialog);

    let heading = if register { "Create your account" } else { "Log in to your journal" };
    let mut lines = vec![
        Line::from(Span::styled(format!("  {}", heading), styles::title_style())),
        Line::from(""),
        field_line("Email", form.email.clone(), form.focus == AuthField::Email),
        field_line("Password", masked(&form.password), form.focus == AuthField::Password),
    ];
    if register {
        lines.push(field_line(
            "Confirm",
            masked(&form.confirm),
            form.focus == AuthField::Confirm,
        ));
    }

    lines.push(Line::from(""));
    let submit_label = match (form.mode, form.submitting) {
        (_, true) => "  Wait  ",
        (AuthMode::Login, false) => " Log In ",
        (AuthMode::Register, false) => "Register",
    };
    lines.push(button_line(submit_label, form.focus == AuthField::Submit));

    lines.push(Line::from(""));
    let switch_label = if register {
        "Already registered? Log in"
    } else {
        "No account? Register"
    };
    let switch_style = if form.focus == AuthField::Switch {
        styles::selected_style()
    } else {
        styles::highlight_style()
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(switch_label, switch_style),
    ]));

    // Error message
    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let title = if register { " Register " } else { " Log In " };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}
