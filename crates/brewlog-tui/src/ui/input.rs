//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use brewlog_core::models::BrewingSortColumn;
use brewlog_core::Route;

use crate::app::{App, AppState, Focus, PAGE_SCROLL_SIZE};
use crate::form::{AuthField, AuthMode, BrewingField};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle logout confirmation
    if matches!(app.state, AppState::ConfirmingLogout) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.logout(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle delete confirmation
    if let AppState::ConfirmingDelete(id) = app.state {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.delete_brewing(id),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    // Nothing to interact with until the session is known
    if app.is_restoring() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        return Ok(false);
    }

    // Screens that take text get every key
    match app.route {
        Route::Login | Route::Register => return Ok(handle_auth_input(app, key)),
        Route::NewBrewing => {
            handle_new_brewing_input(app, key);
            return Ok(false);
        }
        _ => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.state = AppState::ConfirmingLogout;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.navigate(Route::Brewings);
            return Ok(false);
        }
        KeyCode::Char('2') => {
            app.navigate(Route::Coffees);
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.status_message = Some("Refreshing...".to_string());
            app.refresh_all();
            return Ok(false);
        }
        _ => {}
    }

    match app.route {
        Route::Brewings => handle_brewings_input(app, key),
        Route::BrewingDetail(_) => handle_brewing_detail_input(app, key),
        Route::Coffees => handle_coffees_input(app, key),
        Route::CoffeeDetail(_) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
                app.go_back();
            }
        }
        Route::Login | Route::Register | Route::NewBrewing => {}
    }
    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.brewing_selection = 0;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.brewing_selection = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.brewing_selection = 0;
        }
        _ => {}
    }
}

/// Login and register forms. Returns true if the app should quit.
fn handle_auth_input(app: &mut App, key: KeyEvent) -> bool {
    let form = &mut app.auth_form;
    match key.code {
        KeyCode::Esc => {
            if form.mode == AuthMode::Register {
                app.go_back();
            } else {
                // Quit if on login screen
                app.state = AppState::Quitting;
                return true;
            }
        }
        KeyCode::Down | KeyCode::Tab => form.next_field(),
        KeyCode::Up | KeyCode::BackTab => form.prev_field(),
        KeyCode::Enter => match form.focus {
            AuthField::Email | AuthField::Password | AuthField::Confirm => form.next_field(),
            AuthField::Submit => app.submit_auth(),
            AuthField::Switch => {
                let target = match form.mode {
                    AuthMode::Login => Route::Register,
                    AuthMode::Register => Route::Login,
                };
                app.navigate(target);
            }
        },
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
    false
}

fn handle_new_brewing_input(app: &mut App, key: KeyEvent) {
    let form = &mut app.brewing_form;
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Down | KeyCode::Tab => form.next_field(),
        KeyCode::Up | KeyCode::BackTab => form.prev_field(),
        KeyCode::Left => form.adjust(false, &app.coffees),
        KeyCode::Right => form.adjust(true, &app.coffees),
        KeyCode::Enter => {
            if form.focus == BrewingField::Submit {
                app.submit_new_brewing();
            } else {
                form.next_field();
            }
        }
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_brewings_input(app: &mut App, key: KeyEvent) {
    let max_index = app.filtered_brewings().len().saturating_sub(1);

    match app.focus {
        Focus::List => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                app.brewing_selection = (app.brewing_selection + 1).min(max_index);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.brewing_selection = app.brewing_selection.saturating_sub(1);
            }
            KeyCode::PageDown => {
                app.brewing_selection = (app.brewing_selection + PAGE_SCROLL_SIZE).min(max_index);
            }
            KeyCode::PageUp => {
                app.brewing_selection = app.brewing_selection.saturating_sub(PAGE_SCROLL_SIZE);
            }
            KeyCode::Home => app.brewing_selection = 0,
            KeyCode::End => app.brewing_selection = max_index,
            KeyCode::Enter => {
                if let Some(id) = app.selected_brewing().map(|b| b.id) {
                    app.navigate(Route::BrewingDetail(id));
                }
            }
            KeyCode::Tab | KeyCode::Right => app.focus = Focus::Detail,
            KeyCode::Char('/') => {
                app.search_query.clear();
                app.state = AppState::Searching;
            }
            KeyCode::Char('n') => app.navigate(Route::NewBrewing),
            KeyCode::Char('d') => app.request_delete(),
            KeyCode::Char('t') => app.toggle_brewing_sort(BrewingSortColumn::Date),
            KeyCode::Char('c') => app.toggle_brewing_sort(BrewingSortColumn::Coffee),
            KeyCode::Char('o') => app.toggle_brewing_sort(BrewingSortColumn::Rating),
            KeyCode::Esc => {
                if !app.search_query.is_empty() {
                    app.search_query.clear();
                    app.brewing_selection = 0;
                }
            }
            _ => {}
        },
        Focus::Detail => match key.code {
            KeyCode::Tab | KeyCode::Left | KeyCode::Esc => app.focus = Focus::List,
            KeyCode::Enter => {
                if let Some(id) = app.selected_brewing().map(|b| b.id) {
                    app.navigate(Route::BrewingDetail(id));
                }
            }
            KeyCode::Char('d') => app.request_delete(),
            _ => {}
        },
    }
}

fn handle_brewing_detail_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('n') => app.navigate(Route::NewBrewing),
        _ => {}
    }
}

fn handle_coffees_input(app: &mut App, key: KeyEvent) {
    let max_index = app.coffees.len().saturating_sub(1);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.coffee_selection = (app.coffee_selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.coffee_selection = app.coffee_selection.saturating_sub(1);
        }
        KeyCode::PageDown => {
            app.coffee_selection = (app.coffee_selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::PageUp => {
            app.coffee_selection = app.coffee_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => app.coffee_selection = 0,
        KeyCode::End => app.coffee_selection = max_index,
        KeyCode::Enter => {
            if let Some(id) = app.selected_coffee().map(|c| c.id) {
                app.navigate(Route::CoffeeDetail(id));
            }
        }
        KeyCode::Char('n') => app.navigate(Route::NewBrewing),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use brewlog_core::auth::MemoryStore;
    use brewlog_core::{ApiClient, Config, SessionHandle, SessionStore};

    use crate::form::AuthForm;

    async fn app_with_token(token: Option<&str>) -> App {
        let store = match token {
            Some(t) => Arc::new(MemoryStore::with_token(t)),
            None => Arc::new(MemoryStore::new()),
        };
        let api = ApiClient::new("http://127.0.0.1:9", SessionHandle::new()).unwrap();
        let session = Arc::new(SessionStore::new(store, api.clone()));
        let mut app = App::new(Config::default(), session, api);
        app.session.restore().await;
        app.apply_guard();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::from(code)).unwrap()
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_typing_fills_login_form() {
        let mut app = app_with_token(None).await;
        app.auth_form = AuthForm::new(AuthMode::Login, String::new());

        type_str(&mut app, "a@b.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "secret");
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.auth_form.email, "a@b.com");
        assert_eq!(app.auth_form.password, "secre");
        assert_eq!(app.auth_form.focus, AuthField::Password);
    }

    #[tokio::test]
    async fn test_q_is_text_on_login_screen() {
        let mut app = app_with_token(None).await;
        app.auth_form = AuthForm::new(AuthMode::Login, String::new());
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.auth_form.email, "q");
    }

    #[tokio::test]
    async fn test_esc_on_login_quits() {
        let mut app = app_with_token(None).await;
        assert!(press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_esc_on_register_returns_to_login() {
        let mut app = app_with_token(None).await;
        app.navigate(Route::Register);
        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn test_keys_ignored_while_restoring() {
        let api = ApiClient::new("http://127.0.0.1:9", SessionHandle::new()).unwrap();
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new()), api.clone()));
        let mut app = App::new(Config::default(), session, api);
        app.auth_form = AuthForm::new(AuthMode::Login, String::new());

        assert!(!press(&mut app, KeyCode::Char('x')));
        assert!(app.auth_form.email.is_empty());
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[tokio::test]
    async fn test_quit_needs_confirmation() {
        let mut app = app_with_token(Some("t")).await;
        assert_eq!(app.route, Route::Brewings);

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);
        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
    }

    #[tokio::test]
    async fn test_search_collects_query() {
        let mut app = app_with_token(Some("t")).await;
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state, AppState::Searching);

        // Global keys are plain text while searching
        type_str(&mut app, "q1");
        assert_eq!(app.search_query, "q1");
        assert_eq!(app.route, Route::Brewings);

        press(&mut app, KeyCode::Esc);
        assert!(app.search_query.is_empty());
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_logout_key_asks_first() {
        let mut app = app_with_token(Some("t")).await;
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.state, AppState::ConfirmingLogout);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.session.handle().is_authenticated());
    }

    #[tokio::test]
    async fn test_new_brewing_form_takes_digits() {
        let mut app = app_with_token(Some("t")).await;
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.route, Route::NewBrewing);

        // Coffee picker, then method
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "V60");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "1x5");
        assert_eq!(app.brewing_form.method, "V60");
        assert_eq!(app.brewing_form.grams, "15");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route, Route::Brewings);
    }
}
