//! Application state management for Brewlog.
//!
//! This module contains the core `App` struct that manages all application state,
//! including UI state, fetched data, session actions, and background task coordination.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use brewlog_core::config::{ENV_EMAIL, ENV_PASSWORD};
use brewlog_core::models::{Brewing, BrewingSortColumn, CoffeeBrand, CoffeeDetail};
use brewlog_core::utils::contains_ignore_case;
use brewlog_core::{
    ApiClient, ApiError, Area, Config, GuardPhase, Route, RoutingGuard, SessionError, SessionStore,
};

use crate::form::{AuthForm, AuthMode, NewBrewingForm};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const SESSION_ENDED: &str = "Your session has ended. Please log in again.";

// ============================================================================
// UI State Types
// ============================================================================

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingDelete(i64),
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks through the MPSC channel.
enum TaskResult {
    Brewings(Vec<Brewing>),
    Catalog(Vec<CoffeeDetail>, Vec<CoffeeBrand>),
    BrewingCreated(Brewing),
    CreateFailed(String),
    BrewingDeleted(i64),
    LoginFinished(Result<(), SessionError>),
    /// Carries the email the account was created for
    RegisterFinished(Result<String, SessionError>),
    LogoutFinished(Result<(), SessionError>),
    /// A background fetch failed; carries the text for the status bar
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    guard: RoutingGuard,

    // UI State
    pub route: Route,
    pub state: AppState,
    pub focus: Focus,
    pub search_query: String,
    pub brewing_sort_column: BrewingSortColumn,
    pub brewing_sort_ascending: bool,

    // Forms
    pub auth_form: AuthForm,
    pub brewing_form: NewBrewingForm,

    // Selection indices
    pub brewing_selection: usize,
    pub coffee_selection: usize,

    // Fetched data
    pub brewings: Vec<Brewing>,
    pub coffees: Vec<CoffeeDetail>,
    pub brands: Vec<CoffeeBrand>,
    pub loading: bool,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Status message
    pub status_message: Option<String>,

    /// Set while a user-initiated logout is running, so the redirect to
    /// login is not reported as an expired session
    logging_out: bool,
}

impl App {
    /// Create the application around an existing session. The session is
    /// normally still restoring at this point.
    pub fn new(config: Config, session: Arc<SessionStore>, api: ApiClient) -> Self {
        let guard = RoutingGuard::new(session.handle());
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let email = std::env::var(ENV_EMAIL)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let mut auth_form = AuthForm::new(AuthMode::Login, email);
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            auth_form.password = password;
        }

        Self {
            config,
            session,
            api,
            guard,

            route: Route::Login,
            state: AppState::Normal,
            focus: Focus::List,
            search_query: String::new(),
            brewing_sort_column: BrewingSortColumn::Date,
            brewing_sort_ascending: false,

            auth_form,
            brewing_form: NewBrewingForm::default(),

            brewing_selection: 0,
            coffee_selection: 0,

            brewings: Vec::new(),
            coffees: Vec::new(),
            brands: Vec::new(),
            loading: false,

            task_rx: rx,
            task_tx: tx,

            status_message: None,
            logging_out: false,
        }
    }

    /// True until the stored credential has been read
    pub fn is_restoring(&self) -> bool {
        self.guard.phase() == GuardPhase::Restoring
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Let the routing guard correct the current screen. Called every pass
    /// of the main loop. Returns true if the screen changed.
    pub fn apply_guard(&mut self) -> bool {
        match self.guard.check(self.route) {
            Some(target) => {
                self.on_redirect(target);
                true
            }
            None => false,
        }
    }

    fn on_redirect(&mut self, target: Route) {
        if target == Route::Login {
            // Only a session that was in use can end
            let was_signed_in = self.route.area() == Area::Protected;
            if was_signed_in && !self.logging_out {
                self.status_message = Some(SESSION_ENDED.to_string());
            }
            self.logging_out = false;
            self.clear_data();
            let email = self.config.last_email.clone().unwrap_or_default();
            self.auth_form = AuthForm::new(AuthMode::Login, email);
        } else {
            self.auth_form.clear_secrets();
            self.auth_form.submitting = false;
        }
        self.navigate(target);
    }

    /// Show `route`, loading whatever it needs.
    pub fn navigate(&mut self, route: Route) {
        debug!(from = ?self.route, to = ?route, "Navigate");
        let entering_protected = self.route.area() != route.area();
        self.route = route;
        self.focus = Focus::List;
        self.state = AppState::Normal;

        match route {
            Route::Login => {
                if self.auth_form.mode != AuthMode::Login {
                    self.auth_form.switch_to(AuthMode::Login);
                }
            }
            Route::Register => {
                if self.auth_form.mode != AuthMode::Register {
                    self.auth_form.switch_to(AuthMode::Register);
                }
            }
            Route::NewBrewing => {
                self.brewing_form = NewBrewingForm::default();
                if self.coffees.is_empty() {
                    self.refresh_catalog();
                }
            }
            Route::Brewings | Route::Coffees => {
                if entering_protected {
                    self.refresh_all();
                }
            }
            Route::BrewingDetail(_) | Route::CoffeeDetail(_) => {}
        }
    }

    /// Leave a detail or form screen for its list.
    pub fn go_back(&mut self) {
        let parent = match self.route {
            Route::BrewingDetail(_) | Route::NewBrewing => Route::Brewings,
            Route::CoffeeDetail(_) => Route::Coffees,
            Route::Register => Route::Login,
            other => other,
        };
        if parent != self.route {
            self.navigate(parent);
        }
    }

    fn clear_data(&mut self) {
        self.brewings.clear();
        self.coffees.clear();
        self.brands.clear();
        self.brewing_selection = 0;
        self.coffee_selection = 0;
        self.search_query.clear();
        self.loading = false;
    }

    // =========================================================================
    // Session actions
    // =========================================================================

    /// Submit the login or register form.
    pub fn submit_auth(&mut self) {
        if self.auth_form.submitting {
            return;
        }
        let (email, password) = match self.auth_form.validate() {
            Ok(creds) => creds,
            Err(message) => {
                self.auth_form.error = Some(message.to_string());
                return;
            }
        };

        self.auth_form.error = None;
        self.auth_form.submitting = true;
        self.status_message = None;

        let session = Arc::clone(&self.session);
        match self.auth_form.mode {
            AuthMode::Login => {
                self.config.last_email = Some(email.clone());
                self.spawn_task(async move {
                    TaskResult::LoginFinished(session.login(&email, &password).await)
                });
            }
            AuthMode::Register => {
                self.spawn_task(async move {
                    let result = session.register(&email, &password).await.map(|_| email);
                    TaskResult::RegisterFinished(result)
                });
            }
        }
    }

    pub fn logout(&mut self) {
        self.state = AppState::Normal;
        self.logging_out = true;
        self.status_message = Some("Logging out...".to_string());
        let session = Arc::clone(&self.session);
        self.spawn_task(async move { TaskResult::LogoutFinished(session.logout().await) });
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Reload the brewing list and the coffee catalog together.
    pub fn refresh_all(&mut self) {
        self.loading = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let (brewings, coffees, brands) = futures::join!(
                api.list_brewings(),
                api.list_coffees(None),
                api.list_coffee_brands()
            );
            Self::send_fetch_result(&tx, "Brewings", brewings, TaskResult::Brewings).await;
            let catalog = coffees.and_then(|c| brands.map(|b| (c, b)));
            Self::send_fetch_result(&tx, "Coffees", catalog, |(c, b)| TaskResult::Catalog(c, b))
                .await;
        });
    }

    pub fn refresh_brewings(&mut self) {
        self.loading = true;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.list_brewings().await;
            Self::send_fetch_result(&tx, "Brewings", result, TaskResult::Brewings).await;
        });
    }

    pub fn refresh_catalog(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let (coffees, brands) = futures::join!(api.list_coffees(None), api.list_coffee_brands());
            let result = coffees.and_then(|c| brands.map(|b| (c, b)));
            Self::send_fetch_result(&tx, "Coffees", result, |(c, b)| TaskResult::Catalog(c, b))
                .await;
        });
    }

    /// Validate the new brewing form and send it.
    pub fn submit_new_brewing(&mut self) {
        if self.brewing_form.submitting {
            return;
        }
        let brewing = match self.brewing_form.validate(&self.coffees) {
            Ok(b) => b,
            Err(message) => {
                self.brewing_form.error = Some(message);
                return;
            }
        };

        self.brewing_form.error = None;
        self.brewing_form.submitting = true;
        let api = self.api.clone();
        self.spawn_task(async move {
            match api.create_brewing(&brewing).await {
                Ok(created) => TaskResult::BrewingCreated(created),
                Err(e) => {
                    error!(error = %e, "Create brewing failed");
                    TaskResult::CreateFailed(e.user_message("Failed to create brewing"))
                }
            }
        });
    }

    /// Ask before deleting the selected (or shown) brewing.
    pub fn request_delete(&mut self) {
        let id = match self.route {
            Route::BrewingDetail(id) => Some(id),
            _ => self.selected_brewing().map(|b| b.id),
        };
        if let Some(id) = id {
            self.state = AppState::ConfirmingDelete(id);
        }
    }

    pub fn delete_brewing(&mut self, id: i64) {
        self.state = AppState::Normal;
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_brewing(id).await.map(|_| id);
            Self::send_fetch_result(&tx, "Delete", result, TaskResult::BrewingDeleted).await;
        });
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            Self::send_result(&tx, result).await;
        });
    }

    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Helper to send a fetch result with consistent error handling
    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<TaskResult>,
        name: &str,
        result: Result<T, ApiError>,
        wrapper: F,
    ) where
        F: FnOnce(T) -> TaskResult,
    {
        match result {
            Ok(data) => {
                debug!("{} fetched successfully", name);
                Self::send_result(tx, wrapper(data)).await;
            }
            Err(e) => {
                error!(error = %e, "{} request failed", name);
                let message = if e.is_unauthorized() {
                    SESSION_ENDED.to_string()
                } else {
                    format!("{}: {}", name, e.user_message("request failed"))
                };
                Self::send_result(tx, TaskResult::Error(message)).await;
            }
        }
    }

    /// Apply every result that has arrived since the last pass.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        let authenticated = self.session.handle().is_authenticated();
        match result {
            TaskResult::Brewings(data) => {
                self.loading = false;
                // A fetch that outlived the session must not repopulate the lists
                if authenticated {
                    self.brewings = data;
                    self.clamp_selections();
                }
            }
            TaskResult::Catalog(coffees, brands) => {
                if authenticated {
                    self.coffees = coffees;
                    self.brands = brands;
                    self.clamp_selections();
                }
            }
            TaskResult::BrewingCreated(brewing) => {
                info!(id = brewing.id, "Brewing created");
                self.brewing_form.submitting = false;
                self.brewings.insert(0, brewing);
                self.navigate(Route::Brewings);
                self.brewing_selection = 0;
                self.status_message = Some("Brewing saved".to_string());
            }
            TaskResult::CreateFailed(message) => {
                self.brewing_form.submitting = false;
                self.brewing_form.error = Some(message);
            }
            TaskResult::BrewingDeleted(id) => {
                info!(id, "Brewing deleted");
                self.brewings.retain(|b| b.id != id);
                self.clamp_selections();
                if self.route == Route::BrewingDetail(id) {
                    self.navigate(Route::Brewings);
                }
                self.status_message = Some("Brewing deleted".to_string());
            }
            TaskResult::LoginFinished(result) => {
                self.auth_form.submitting = false;
                match result {
                    Ok(()) => {
                        self.auth_form.clear_secrets();
                        if let Err(e) = self.config.save() {
                            warn!(error = %e, "Failed to save config");
                        }
                    }
                    // A newer session change already decided the outcome
                    Err(SessionError::Superseded) => {}
                    Err(e) => {
                        warn!(error = %e, "Login failed");
                        self.auth_form.error = Some(e.to_string());
                    }
                }
            }
            TaskResult::RegisterFinished(result) => {
                self.auth_form.submitting = false;
                match result {
                    Ok(email) => {
                        self.auth_form = AuthForm::new(AuthMode::Login, email);
                        if self.route == Route::Register {
                            self.navigate(Route::Login);
                        }
                        self.status_message =
                            Some("Account created. Log in to continue.".to_string());
                    }
                    Err(e) => {
                        warn!(error = %e, "Registration failed");
                        self.auth_form.error = Some(e.to_string());
                    }
                }
            }
            TaskResult::LogoutFinished(result) => match result {
                Ok(()) => {
                    self.status_message = Some("Logged out".to_string());
                }
                Err(e) => {
                    error!(error = %e, "Logout failed");
                    self.logging_out = false;
                    self.status_message = Some(format!("Logout failed: {}", e));
                }
            },
            TaskResult::Error(message) => {
                self.loading = false;
                if authenticated {
                    self.status_message = Some(message);
                }
            }
        }
    }

    fn clamp_selections(&mut self) {
        let brewing_count = self.filtered_brewings().len();
        self.brewing_selection = self.brewing_selection.min(brewing_count.saturating_sub(1));
        self.coffee_selection = self.coffee_selection.min(self.coffees.len().saturating_sub(1));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn brewing_matches_search(brewing: &Brewing, query: &str) -> bool {
        contains_ignore_case(brewing.coffee_name(), query)
            || contains_ignore_case(&brewing.method, query)
            || brewing
                .brand_name()
                .is_some_and(|b| contains_ignore_case(b, query))
            || brewing
                .location
                .as_deref()
                .is_some_and(|l| contains_ignore_case(l, query))
    }

    /// Brewings after search and sort, in display order
    pub fn filtered_brewings(&self) -> Vec<&Brewing> {
        let mut brewings: Vec<&Brewing> = self
            .brewings
            .iter()
            .filter(|b| Self::brewing_matches_search(b, &self.search_query))
            .collect();
        brewings.sort_by(|a, b| {
            let ordering = self.brewing_sort_column.compare(a, b);
            if self.brewing_sort_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        brewings
    }

    pub fn selected_brewing(&self) -> Option<&Brewing> {
        self.filtered_brewings().get(self.brewing_selection).copied()
    }

    pub fn brewing_by_id(&self, id: i64) -> Option<&Brewing> {
        self.brewings.iter().find(|b| b.id == id)
    }

    pub fn selected_coffee(&self) -> Option<&CoffeeDetail> {
        self.coffees.get(self.coffee_selection)
    }

    pub fn coffee_by_id(&self, id: i64) -> Option<&CoffeeDetail> {
        self.coffees.iter().find(|c| c.id == id)
    }

    /// Brewings of one coffee, newest first
    pub fn coffee_history(&self, coffee_id: i64) -> Vec<&Brewing> {
        let mut history: Vec<&Brewing> = self
            .brewings
            .iter()
            .filter(|b| b.belongs_to_coffee(coffee_id))
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history
    }

    /// Toggle brewing sort column - if already sorting by this column, flip direction;
    /// otherwise switch to this column. Dates start newest first, the rest ascending.
    pub fn toggle_brewing_sort(&mut self, column: BrewingSortColumn) {
        if self.brewing_sort_column == column {
            self.brewing_sort_ascending = !self.brewing_sort_ascending;
        } else {
            self.brewing_sort_column = column;
            self.brewing_sort_ascending = column != BrewingSortColumn::Date;
        }
        self.brewing_selection = 0;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use brewlog_core::auth::MemoryStore;
    use brewlog_core::models::{Coffee, Rating};
    use brewlog_core::SessionHandle;

    fn app_with_store(store: Arc<MemoryStore>) -> App {
        // Nothing listens on port 9; these tests never reach the network.
        let api = ApiClient::new("http://127.0.0.1:9", SessionHandle::new()).unwrap();
        let session = Arc::new(SessionStore::new(store, api.clone()));
        App::new(Config::default(), session, api)
    }

    fn brewing(id: i64, coffee_id: i64, name: &str, created_at: &str, overall: u8) -> Brewing {
        Brewing {
            id,
            method: "V60".to_string(),
            grams: 15,
            ml: 250,
            notes: None,
            latitude: None,
            longitude: None,
            location: Some("Kitchen".to_string()),
            created_at: created_at.to_string(),
            rating: Some(Rating {
                id,
                flavor: overall,
                acidic: overall,
                aroma: overall,
                appearance: overall,
                bitter: overall,
                overall,
            }),
            coffee: Some(Coffee {
                id: coffee_id,
                name: name.to_string(),
                price: "12.00".to_string(),
                brand: None,
            }),
        }
    }

    fn sample_brewings() -> Vec<Brewing> {
        vec![
            brewing(1, 10, "Kenya AA", "2025-03-01T08:00:00", 4),
            brewing(2, 20, "Huila", "2025-03-02T08:00:00", 2),
            brewing(3, 10, "Kenya AA", "2025-03-03T08:00:00", 5),
        ]
    }

    #[tokio::test]
    async fn test_starts_on_login_while_restoring() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        assert!(app.is_restoring());
        assert_eq!(app.route, Route::Login);
        assert!(!app.apply_guard());
    }

    #[tokio::test]
    async fn test_restored_session_lands_on_brewings() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        assert!(app.apply_guard());
        assert_eq!(app.route, Route::Brewings);
        assert!(app.loading);
    }

    #[tokio::test]
    async fn test_logout_redirects_to_login_and_clears_data() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.apply_guard();
        app.brewings = sample_brewings();

        app.logout();
        app.session.logout().await.unwrap();
        assert!(app.apply_guard());
        assert_eq!(app.route, Route::Login);
        assert!(app.brewings.is_empty());
        // Explicit logout is not reported as an expired session
        assert_ne!(app.status_message.as_deref(), Some(SESSION_ENDED));
    }

    #[tokio::test]
    async fn test_expired_session_is_reported() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.apply_guard();
        app.brewings = sample_brewings();

        app.session.logout().await.unwrap();
        app.apply_guard();
        assert_eq!(app.status_message.as_deref(), Some(SESSION_ENDED));
    }

    #[tokio::test]
    async fn test_expired_session_reported_with_empty_journal() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.apply_guard();
        assert!(app.brewings.is_empty());

        app.session.logout().await.unwrap();
        assert!(app.apply_guard());
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.status_message.as_deref(), Some(SESSION_ENDED));
    }

    #[tokio::test]
    async fn test_no_session_notice_on_first_login_screen() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.session.restore().await;
        assert!(!app.apply_guard());
        assert_eq!(app.route, Route::Login);
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_submit_auth_validates_before_sending() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.auth_form = AuthForm::new(AuthMode::Login, String::new());
        app.submit_auth();
        assert_eq!(app.auth_form.error.as_deref(), Some("Please fill in all fields"));
        assert!(!app.auth_form.submitting);
    }

    #[tokio::test]
    async fn test_login_error_shown_inline() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.auth_form.submitting = true;
        app.process_task_result(TaskResult::LoginFinished(Err(SessionError::Authentication(
            "Invalid credentials".to_string(),
        ))));
        assert!(!app.auth_form.submitting);
        assert_eq!(app.auth_form.error.as_deref(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_superseded_login_is_silent() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.process_task_result(TaskResult::LoginFinished(Err(SessionError::Superseded)));
        assert!(app.auth_form.error.is_none());
    }

    #[tokio::test]
    async fn test_register_success_returns_to_login() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.session.restore().await;
        app.navigate(Route::Register);
        assert_eq!(app.auth_form.mode, AuthMode::Register);

        app.process_task_result(TaskResult::RegisterFinished(Ok("new@b.com".to_string())));
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.auth_form.mode, AuthMode::Login);
        assert_eq!(app.auth_form.email, "new@b.com");
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_stale_fetch_after_logout_ignored() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        app.session.restore().await;
        app.process_task_result(TaskResult::Brewings(sample_brewings()));
        assert!(app.brewings.is_empty());
    }

    #[tokio::test]
    async fn test_sorting_and_search() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.process_task_result(TaskResult::Brewings(sample_brewings()));

        // Newest first by default
        let ids: Vec<i64> = app.filtered_brewings().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        app.toggle_brewing_sort(BrewingSortColumn::Rating);
        let ids: Vec<i64> = app.filtered_brewings().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        app.search_query = "huila".to_string();
        assert_eq!(app.filtered_brewings().len(), 1);
    }

    #[tokio::test]
    async fn test_coffee_history_filters_and_orders() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.process_task_result(TaskResult::Brewings(sample_brewings()));

        let ids: Vec<i64> = app.coffee_history(10).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(app.coffee_history(99).is_empty());
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.process_task_result(TaskResult::Brewings(sample_brewings()));
        app.route = Route::BrewingDetail(2);

        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete(2));

        app.process_task_result(TaskResult::BrewingDeleted(2));
        assert!(app.brewing_by_id(2).is_none());
        assert_eq!(app.route, Route::Brewings);
    }

    #[tokio::test]
    async fn test_created_brewing_goes_to_top() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.session.restore().await;
        app.process_task_result(TaskResult::Brewings(sample_brewings()));
        app.route = Route::NewBrewing;
        app.brewing_form.submitting = true;

        app.process_task_result(TaskResult::BrewingCreated(brewing(
            4,
            20,
            "Huila",
            "2025-03-04T08:00:00",
            3,
        )));
        assert_eq!(app.route, Route::Brewings);
        assert_eq!(app.selected_brewing().map(|b| b.id), Some(4));
        assert!(!app.brewing_form.submitting);
    }

    #[tokio::test]
    async fn test_go_back() {
        let mut app = app_with_store(Arc::new(MemoryStore::with_token("t")));
        app.route = Route::CoffeeDetail(1);
        app.go_back();
        assert_eq!(app.route, Route::Coffees);
        app.route = Route::Register;
        app.go_back();
        assert_eq!(app.route, Route::Login);
    }

    #[test]
    fn test_toggle_sort_direction() {
        let mut app = app_with_store(Arc::new(MemoryStore::new()));
        assert!(!app.brewing_sort_ascending);
        app.toggle_brewing_sort(BrewingSortColumn::Date);
        assert!(app.brewing_sort_ascending);
        app.toggle_brewing_sort(BrewingSortColumn::Coffee);
        assert!(app.brewing_sort_ascending);
        assert_eq!(app.brewing_sort_column, BrewingSortColumn::Coffee);
    }
}
