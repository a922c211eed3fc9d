//! Keeps the visible screen consistent with the session.
//!
//! Screens live in one of two areas: the public area (login, register) and
//! the protected area (everything else). `RoutingGuard::check` compares the
//! current screen against the session and says where to go instead, if
//! anywhere. It is evaluated on every pass, so drift is corrected as well as
//! explicit login/logout transitions.

use tokio::sync::watch;
use tracing::debug;

use crate::auth::{SessionHandle, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Public,
    Protected,
}

/// Every screen a client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Brewings,
    BrewingDetail(i64),
    NewBrewing,
    Coffees,
    CoffeeDetail(i64),
}

impl Route {
    /// Where an authenticated user lands
    pub const LANDING: Route = Route::Brewings;

    pub fn area(&self) -> Area {
        match self {
            Route::Login | Route::Register => Area::Public,
            Route::Brewings
            | Route::BrewingDetail(_)
            | Route::NewBrewing
            | Route::Coffees
            | Route::CoffeeDetail(_) => Area::Protected,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Log In",
            Route::Register => "Register",
            Route::Brewings => "Brewings",
            Route::BrewingDetail(_) => "Brewing",
            Route::NewBrewing => "New Brewing",
            Route::Coffees => "Coffees",
            Route::CoffeeDetail(_) => "Coffee",
        }
    }
}

/// The guard's view of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Restoring,
    Unauthenticated,
    Authenticated,
}

impl From<&SessionState> for GuardPhase {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Restoring => GuardPhase::Restoring,
            SessionState::Unauthenticated => GuardPhase::Unauthenticated,
            SessionState::Authenticated(_) => GuardPhase::Authenticated,
        }
    }
}

/// Where `current` should be redirected to in `phase`, if anywhere.
///
/// Nothing moves while the session is still being restored, so the wrong
/// area never flashes up.
pub fn redirect_for(phase: GuardPhase, current: Route, landing: Route) -> Option<Route> {
    match (phase, current.area()) {
        (GuardPhase::Restoring, _) => None,
        (GuardPhase::Unauthenticated, Area::Protected) => Some(Route::Login),
        (GuardPhase::Authenticated, Area::Public) => Some(landing),
        _ => None,
    }
}

/// Watches the session and decides redirects for the current screen.
pub struct RoutingGuard {
    session: watch::Receiver<SessionState>,
    landing: Route,
}

impl RoutingGuard {
    pub fn new(handle: &SessionHandle) -> Self {
        Self {
            session: handle.subscribe(),
            landing: Route::LANDING,
        }
    }

    /// Use a landing screen other than the brewing list.
    pub fn with_landing(mut self, landing: Route) -> Self {
        debug_assert_eq!(landing.area(), Area::Protected);
        self.landing = landing;
        self
    }

    pub fn phase(&self) -> GuardPhase {
        GuardPhase::from(&*self.session.borrow())
    }

    /// Evaluate `current` against the latest session state.
    pub fn check(&mut self, current: Route) -> Option<Route> {
        let phase = GuardPhase::from(&*self.session.borrow_and_update());
        let target = redirect_for(phase, current, self.landing);
        if let Some(target) = target {
            debug!(?phase, from = ?current, to = ?target, "Guard redirect");
        }
        target
    }

    /// Whether the session changed since the last `check`
    pub fn has_changed(&self) -> bool {
        self.session.has_changed().unwrap_or(false)
    }

    /// Wait for the next session change. Returns false once the session is gone.
    pub async fn changed(&mut self) -> bool {
        self.session.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;

    const ALL_ROUTES: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Brewings,
        Route::BrewingDetail(1),
        Route::NewBrewing,
        Route::Coffees,
        Route::CoffeeDetail(1),
    ];

    #[test]
    fn test_route_areas() {
        assert_eq!(Route::Login.area(), Area::Public);
        assert_eq!(Route::Register.area(), Area::Public);
        assert_eq!(Route::Brewings.area(), Area::Protected);
        assert_eq!(Route::CoffeeDetail(4).area(), Area::Protected);
    }

    #[test]
    fn test_restoring_never_redirects() {
        for route in ALL_ROUTES {
            assert_eq!(redirect_for(GuardPhase::Restoring, route, Route::LANDING), None);
        }
    }

    #[test]
    fn test_unauthenticated_on_protected_goes_to_login() {
        for route in ALL_ROUTES.iter().filter(|r| r.area() == Area::Protected) {
            assert_eq!(
                redirect_for(GuardPhase::Unauthenticated, *route, Route::LANDING),
                Some(Route::Login)
            );
        }
        assert_eq!(redirect_for(GuardPhase::Unauthenticated, Route::Register, Route::LANDING), None);
    }

    #[test]
    fn test_authenticated_on_public_goes_to_landing() {
        assert_eq!(
            redirect_for(GuardPhase::Authenticated, Route::Login, Route::LANDING),
            Some(Route::Brewings)
        );
        assert_eq!(
            redirect_for(GuardPhase::Authenticated, Route::Register, Route::LANDING),
            Some(Route::Brewings)
        );
        assert_eq!(redirect_for(GuardPhase::Authenticated, Route::NewBrewing, Route::LANDING), None);
    }

    #[test]
    fn test_guard_follows_session() {
        let handle = SessionHandle::new();
        let mut guard = RoutingGuard::new(&handle);

        assert_eq!(guard.phase(), GuardPhase::Restoring);
        assert_eq!(guard.check(Route::Brewings), None);

        handle.publish(SessionState::Unauthenticated);
        assert!(guard.has_changed());
        assert_eq!(guard.check(Route::Brewings), Some(Route::Login));
        assert!(!guard.has_changed());
        // Drift is corrected on every check, not only after a change
        assert_eq!(guard.check(Route::Coffees), Some(Route::Login));

        handle.publish(SessionState::Authenticated(Credential::bearer("t")));
        assert_eq!(guard.check(Route::Login), Some(Route::Brewings));
        assert_eq!(guard.check(Route::Coffees), None);
    }

    #[test]
    fn test_custom_landing() {
        let handle = SessionHandle::new();
        let mut guard = RoutingGuard::new(&handle).with_landing(Route::Coffees);
        handle.publish(SessionState::Authenticated(Credential::bearer("t")));
        assert_eq!(guard.check(Route::Login), Some(Route::Coffees));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let handle = SessionHandle::new();
        let mut guard = RoutingGuard::new(&handle);
        let publisher = handle.clone();
        tokio::spawn(async move {
            publisher.publish(SessionState::Unauthenticated);
        });
        assert!(guard.changed().await);
        assert_eq!(guard.phase(), GuardPhase::Unauthenticated);
    }
}
