//! Route guarding based on the session context

use super::{GateState, SessionReader};

/// Top-level screens of the application
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Home,
    History,
    Login,
    Register,
}

impl Route {
    /// Routes that need a signed-in session
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Home | Route::History)
    }

    /// Sign-in and registration screens
    pub fn is_auth_screen(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "Home"),
            Route::History => write!(f, "History"),
            Route::Login => write!(f, "Login"),
            Route::Register => write!(f, "Register"),
        }
    }
}

/// What the router should do with the current route
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Session not resolved yet; render nothing but a spinner
    Wait,
    /// Keep rendering the requested route
    Stay,
    /// Replace the current route
    Redirect(Route),
}

/// Evaluates routes against the session context
#[derive(Clone, Debug)]
pub struct SessionGate {
    session: SessionReader,
}

impl SessionGate {
    pub fn new(session: SessionReader) -> Self {
        Self { session }
    }

    /// Re-evaluated on every frame, so session and route changes are both covered
    pub fn check(&self, route: Route) -> GateDecision {
        Self::decide(&self.session.state(), route)
    }

    pub fn decide(state: &GateState, route: Route) -> GateDecision {
        match state {
            GateState::Initializing => GateDecision::Wait,
            GateState::Resolved(None) if route.requires_session() => {
                GateDecision::Redirect(Route::Login)
            }
            GateState::Resolved(Some(_)) if route.is_auth_screen() => {
                GateDecision::Redirect(Route::Home)
            }
            GateState::Resolved(_) => GateDecision::Stay,
        }
    }
}
