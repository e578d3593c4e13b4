use std::fmt;
use std::str::FromStr;

use super::session::SessionState;

/// The views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Contact,
    SignIn,
    Dashboard,
    Symptoms,
    Records,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Contact => "/contact",
            Route::SignIn => "/signin",
            Route::Dashboard => "/dashboard",
            Route::Symptoms => "/symptoms",
            Route::Records => "/records",
        }
    }

    /// Routes that need a signed-in user.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::Symptoms | Route::Records)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/" => Ok(Route::Home),
            "/about" => Ok(Route::About),
            "/contact" => Ok(Route::Contact),
            "/signin" => Ok(Route::SignIn),
            "/dashboard" => Ok(Route::Dashboard),
            "/symptoms" => Ok(Route::Symptoms),
            "/records" => Ok(Route::Records),
            other => Err(format!("Unknown route: {}", other)),
        }
    }
}

/// What to show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    /// The session is still being validated.
    Loading,
    Redirect(Route),
}

/// Decides what a navigation to `route` shows under `state`.
pub fn guard(route: Route, state: &SessionState) -> RouteDecision {
    if !route.is_protected() {
        return RouteDecision::Render(route);
    }
    match state {
        SessionState::Authenticated(_) => RouteDecision::Render(route),
        SessionState::Validating => RouteDecision::Loading,
        SessionState::Unauthenticated => RouteDecision::Redirect(Route::SignIn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::SessionUser;
    use uuid::Uuid;

    fn signed_in() -> SessionState {
        SessionState::Authenticated(SessionUser {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
        })
    }

    #[test]
    fn paths_parse_back() {
        for route in [
            Route::Home,
            Route::About,
            Route::Contact,
            Route::SignIn,
            Route::Dashboard,
            Route::Symptoms,
            Route::Records,
        ] {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
        assert_eq!("/dashboard/".parse::<Route>().unwrap(), Route::Dashboard);
        assert!("/admin".parse::<Route>().is_err());
    }

    #[test]
    fn protected_routes_redirect_when_signed_out() {
        let state = SessionState::Unauthenticated;
        assert_eq!(guard(Route::Dashboard, &state), RouteDecision::Redirect(Route::SignIn));
        assert_eq!(guard(Route::Records, &state), RouteDecision::Redirect(Route::SignIn));
        assert_eq!(guard(Route::Home, &state), RouteDecision::Render(Route::Home));
    }

    #[test]
    fn protected_routes_wait_while_validating() {
        assert_eq!(guard(Route::Symptoms, &SessionState::Validating), RouteDecision::Loading);
        assert_eq!(
            guard(Route::SignIn, &SessionState::Validating),
            RouteDecision::Render(Route::SignIn)
        );
    }

    #[test]
    fn protected_routes_render_when_signed_in() {
        assert_eq!(
            guard(Route::Dashboard, &signed_in()),
            RouteDecision::Render(Route::Dashboard)
        );
    }
}
