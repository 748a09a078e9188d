//! API Route Definitions
//!
//! Routes are assembled through a builder so deployments can expose only
//! the endpoints they need (a verification-only instance, a setup-less
//! kiosk, and so on). Token-protected routes are layered with the auth
//! middleware from the application state's token service.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};
use super::middleware::auth_middleware;

/// Builder for creating API routes with configurable endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// GET /health
    health_check: bool,
    /// POST /auth/sign-up
    sign_up: bool,
    /// POST /auth/sign-in
    sign_in: bool,
    /// POST /auth/verify (bearer)
    verify_otp: bool,
    /// POST /auth/resend-otp
    resend_otp: bool,
    /// POST /auth/forgot-password
    forgot_password: bool,
    /// POST /auth/reset-password
    reset_password: bool,
    /// POST /auth/verify-reset-otp
    verify_reset_otp: bool,
    /// GET /auth/token (bearer)
    integration_token: bool,
    /// GET + PUT /profile (bearer)
    profile: bool,
    /// GET + PUT /setup
    setup: bool,
}

impl RouterBuilder {
    /// All routes disabled; enable explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Every endpoint enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            sign_up: true,
            sign_in: true,
            verify_otp: true,
            resend_otp: true,
            forgot_password: true,
            reset_password: true,
            verify_reset_otp: true,
            integration_token: true,
            profile: true,
            setup: true,
        }
    }

    /// Just the authentication/verification flows, no profile or setup
    pub fn with_auth_routes() -> Self {
        Self {
            health_check: true,
            sign_up: true,
            sign_in: true,
            verify_otp: true,
            resend_otp: true,
            forgot_password: true,
            reset_password: true,
            verify_reset_otp: true,
            integration_token: true,
            profile: false,
            setup: false,
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn sign_up(mut self, enabled: bool) -> Self {
        self.sign_up = enabled;
        self
    }

    pub fn sign_in(mut self, enabled: bool) -> Self {
        self.sign_in = enabled;
        self
    }

    pub fn verify_otp(mut self, enabled: bool) -> Self {
        self.verify_otp = enabled;
        self
    }

    pub fn resend_otp(mut self, enabled: bool) -> Self {
        self.resend_otp = enabled;
        self
    }

    pub fn forgot_password(mut self, enabled: bool) -> Self {
        self.forgot_password = enabled;
        self
    }

    pub fn reset_password(mut self, enabled: bool) -> Self {
        self.reset_password = enabled;
        self
    }

    pub fn verify_reset_otp(mut self, enabled: bool) -> Self {
        self.verify_reset_otp = enabled;
        self
    }

    pub fn integration_token(mut self, enabled: bool) -> Self {
        self.integration_token = enabled;
        self
    }

    pub fn profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn setup(mut self, enabled: bool) -> Self {
        self.setup = enabled;
        self
    }

    /// Assemble the router against the given application state
    pub fn build(self, state: AppState) -> Router {
        let mut public = Router::new();

        if self.health_check {
            public = public.route("/health", get(handlers::health_check));
        }
        if self.sign_up {
            public = public.route("/auth/sign-up", post(handlers::sign_up));
        }
        if self.sign_in {
            public = public.route("/auth/sign-in", post(handlers::sign_in));
        }
        if self.resend_otp {
            public = public.route("/auth/resend-otp", post(handlers::resend_otp));
        }
        if self.forgot_password {
            public = public.route("/auth/forgot-password", post(handlers::forgot_password));
        }
        if self.reset_password {
            public = public.route("/auth/reset-password", post(handlers::reset_password));
        }
        if self.verify_reset_otp {
            public = public.route("/auth/verify-reset-otp", post(handlers::verify_reset_otp));
        }
        if self.setup {
            public = public.route(
                "/setup",
                get(handlers::get_setup).put(handlers::put_setup),
            );
        }

        let mut protected = Router::new();

        if self.verify_otp {
            protected = protected.route("/auth/verify", post(handlers::verify_otp));
        }
        if self.integration_token {
            protected = protected.route("/auth/token", get(handlers::integration_token));
        }
        if self.profile {
            protected = protected.route(
                "/profile",
                get(handlers::get_profile).put(handlers::put_profile),
            );
        }

        let protected = protected.layer(from_fn_with_state(
            Arc::clone(&state.tokens),
            auth_middleware,
        ));

        public.merge(protected).with_state(state)
    }
}
