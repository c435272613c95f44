//! Web middleware
//!
//! The per-request pipeline ahead of every handler:
//! - Session attachment: read, verify and slide the session cookie
//! - Request context: derive the active navigation route and category filter
//! - Login guard for the protected routes
//!
//! Both the session and the navigation state travel in request extensions,
//! so concurrent requests can never observe each other's values.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

use crate::models::Session;
use crate::services::{CatalogService, CategoryService, SessionManager, UserService};
use crate::storage::SharedAssetStore;
use crate::templates::TemplateEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<CatalogService>,
    pub category_service: Arc<CategoryService>,
    pub user_service: Arc<UserService>,
    pub session_manager: Arc<SessionManager>,
    pub asset_store: SharedAssetStore,
    pub templates: Arc<TemplateEngine>,
}

/// Valid session attached to the current request
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

/// Session attached to the current request, if any.
///
/// For public pages that render differently for logged-in visitors.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

/// Per-request navigation state, derived before any handler runs
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Normalized top-level route for navigation highlighting
    pub active_route: String,
    /// Value of the `category` query parameter, if present
    pub viewing_category: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            active_route: "/".to_string(),
            viewing_category: None,
        }
    }
}

/// Derive the navigation label for a request path.
///
/// Numeric sub-path suffixes collapse to the parent section (`/shop/42`
/// becomes `/shop`); other paths keep their full form minus any trailing
/// slash.
pub fn derive_active_route(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut segments = trimmed.trim_start_matches('/').split('/');
    let first = segments.next().unwrap_or_default();
    if let Some(second) = segments.next() {
        if second.parse::<i64>().is_ok() {
            return format!("/{}", first);
        }
    }

    trimmed.to_string()
}

fn category_param(query: Option<&str>) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "category" || value.is_empty() {
            return None;
        }
        Some(
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string()),
        )
    })
}

/// Middleware deriving the request's navigation state.
///
/// Runs before route matching so every response, the 404 fallback included,
/// reflects the request currently executing.
pub async fn attach_request_context(mut request: Request, next: Next) -> Response {
    let context = RequestContext {
        active_route: derive_active_route(request.uri().path()),
        viewing_category: category_param(request.uri().query()),
    };
    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Middleware attaching the session carried by the request cookie.
///
/// A valid session is slid forward and re-issued on the response so the
/// client sees the extended deadline; handlers that set their own session
/// cookie (login, logout) win over the refresh.
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| state.session_manager.cookie_value(cookies))
        .and_then(|token| state.session_manager.decode(token));

    let refreshed = session.map(|mut session| {
        state.session_manager.extend(&mut session);
        request
            .extensions_mut()
            .insert(CurrentSession(session.clone()));
        session
    });

    let mut response = next.run(request).await;

    if let Some(session) = refreshed {
        if !response.headers().contains_key(header::SET_COOKIE) {
            match state.session_manager.cookie_header(&session) {
                Ok(cookie) => {
                    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
                        response.headers_mut().insert(header::SET_COOKIE, value);
                    }
                }
                Err(e) => tracing::warn!("Failed to refresh session cookie: {:#}", e),
            }
        }
    }

    response
}

/// Login guard for protected routes.
///
/// Requests without a valid session are redirected to the login page and
/// never reach the handler.
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentSession>().is_none() {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| Redirect::to("/login"))
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(
            parts
                .extensions
                .get::<CurrentSession>()
                .map(|current| current.0.clone()),
        ))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
