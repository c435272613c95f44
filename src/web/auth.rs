//! Authentication routes
//!
//! - GET  /login, /register - render forms
//! - POST /login            - check credentials, set the session cookie
//! - POST /register         - create a credential
//! - GET  /logout           - clear the session cookie
//! - GET  /userHistory      - render the session's login history

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::models::SessionUser;
use crate::templates::base_context;
use crate::web::middleware::{AppState, CurrentSession, MaybeSession, RequestContext};

/// Form body for login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    context: RequestContext,
    session: MaybeSession,
) -> Html<String> {
    let tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        session.0.as_ref().map(|s| &s.user),
    );
    Html(state.templates.render_with_fallback("login.html", &tera_context))
}

/// GET /register
pub async fn register_form(
    State(state): State<AppState>,
    context: RequestContext,
    session: MaybeSession,
) -> Html<String> {
    let tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        session.0.as_ref().map(|s| &s.user),
    );
    Html(
        state
            .templates
            .render_with_fallback("register.html", &tera_context),
    )
}

/// POST /login
///
/// Success sets the session cookie and lands on the item listing; failure
/// re-renders the form with the error and the submitted user name.
pub async fn login(
    State(state): State<AppState>,
    context: RequestContext,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match state
        .user_service
        .authenticate(&form.user_name, &form.password, user_agent)
        .await
    {
        Ok(user) => {
            let session = state.session_manager.issue(SessionUser {
                user_name: user.user_name,
                email: user.email,
                login_history: user.login_history,
            });
            match state.session_manager.cookie_header(&session) {
                Ok(cookie) => {
                    ([(header::SET_COOKIE, cookie)], Redirect::to("/items")).into_response()
                }
                Err(e) => {
                    tracing::error!("Failed to issue session cookie: {:#}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to establish session")
                        .into_response()
                }
            }
        }
        Err(e) => {
            let mut tera_context = base_context(
                &context.active_route,
                context.viewing_category.as_deref(),
                None,
            );
            tera_context.insert("error_message", &e.to_string());
            tera_context.insert("user_name", &form.user_name);
            Html(state.templates.render_with_fallback("login.html", &tera_context))
                .into_response()
        }
    }
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    context: RequestContext,
    Form(form): Form<RegisterForm>,
) -> Html<String> {
    let mut tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        None,
    );

    match state
        .user_service
        .register(crate::models::RegisterInput {
            user_name: form.user_name.clone(),
            email: form.email,
            password: form.password,
        })
        .await
    {
        Ok(_) => tera_context.insert("success_message", "User created"),
        Err(e) => {
            tera_context.insert("error_message", &e.to_string());
            tera_context.insert("user_name", &form.user_name);
        }
    }

    Html(
        state
            .templates
            .render_with_fallback("register.html", &tera_context),
    )
}

/// GET /logout - drop the session immediately, whatever its timer says
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.session_manager.clear_cookie_header())],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /userHistory
pub async fn user_history(
    State(state): State<AppState>,
    context: RequestContext,
    session: CurrentSession,
) -> Html<String> {
    let tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        Some(&session.0.user),
    );
    Html(
        state
            .templates
            .render_with_fallback("userHistory.html", &tera_context),
    )
}
