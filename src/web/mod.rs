//! Web layer - HTTP handlers and routing
//!
//! Per-request flow: session attachment, request-context derivation, route
//! match, optional login guard, handler, then a rendered page or redirect.
//! Unmatched paths fall through to the 404 page.

pub mod auth;
pub mod categories;
pub mod items;
pub mod middleware;
pub mod shop;
pub mod view;


use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::Html,
    routing::get,
    Router,
};
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use middleware::AppState;

use crate::templates::base_context;
use middleware::{MaybeSession, RequestContext};

/// Build the complete router with middleware
pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    // Routes behind the login guard
    let guarded = Router::new()
        .route("/shop/{id}", get(shop::shop_item))
        .route("/items", get(items::list_items))
        .route("/items/add", get(items::add_item_form).post(items::add_item))
        .route("/items/delete/{id}", get(items::delete_item))
        .route("/categories", get(categories::list_categories))
        .route(
            "/categories/add",
            get(categories::add_category_form).post(categories::add_category),
        )
        .route("/categories/delete/{id}", get(categories::delete_category))
        .route("/userHistory", get(auth::user_history))
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    Router::new()
        .route("/", get(shop::index))
        .route("/about", get(shop::about))
        .route("/shop", get(shop::shop))
        .route("/item/{id}", get(shop::item_raw))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout))
        .merge(guarded)
        .nest_service("/public", ServeDir::new(public_dir))
        .fallback(not_found)
        .layer(axum_middleware::from_fn(middleware::attach_request_context))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::attach_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Catch-all 404 page
async fn not_found(
    axum::extract::State(state): axum::extract::State<AppState>,
    context: RequestContext,
    session: MaybeSession,
) -> (StatusCode, Html<String>) {
    let tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        session.0.as_ref().map(|s| &s.user),
    );
    (
        StatusCode::NOT_FOUND,
        Html(state.templates.render_with_fallback("404.html", &tera_context)),
    )
}
