//! Public shop pages
//!
//! Handlers for the visitor-facing routes:
//! - GET /            - redirect to the shop listing
//! - GET /about       - static page
//! - GET /shop        - published listing, optionally filtered by category
//! - GET /shop/:id    - listing plus a featured item by id
//! - GET /item/:id    - raw item lookup, no template

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};

use crate::templates::base_context;
use crate::web::middleware::{AppState, CurrentSession, MaybeSession, RequestContext};
use crate::web::view::{build_shop_view, ViewData, TRY_ANOTHER};

/// GET / - the storefront lives at /shop
pub async fn index() -> Redirect {
    Redirect::to("/shop")
}

/// GET /about
pub async fn about(
    State(state): State<AppState>,
    context: RequestContext,
    session: MaybeSession,
) -> Html<String> {
    let tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        session.0.as_ref().map(|s| &s.user),
    );
    Html(state.templates.render_with_fallback("about.html", &tera_context))
}

/// GET /shop - published listing, newest first
pub async fn shop(
    State(state): State<AppState>,
    context: RequestContext,
    session: MaybeSession,
) -> Html<String> {
    let view = build_shop_view(
        &state.catalog_service,
        &state.category_service,
        context.viewing_category.as_deref(),
        None,
    )
    .await;

    render_shop(&state, &context, session.0.map(|s| s.user), view)
}

/// GET /shop/:id - listing plus an independently-fetched featured item
pub async fn shop_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    context: RequestContext,
    session: CurrentSession,
) -> Html<String> {
    let view = build_shop_view(
        &state.catalog_service,
        &state.category_service,
        context.viewing_category.as_deref(),
        Some(id),
    )
    .await;

    render_shop(&state, &context, Some(session.0.user), view)
}

fn render_shop(
    state: &AppState,
    context: &RequestContext,
    session_user: Option<crate::models::SessionUser>,
    view: ViewData,
) -> Html<String> {
    let mut tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        session_user.as_ref(),
    );
    // An empty collection renders the same template with an invitation to
    // browse elsewhere, not an error page
    if view.items.is_empty() {
        tera_context.insert("message", TRY_ANOTHER);
    }
    tera_context.insert("data", &view);

    Html(state.templates.render_with_fallback("shop.html", &tera_context))
}

/// GET /item/:id - the item as data, sent as-is.
///
/// A failed lookup answers with the error text in the body, untemplated and
/// without an error status.
pub async fn item_raw(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.catalog_service.get(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => (StatusCode::OK, e.to_string()).into_response(),
    }
}
