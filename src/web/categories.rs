//! Editor category routes
//!
//! - GET  /categories            - category listing
//! - GET  /categories/add        - add-category form
//! - POST /categories/add        - insert then redirect
//! - GET  /categories/delete/:id - delete then redirect

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::templates::base_context;
use crate::web::middleware::{AppState, CurrentSession, RequestContext};

/// Form body for adding a category
#[derive(Debug, Deserialize)]
pub struct AddCategoryForm {
    #[serde(default)]
    pub category: String,
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    context: RequestContext,
    session: CurrentSession,
) -> Html<String> {
    let mut tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        Some(&session.0.user),
    );

    match state.category_service.list().await {
        Ok(categories) if !categories.is_empty() => {
            tera_context.insert("categories", &categories)
        }
        Ok(_) => tera_context.insert("message", "No Results"),
        Err(e) => {
            tracing::warn!("Category listing failed: {}", e);
            tera_context.insert("message", "no results");
        }
    }

    Html(
        state
            .templates
            .render_with_fallback("categories.html", &tera_context),
    )
}

/// GET /categories/add
pub async fn add_category_form(
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
            .render_with_fallback("addCategory.html", &tera_context),
    )
}

/// POST /categories/add
///
/// An empty name is a silent no-op; either way the client lands back on the
/// category listing.
pub async fn add_category(
    State(state): State<AppState>,
    _session: CurrentSession,
    Form(form): Form<AddCategoryForm>,
) -> Redirect {
    let name = form.category.trim();
    if name.is_empty() {
        tracing::debug!("Skipping category insert: empty name");
    } else if let Err(e) = state.category_service.add(name).await {
        tracing::warn!("Unable to add category {:?}: {}", name, e);
    }

    Redirect::to("/categories")
}

/// GET /categories/delete/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _session: CurrentSession,
) -> Redirect {
    if let Err(e) = state.category_service.delete(id).await {
        tracing::warn!("Unable to remove category {}: {}", id, e);
    }
    Redirect::to("/categories")
}
