//! Editor item routes
//!
//! Handlers for the authenticated item management surface:
//! - GET  /items            - full listing, filterable by category or date
//! - GET  /items/add        - add-item form
//! - POST /items/add        - upload pipeline (multipart)
//! - GET  /items/delete/:id - delete then redirect
//!
//! The upload pipeline sends the in-memory file to the remote asset store,
//! and only persists the catalog record once the store has answered with a
//! reference URL.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::models::CreateItemInput;
use crate::services::{CatalogService, CatalogServiceError};
use crate::storage::AssetStore;
use crate::templates::base_context;
use crate::web::middleware::{AppState, CurrentSession, RequestContext};

/// Query parameters for the item listing
#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub category: Option<String>,
    #[serde(rename = "minDate")]
    pub min_date: Option<String>,
}

/// Form fields accompanying an item upload
#[derive(Debug, Default, Clone)]
pub struct AddItemForm {
    pub title: String,
    pub body: String,
    pub category: String,
    pub published: bool,
}

/// Error surface of the upload pipeline.
///
/// Both variants reach the client verbatim, not through a template.
#[derive(Debug, thiserror::Error)]
pub enum UploadPipelineError {
    #[error("{0}")]
    Store(#[from] crate::storage::AssetStoreError),

    #[error("{0}")]
    Persist(#[from] CatalogServiceError),
}

/// GET /items
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
    context: RequestContext,
    session: CurrentSession,
) -> Html<String> {
    let fetched = match (&query.category, &query.min_date) {
        (Some(category), _) => state.catalog_service.published_by_category(category).await,
        (None, Some(min_date)) => match min_date.parse::<NaiveDate>() {
            Ok(date) => state.catalog_service.items_by_min_date(date).await,
            Err(e) => {
                tracing::debug!("Unparseable minDate {:?}: {}", min_date, e);
                Err(CatalogServiceError::InternalError(anyhow::anyhow!(
                    "invalid minDate"
                )))
            }
        },
        (None, None) => state.catalog_service.all_items().await,
    };

    let mut tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        Some(&session.0.user),
    );
    match fetched {
        Ok(items) if !items.is_empty() => tera_context.insert("items", &items),
        Ok(_) => tera_context.insert("message", "No Results"),
        Err(e) => {
            tracing::warn!("Item listing failed: {}", e);
            tera_context.insert("message", "no results");
        }
    }

    Html(state.templates.render_with_fallback("items.html", &tera_context))
}

/// GET /items/add
pub async fn add_item_form(
    State(state): State<AppState>,
    context: RequestContext,
    session: CurrentSession,
) -> Html<String> {
    // The form still renders when the category lookup fails; the select is
    // just empty
    let categories = match state.category_service.list().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!("Category lookup for add-item form failed: {}", e);
            Vec::new()
        }
    };

    let mut tera_context = base_context(
        &context.active_route,
        context.viewing_category.as_deref(),
        Some(&session.0.user),
    );
    tera_context.insert("categories", &categories);

    Html(
        state
            .templates
            .render_with_fallback("addItem.html", &tera_context),
    )
}

/// POST /items/add - the upload pipeline entry point
pub async fn add_item(
    State(state): State<AppState>,
    _session: CurrentSession,
    multipart: Multipart,
) -> Response {
    let (form, file) = match read_add_item_form(multipart).await {
        Ok(parsed) => parsed,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let Some(file) = file else {
        return (
            StatusCode::BAD_REQUEST,
            "missing featureImage upload".to_string(),
        )
            .into_response();
    };

    match run_upload_pipeline(&state.catalog_service, state.asset_store.as_ref(), form, file).await
    {
        Ok(_) => Redirect::to("/items").into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /items/delete/:id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _session: CurrentSession,
) -> Redirect {
    if let Err(e) = state.catalog_service.delete(id).await {
        tracing::warn!("Unable to remove item {}: {}", id, e);
    }
    Redirect::to("/items")
}

/// Pull the form fields and the buffered file out of the multipart body.
///
/// The file arrives fully in memory from the decoder; nothing is spooled to
/// disk.
async fn read_add_item_form(
    mut multipart: Multipart,
) -> Result<(AddItemForm, Option<Vec<u8>>), String> {
    let mut form = AddItemForm::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed multipart body: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = read_text(field, &name).await?,
            "body" => form.body = read_text(field, &name).await?,
            "category" => form.category = read_text(field, &name).await?,
            "published" => {
                let value = read_text(field, &name).await?;
                form.published = value == "on" || value == "true";
            }
            "featureImage" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("failed to read uploaded file: {}", e))?;
                file = Some(bytes.to_vec());
            }
            other => {
                tracing::debug!("Ignoring unexpected form field {:?}", other);
            }
        }
    }

    Ok((form, file))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, String> {
    field
        .text()
        .await
        .map_err(|e| format!("failed to read field {:?}: {}", name, e))
}

/// Run the upload pipeline: store the image remotely, then persist the item.
///
/// The store gives exactly one terminal answer per attempt; a failure
/// aborts the pipeline with nothing persisted and no retry. On success the
/// item record takes the resolved reference URL and today's calendar date.
/// An empty title completes the pipeline without persisting anything.
pub async fn run_upload_pipeline(
    catalog: &CatalogService,
    store: &dyn AssetStore,
    form: AddItemForm,
    file: Vec<u8>,
) -> Result<Option<crate::models::CatalogItem>, UploadPipelineError> {
    let uploaded = store.upload(file).await?;

    if form.title.trim().is_empty() {
        tracing::debug!("Skipping item persist: empty title");
        return Ok(None);
    }

    let item = catalog
        .add(CreateItemInput {
            title: form.title,
            body: form.body,
            post_date: Utc::now().date_naive(),
            category: form.category,
            feature_image: uploaded.url,
            published: form.published,
        })
        .await?;

    Ok(Some(item))
}
