//! HTTP routes.
//!
//! - `GET /` renders the search page with the top-N ranked view.
//! - `GET /export` downloads the full ranked set as CSV.
//!
//! Both share [`SearchParams`] parsing and the process-wide query cache
//! held by [`ProductSearch`].

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, RawQuery},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use pricescout_core::{Error, Limit, ProductSearch, export};
use tower_http::trace::TraceLayer;

use crate::error::WebError;
use crate::params::SearchParams;
use crate::view;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<ProductSearch>,
}

impl AppState {
    pub fn new(search: ProductSearch) -> Self {
        Self { search: Arc::new(search) }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/export", get(export_csv))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

async fn index(Extension(state): Extension<AppState>, RawQuery(raw): RawQuery) -> Html<String> {
    let params = SearchParams::parse(raw.as_deref());
    let outcome = if params.q.is_empty() {
        None
    } else {
        state.search.search(&params.to_request(), Limit::Top).await
    };

    Html(view::page(&params, state.search.websites(), outcome.as_ref()))
}

async fn export_csv(Extension(state): Extension<AppState>, RawQuery(raw): RawQuery) -> Result<Response, WebError> {
    let params = SearchParams::parse(raw.as_deref());
    if params.q.is_empty() {
        return Err(Error::InvalidInput("query parameter `q` is required".into()).into());
    }

    let outcome = state
        .search
        .search(&params.to_request(), Limit::All)
        .await
        .ok_or_else(|| Error::InvalidInput("query has no keywords".into()))?;

    let body = export::export_csv(&outcome.products)?;
    let filename = export::export_filename(&outcome.query);
    tracing::info!(query = %outcome.query, count = outcome.products.len(), "export served");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}
