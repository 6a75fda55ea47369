//! On-demand web view: `/` renders a page, `/api/episodes` returns JSON.
//!
//! Each request re-runs collection and summarizes every episode; nothing is
//! cached between requests.

use crate::error::{AppError, AppResult};
use crate::models::Episode;
use crate::pipeline::Collector;
use crate::render::{error_page, index_page};
use crate::summarize::{attach_summaries, Summarizer};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    pub summarizer: Arc<dyn Summarizer>,
    /// Pins the run date; `None` uses the local date per request
    pub fixed_day: Option<NaiveDate>,
}

impl AppState {
    pub fn new(collector: Arc<Collector>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            collector,
            summarizer,
            fixed_day: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.fixed_day.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Top-level handler failure; always a 500.
#[derive(Debug)]
pub enum WebError {
    /// Rendered as `{"error": "..."}`
    Api(AppError),
    /// Rendered as the HTML error page
    Page(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Api(e) => {
                log::error!("Error in API route: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
            WebError::Page(message) => {
                log::error!("{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(error_page(&message))).into_response()
            }
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/episodes", get(api_episodes))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Collect, dedup and summarize for today. Source outages only shrink the
/// list; the one failure left is the collection task itself dying.
async fn load_episodes(state: &AppState) -> AppResult<(Vec<Episode>, NaiveDate)> {
    let state = state.clone();
    tokio::spawn(async move {
        let today = state.today();
        let collection = state.collector.collect(today).await;
        if collection.all_sources_failed() {
            log::warn!(
                "All {} podcast sources failed, serving an empty list",
                collection.sources_attempted
            );
        }

        let mut episodes = collection.episodes;
        attach_summaries(state.summarizer.as_ref(), &mut episodes).await;
        log::debug!("Total unique episodes after processing: {}", episodes.len());
        (episodes, today)
    })
    .await
    .map_err(|e| AppError::Other(format!("episode collection task failed: {}", e)))
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    if !state.summarizer.is_configured() {
        return Err(WebError::Page(
            "Error: OpenAI API key not configured".to_string(),
        ));
    }

    let (episodes, today) = load_episodes(&state)
        .await
        .map_err(|e| WebError::Page(format!("Error: {}", e)))?;
    Ok(Html(index_page(&episodes, today)))
}

pub async fn api_episodes(State(state): State<AppState>) -> Result<Json<Vec<Episode>>, WebError> {
    let (episodes, _) = load_episodes(&state).await.map_err(WebError::Api)?;
    Ok(Json(episodes))
}
