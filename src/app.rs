use crate::config::Config;
use crate::details;
use crate::models::MovieSummary;
use crate::pages::{self, SearchEcho};
use crate::search::{self, SearchCriteria, SearchForm};
use crate::tmdb::{or_no_data, TmdbApi, TmdbClient};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, Level};

const MAX_BODY_BYTES: usize = 64 * 1024; // search forms are tiny

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::new(config.clone())?);
        Ok(Self { tmdb, config })
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let addr = config.bind_addr;
    let state = AppState::new(config)?;
    info!("Using TMDB at {}", state.config.api_base);

    let app = build_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search_page))
        .route("/movie/:movie_id", get(movie_detail))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(request_trace_layer())
        .with_state(state)
}

/// Logs every request span and response at INFO so the default filter shows them.
fn request_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

async fn health() -> &'static str {
    "OK"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let genres = or_no_data(state.tmdb.genres().await, "genres");
    Html(pages::render_index(&genres))
}

async fn search_page(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let criteria = SearchCriteria::from_form(&form);
    debug!(?criteria, "Search request");

    let genre_name = match criteria.genre_id {
        Some(id) => {
            let genres = or_no_data(state.tmdb.genres().await, "genres");
            search::genre_name(&genres, id)
        }
        None => None,
    };

    let records = search::search_movies(state.tmdb.as_ref(), &criteria).await;
    let movies: Vec<MovieSummary> = records
        .iter()
        .map(|m| MovieSummary::from_record(m, &state.config.image_base))
        .collect();

    let echo = SearchEcho {
        title: criteria.title,
        genre_name,
        year: criteria.year,
    };
    Html(pages::render_results(&movies, &echo))
}

async fn movie_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    // non-numeric ids are a 404, not a 400
    let Some(movie_id) = parse_movie_id(&raw_id) else {
        return not_found();
    };
    let movie =
        details::get_movie_details(state.tmdb.as_ref(), &state.config.image_base, movie_id).await;
    match movie {
        Some(movie) => Html(pages::render_detail(&movie)).into_response(),
        None => {
            info!("Movie {} not found", movie_id);
            not_found()
        }
    }
}

fn parse_movie_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::render_not_found())).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
