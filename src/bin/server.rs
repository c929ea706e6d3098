use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idea_board_engine::{
    error::IdeaBoardError, Comment, EngineConfig, FeedFilter, FeedPage, FeedQuery, Idea, IdeaBoard,
    MemoryStore, NewComment, NewIdea, RankMode, SimilarOptions, SimilarityMatch, VoteType,
};

#[derive(Clone)]
struct AppState {
    board: Arc<IdeaBoard>,
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    mode: Option<RankMode>,
    search: Option<String>,
    tag: Option<String>,
    owner: Option<String>,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

impl From<FeedParams> for FeedQuery {
    fn from(params: FeedParams) -> Self {
        FeedQuery {
            mode: params.mode,
            filter: FeedFilter::new(params.search, params.tag).with_owner(params.owner),
            limit: params.limit,
            offset: params.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteRequest {
    user_id: String,
    vote_type: VoteType,
}

#[derive(Debug, Deserialize)]
struct SimilarRequest {
    text: String,
    threshold: Option<f64>,
    max_results: Option<usize>,
    min_length: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    idea: Idea,
    similar: Vec<SimilarityMatch>,
}

#[derive(Debug, Serialize)]
struct TagCount {
    tag: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idea_board_server=debug,idea_board_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8090);
    let config = EngineConfig::from_env()?;

    tracing::info!("🚀 Starting Idea Board Server");
    tracing::info!("⚙️ Config: {}", config);
    tracing::info!("🔌 Port: {}", port);

    let board = IdeaBoard::new(Arc::new(MemoryStore::new()), config);
    let state = AppState {
        board: Arc::new(board),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/ideas", get(feed_handler).post(submit_handler))
        .route("/v1/ideas/:id", delete(delete_handler))
        .route("/v1/ideas/:id/vote", post(vote_handler))
        .route("/v1/ideas/:id/comments", get(comments_handler).post(comment_handler))
        .route("/v1/similar", post(similar_handler))
        .route("/v1/tags", get(tags_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("💡 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: idea_board_engine::VERSION.to_string(),
    })
}

async fn feed_handler(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, AppError> {
    let query = FeedQuery::from(params);
    let page = state.board.feed(&query, Utc::now()).await?;
    Ok(Json(page))
}

async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<NewIdea>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let similar = state.board.check_duplicates(&req.text).await?;
    let idea = state.board.submit(req, Utc::now()).await?;

    tracing::info!("✅ {} stored ({} similar)", idea.id, similar.len());

    Ok((StatusCode::CREATED, Json(SubmitResponse { idea, similar })))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, AppError> {
    match params.user_id {
        Some(user_id) => state.board.delete_owned(&id, &user_id).await?,
        None => state.board.delete(&id).await?,
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn vote_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Idea>, AppError> {
    let idea = state.board.vote(&id, &req.user_id, req.vote_type).await?;
    Ok(Json(idea))
}

async fn comments_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.board.comments(&id).await?))
}

async fn comment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state.board.comment(&id, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn similar_handler(
    State(state): State<AppState>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<Vec<SimilarityMatch>>, AppError> {
    let defaults = state.board.config().similarity;
    let options = SimilarOptions {
        min_length: req.min_length.unwrap_or(defaults.min_length),
        threshold: req.threshold.unwrap_or(defaults.threshold),
        max_results: req.max_results.unwrap_or(defaults.max_results),
    };

    let snapshot = state.board.store().snapshot().await?;
    Ok(Json(idea_board_engine::find_similar(&req.text, &snapshot, &options)))
}

async fn tags_handler(State(state): State<AppState>) -> Result<Json<Vec<TagCount>>, AppError> {
    let tags = state
        .board
        .tags()
        .await?
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    Ok(Json(tags))
}

// Error handling
struct AppError(IdeaBoardError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            IdeaBoardError::NotFound(id) => (StatusCode::NOT_FOUND, format!("No idea with id: {}", id)),
            IdeaBoardError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            e @ IdeaBoardError::Forbidden { .. } => (StatusCode::FORBIDDEN, e.to_string()),
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<IdeaBoardError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
