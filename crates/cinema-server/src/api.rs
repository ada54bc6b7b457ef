use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::Method,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cinema_shared::constants::{
    PATH_DIRECTOR_UPSERT, PATH_GENRE_UPSERT, PATH_HEALTH, PATH_MOVIES, PATH_MOVIE_CREATE,
};
use cinema_shared::protocol::{CreateMovieRequest, CreateMovieResponse, RelationUpsertRequest};
use cinema_shared::{Credentials, Movie, MovieId, MoviePrimary, RelationKind};

use crate::catalog_store::CatalogStore;
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(CatalogStore::new()),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route(PATH_HEALTH, get(health_check))
        .route(PATH_MOVIES, get(list_movies))
        .route(PATH_MOVIE_CREATE, post(create_movie))
        .route("/movies/:id", put(update_movie).delete(delete_movie))
        .route(PATH_GENRE_UPSERT, post(upsert_genre).put(upsert_genre))
        .route(PATH_DIRECTOR_UPSERT, post(upsert_director).put(upsert_director))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    instance: String,
}

#[derive(Serialize)]
struct AckResponse {
    message: String,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        instance: state.config.instance_name.clone(),
    })
}

async fn list_movies(State(state): State<AppState>) -> Json<Vec<Movie>> {
    Json(state.store.list().await)
}

async fn create_movie(
    State(state): State<AppState>,
    Json(req): Json<CreateMovieRequest>,
) -> Result<Json<CreateMovieResponse>, ServerError> {
    verify_admin(&req.credentials, &state.config)?;

    let last_id = state.store.create(req.primary).await;
    Ok(Json(CreateMovieResponse { last_id }))
}

async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
    Json(primary): Json<MoviePrimary>,
) -> Result<Json<AckResponse>, ServerError> {
    state.store.update(id, primary).await?;
    Ok(Json(AckResponse {
        message: format!("Movie {id} updated"),
    }))
}

async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<AckResponse>, ServerError> {
    state.store.delete(id).await?;
    Ok(Json(AckResponse {
        message: format!("Movie {id} deleted"),
    }))
}

async fn upsert_genre(
    State(state): State<AppState>,
    Json(req): Json<RelationUpsertRequest>,
) -> Result<Json<AckResponse>, ServerError> {
    upsert_relation(&state, RelationKind::Genre, req).await
}

async fn upsert_director(
    State(state): State<AppState>,
    Json(req): Json<RelationUpsertRequest>,
) -> Result<Json<AckResponse>, ServerError> {
    upsert_relation(&state, RelationKind::Director, req).await
}

/// POST and PUT share this path: both are upserts keyed by `(movieId, name)`.
async fn upsert_relation(
    state: &AppState,
    kind: RelationKind,
    req: RelationUpsertRequest,
) -> Result<Json<AckResponse>, ServerError> {
    verify_admin(&req.credentials, &state.config)?;

    let name = req
        .item(kind)
        .ok_or_else(|| ServerError::BadRequest(format!("missing '{}' field", kind.field())))?;
    let inserted = state.store.upsert_relation(req.movie_id, kind, name).await?;

    let message = if inserted {
        format!("{kind} '{}' linked to movie {}", name.trim(), req.movie_id)
    } else {
        format!("{kind} '{}' already linked to movie {}", name.trim(), req.movie_id)
    };
    Ok(Json(AckResponse { message }))
}

fn verify_admin(credentials: &Credentials, config: &ServerConfig) -> Result<(), ServerError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Err(ServerError::Forbidden(
            "Admin writes are disabled (no admin credentials configured)".into(),
        ));
    };

    let email_ok = credentials.email.as_bytes().ct_eq(email.as_bytes());
    let password_ok = credentials.password.as_bytes().ct_eq(password.as_bytes());

    if (email_ok & password_ok).unwrap_u8() != 1 {
        warn!(email = %credentials.email, "Rejected admin credentials");
        return Err(ServerError::Forbidden("Invalid admin credentials".into()));
    }

    Ok(())
}

/// Bind `addr` and serve the catalog API until the listener fails.
pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(ServerConfig {
            admin_email: Some("admin@cinema.test".into()),
            admin_password: Some("hunter2".into()),
            ..ServerConfig::default()
        })
    }

    fn movie_body(name: &str) -> Value {
        json!({
            "email": "admin@cinema.test",
            "password": "hunter2",
            "name": name,
            "image_path": "/posters/heat.jpg",
            "language": "English",
            "synopsis": "A crew of professionals plans one last job.",
            "rating": 8.3,
            "duration": "170 min",
            "top_cast": "Al Pacino, Robert De Niro",
            "release_date": "1995-12-15",
        })
    }

    async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&state(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_returns_last_id() {
        let state = state();
        let (status, body) = call(&state, "POST", "/adminMovieAdd", Some(movie_body("Heat"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_id"], 1);

        let (_, listed) = call(&state, "GET", "/movies", None).await;
        assert_eq!(listed[0]["name"], "Heat");
        assert_eq!(listed[0]["top_cast"], "Al Pacino, Robert De Niro");
        assert_eq!(listed[0]["genres"], json!([]));
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected_with_message() {
        let state = state();
        let mut body = movie_body("Heat");
        body["password"] = json!("wrong");

        let (status, resp) = call(&state, "POST", "/adminMovieAdd", Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp["message"], "Invalid admin credentials");
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unconfigured_admin_rejects_writes() {
        let state = AppState::new(ServerConfig::default());
        let (status, _) = call(&state, "POST", "/adminMovieAdd", Some(movie_body("Heat"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_relation_upsert_post_and_put_are_idempotent() {
        let state = state();
        call(&state, "POST", "/adminMovieAdd", Some(movie_body("Heat"))).await;

        let upsert = json!({
            "email": "admin@cinema.test",
            "password": "hunter2",
            "movieId": 1,
            "genre": "Crime",
        });
        for method in ["POST", "POST", "PUT"] {
            let (status, _) = call(&state, method, "/genreInsert", Some(upsert.clone())).await;
            assert_eq!(status, StatusCode::OK);
        }

        let movie = state.store.get(MovieId(1)).await.unwrap();
        assert_eq!(movie.genres.as_slice(), &["Crime".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_for_unknown_movie_is_404() {
        let state = state();
        let upsert = json!({
            "email": "admin@cinema.test",
            "password": "hunter2",
            "movieId": 42,
            "director": "Michael Mann",
        });
        let (status, body) = call(&state, "POST", "/directorInsert", Some(upsert)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Movie 42 not found");
    }

    #[tokio::test]
    async fn test_upsert_missing_item_field_is_400() {
        let state = state();
        call(&state, "POST", "/adminMovieAdd", Some(movie_body("Heat"))).await;
        let upsert = json!({
            "email": "admin@cinema.test",
            "password": "hunter2",
            "movieId": 1,
            "genre": "Crime",
        });
        let (status, _) = call(&state, "POST", "/directorInsert", Some(upsert)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let state = state();
        call(&state, "POST", "/adminMovieAdd", Some(movie_body("Heat"))).await;

        let mut primary = movie_body("Heat (1995)");
        primary.as_object_mut().unwrap().remove("email");
        let (status, _) = call(&state, "PUT", "/movies/1", Some(primary.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.store.get(MovieId(1)).await.unwrap().primary.name, "Heat (1995)");

        let (status, _) = call(&state, "PUT", "/movies/9", Some(primary)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&state, "DELETE", "/movies/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&state, "DELETE", "/movies/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Movie 1 not found");
    }
}
