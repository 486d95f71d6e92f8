use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    AppState, auth,
    config::{Config, Environment},
    error, routes,
};

pub const SUPPORTED_VERSIONS: &str = "2.0";
pub const DEPRECATED_VERSIONS: &str = "1.0";

/// `/api/v1` (deprecated) and `/api/v2` serve the same handlers.
pub fn router(state: Arc<AppState>) -> Router {
    let movies = Router::new()
        .route("/Movie", get(routes::list_movies).post(routes::create_movie))
        .route(
            "/Movie/{id}",
            get(routes::get_movie).put(routes::update_movie).delete(routes::delete_movie),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    let api = movies.route("/Token", get(routes::token));

    Router::new()
        .nest("/api/v1", api.clone())
        .nest("/api/v2", api)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("api-supported-versions"),
            HeaderValue::from_static(SUPPORTED_VERSIONS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("api-deprecated-versions"),
            HeaderValue::from_static(DEPRECATED_VERSIONS),
        ))
        .layer(cors(&state.config))
        .layer(TraceLayer::new_for_http())
}

fn cors(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.environment {
        Environment::Development => layer.allow_origin(Any),
        Environment::Production => layer.allow_origin(config.cors_allowed_origin.clone()),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{
            Method, Request, StatusCode,
            header::{AUTHORIZATION, CONTENT_TYPE, LOCATION},
        },
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        auth::TokenService,
        config::{DEFAULT_CORS_ORIGIN, JwtConfig},
        db,
        error::{UNAUTHORIZED_MESSAGE, UNEXPECTED_MESSAGE},
        models::{ErrorResponse, Movie, MovieResponse, TokenResponse},
        repository::{ChangeSet, MovieRepository, SeaOrmMovieRepository, StoreError, StoreResult},
        service::MovieService,
    };

    const SECRET: &str = "end-to-end-test-secret-of-reasonable-length";

    fn config(secret: Option<&str>) -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".into(),
            db_max_retries: 0,
            db_max_retry_delay_secs: 0,
            environment: Environment::Development,
            cors_allowed_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            jwt: JwtConfig {
                secret: secret.map(str::to_string),
                issuer: "movies-api".into(),
                audience: "movies-api-clients".into(),
            },
        }
    }

    fn app_with(repository: Arc<dyn MovieRepository>, secret: Option<&str>) -> Router {
        let config = config(secret);
        let state = AppState {
            movies: MovieService::new(repository),
            tokens: TokenService::new(&config.jwt),
            config: Arc::new(config),
        };
        router(Arc::new(state))
    }

    async fn app() -> Router {
        let db = db::connect_in_memory().await.unwrap();
        app_with(Arc::new(SeaOrmMovieRepository::new(db)), Some(SECRET))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            },
            None => Body::empty(),
        };
        app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn token(app: &Router) -> String {
        let resp = send(app, Method::GET, "/api/v2/Token", None, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        read_json::<TokenResponse>(resp).await.token
    }

    fn interstellar() -> Value {
        json!({
            "title": "Interstellar",
            "rating": 9,
            "synopsis": "A team travels through a wormhole.",
            "year": 2014,
            "styles": ["Sci-Fi", "Drama", "Adventure"],
            "length": 169,
            "trailerLink": "https://example.com/interstellar",
            "realisators": ["Christopher Nolan"],
            "scenarists": ["Jonathan Nolan", "Christopher Nolan"],
            "actors": ["Matthew McConaughey", "Anne Hathaway", "Jessica Chastain"],
            "producers": ["Emma Thomas", "Lynda Obst"]
        })
    }

    #[tokio::test]
    async fn movie_lifecycle_over_http() {
        let app = app().await;
        let token = token(&app).await;
        let t = Some(token.as_str());

        let created = send(&app, Method::POST, "/api/v2/Movie", t, Some(interstellar())).await;
        assert_eq!(created.status(), StatusCode::OK);
        let location = created.headers()[LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/api/v2/Movie/"));
        assert_eq!(text(created).await, routes::CREATED_MESSAGE);

        let dup = send(&app, Method::POST, "/api/v2/Movie", t, Some(interstellar())).await;
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        let err: ErrorResponse = read_json(dup).await;
        assert_eq!(err.status_code, 409);
        assert!(err.message.contains("Interstellar") && err.message.contains("2014"));

        let got = send(&app, Method::GET, &location, t, None).await;
        assert_eq!(got.status(), StatusCode::OK);
        let movie: MovieResponse = read_json(got).await;
        assert_eq!(movie.title, "Interstellar");
        assert_eq!(movie.year, 2014);
        assert_eq!(movie.styles, ["Sci-Fi", "Drama", "Adventure"]);
        assert_eq!(movie.actors, ["Matthew McConaughey", "Anne Hathaway", "Jessica Chastain"]);
        assert_eq!(movie.scenarists, ["Jonathan Nolan", "Christopher Nolan"]);
        assert_eq!(movie.trailer_link, "https://example.com/interstellar");

        let mut changed = interstellar();
        changed["year"] = json!(2015);
        let updated = send(&app, Method::PUT, &location, t, Some(changed)).await;
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(text(updated).await, routes::UPDATED_MESSAGE);

        let got = send(&app, Method::GET, &location, t, None).await;
        assert_eq!(read_json::<MovieResponse>(got).await.year, 2015);

        let deleted = send(&app, Method::DELETE, &location, t, None).await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(text(deleted).await, routes::DELETED_MESSAGE);

        let gone = send(&app, Method::GET, &location, t, None).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let err: ErrorResponse = read_json(gone).await;
        assert_eq!(err.status_code, 404);
        assert!(err.message.contains(location.rsplit('/').next().unwrap()));
    }

    #[tokio::test]
    async fn both_versions_share_the_same_catalog() {
        let app = app().await;
        let token = token(&app).await;
        let t = Some(token.as_str());

        let created = send(&app, Method::POST, "/api/v1/Movie", t, Some(interstellar())).await;
        assert_eq!(created.status(), StatusCode::OK);
        assert!(created.headers()[LOCATION].to_str().unwrap().starts_with("/api/v1/Movie/"));
        assert_eq!(created.headers()["api-deprecated-versions"], DEPRECATED_VERSIONS);
        assert_eq!(created.headers()["api-supported-versions"], SUPPORTED_VERSIONS);

        let listed = send(&app, Method::GET, "/api/v2/Movie", t, None).await;
        let movies: Vec<MovieResponse> = read_json(listed).await;
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].producers, ["Emma Thomas", "Lynda Obst"]);
    }

    #[tokio::test]
    async fn update_onto_a_taken_pair_conflicts() {
        let app = app().await;
        let token = token(&app).await;
        let t = Some(token.as_str());

        send(&app, Method::POST, "/api/v2/Movie", t, Some(interstellar())).await;
        let tenet = json!({"title": "Tenet", "year": 2020});
        let other = send(&app, Method::POST, "/api/v2/Movie", t, Some(tenet.clone())).await;
        let location = other.headers()[LOCATION].to_str().unwrap().to_string();

        let taken = json!({"title": "Interstellar", "year": 2014});
        let resp = send(&app, Method::PUT, &location, t, Some(taken)).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let missing = format!("/api/v2/Movie/{}", Uuid::new_v4());
        let resp = send(&app, Method::PUT, &missing, t, Some(tenet)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = send(&app, Method::DELETE, &missing, t, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_service() {
        let app = app().await;
        let token = token(&app).await;
        let t = Some(token.as_str());

        let bad = json!({"rating": 12, "year": 1800});
        let resp = send(&app, Method::POST, "/api/v2/Movie", t, Some(bad)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = read_json(resp).await;
        assert_eq!(err.status_code, 400);
        let fields: Vec<_> = err.errors.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["title", "rating", "year"]);

        let malformed = Request::post("/api/v2/Movie")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.clone().oneshot(malformed).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(&app, Method::GET, "/api/v2/Movie/not-a-uuid", t, None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let created = send(&app, Method::POST, "/api/v2/Movie", t, Some(interstellar())).await;
        let location = created.headers()[LOCATION].to_str().unwrap().to_string();
        let resp = send(&app, Method::PUT, &location, t, Some(json!({"title": ""}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = read_json(resp).await;
        assert!(err.errors.iter().any(|v| v.field == "title"));

        let missing = format!("/api/v2/Movie/{}", Uuid::new_v4());
        let resp = send(&app, Method::PUT, &missing, t, Some(json!({"title": ""}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let listed = send(&app, Method::GET, "/api/v2/Movie", t, None).await;
        let listed: Vec<MovieResponse> = read_json(listed).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Interstellar");
    }

    #[tokio::test]
    async fn movie_routes_require_a_valid_bearer_token() {
        let app = app().await;

        let resp = send(&app, Method::GET, "/api/v2/Movie", None, None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json::<ErrorResponse>(resp).await.message, UNAUTHORIZED_MESSAGE);

        let resp = send(&app, Method::GET, "/api/v2/Movie", Some("not.a.jwt"), None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let foreign = TokenService::new(&JwtConfig {
            secret: Some("another-secret".into()),
            issuer: "movies-api".into(),
            audience: "movies-api-clients".into(),
        })
        .issue()
        .unwrap();
        let resp =
            send(&app, Method::POST, "/api/v1/Movie", Some(foreign.as_str()), Some(interstellar()))
                .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_without_secret_is_a_server_error() {
        let db = db::connect_in_memory().await.unwrap();
        let app = app_with(Arc::new(SeaOrmMovieRepository::new(db)), None);

        let resp = send(&app, Method::GET, "/api/v1/Token", None, None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorResponse = read_json(resp).await;
        assert_eq!(err.message, "JWT secret is missing in configuration.");

        let resp = send(&app, Method::GET, "/api/v1/Movie", Some("anything"), None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    struct BrokenRepository;

    #[async_trait]
    impl MovieRepository for BrokenRepository {
        async fn get_all(&self) -> StoreResult<Vec<Movie>> {
            Err(StoreError::InvalidData("connection reset by peer at 10.0.0.7".into()))
        }

        async fn get_by_id(&self, _id: Uuid) -> StoreResult<Option<Movie>> {
            Err(StoreError::InvalidData("connection reset by peer at 10.0.0.7".into()))
        }

        async fn exists_by_title_year(&self, _title: &str, _year: i32) -> StoreResult<bool> {
            Ok(false)
        }

        async fn save_changes(&self, _changes: ChangeSet) -> StoreResult<()> {
            Err(StoreError::InvalidData("connection reset by peer at 10.0.0.7".into()))
        }
    }

    #[tokio::test]
    async fn unexpected_failures_never_leak_detail() {
        let app = app_with(Arc::new(BrokenRepository), Some(SECRET));
        let token = token(&app).await;
        let t = Some(token.as_str());

        for (method, uri, body) in [
            (Method::GET, "/api/v2/Movie".to_string(), None),
            (Method::GET, format!("/api/v2/Movie/{}", Uuid::new_v4()), None),
            (Method::POST, "/api/v2/Movie".to_string(), Some(interstellar())),
        ] {
            let resp = send(&app, method, &uri, t, body).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let raw = text(resp).await;
            assert!(!raw.contains("10.0.0.7"), "{raw}");
            let err: ErrorResponse = serde_json::from_str(&raw).unwrap();
            assert_eq!(err.status_code, 500);
            assert_eq!(err.message, UNEXPECTED_MESSAGE);
        }
    }

    struct PanickingRepository;

    #[async_trait]
    impl MovieRepository for PanickingRepository {
        async fn get_all(&self) -> StoreResult<Vec<Movie>> {
            panic!("Real technical error!")
        }

        async fn get_by_id(&self, _id: Uuid) -> StoreResult<Option<Movie>> {
            panic!("Real technical error!")
        }

        async fn exists_by_title_year(&self, _title: &str, _year: i32) -> StoreResult<bool> {
            panic!("Real technical error!")
        }

        async fn save_changes(&self, _changes: ChangeSet) -> StoreResult<()> {
            panic!("Real technical error!")
        }
    }

    #[tokio::test]
    async fn panics_keep_the_version_headers() {
        let app = app_with(Arc::new(PanickingRepository), Some(SECRET));
        let token = token(&app).await;

        let resp = send(&app, Method::GET, "/api/v2/Movie", Some(token.as_str()), None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()["api-supported-versions"], SUPPORTED_VERSIONS);
        assert_eq!(resp.headers()["api-deprecated-versions"], DEPRECATED_VERSIONS);
        let err: ErrorResponse = read_json(resp).await;
        assert_eq!(err.message, UNEXPECTED_MESSAGE);
    }
}
