use std::sync::Arc;

use axum::{
    Json,
    extract::{
        OriginalUri, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{MovieData, MovieRequest, MovieResponse, TokenResponse},
    validation,
};

pub const CREATED_MESSAGE: &str = "Movie created successfully.";
pub const UPDATED_MESSAGE: &str = "Movie updated successfully.";
pub const DELETED_MESSAGE: &str = "Movie deleted successfully.";

fn movie_data(body: Result<Json<MovieRequest>, JsonRejection>) -> AppResult<MovieData> {
    let Json(req) = body?;
    validation::validate(&req)?;
    Ok(MovieData::from(req))
}

fn movie_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    let Path(id) = path?;
    Ok(id)
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<MovieRequest>, JsonRejection>,
) -> AppResult<Response> {
    let data = movie_data(body)?;
    let movie = state.movies.create(data).await?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), movie.id);
    let location = HeaderValue::try_from(location).map_err(|e| AppError::Unexpected(e.into()))?;

    Ok((StatusCode::OK, [(LOCATION, location)], CREATED_MESSAGE).into_response())
}

pub async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieResponse>>> {
    let movies = state.movies.get_all().await?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<MovieResponse>> {
    let movie = state.movies.get_by_id(movie_id(path)?).await?;
    Ok(Json(movie.into()))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<MovieRequest>, JsonRejection>,
) -> AppResult<&'static str> {
    let id = movie_id(path)?;
    let data = movie_data(body)?;
    state.movies.update(id, data).await?;
    Ok(UPDATED_MESSAGE)
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<&'static str> {
    state.movies.delete(movie_id(path)?).await?;
    Ok(DELETED_MESSAGE)
}

pub async fn token(State(state): State<Arc<AppState>>) -> AppResult<Json<TokenResponse>> {
    let token = state.tokens.issue()?;
    Ok(Json(TokenResponse { token }))
}
