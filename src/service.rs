use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    models::{Movie, MovieData},
    repository::{ChangeSet, MovieRepository, StoreError},
};

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("A movie with the title '{title}' and year {year} already exists.")]
    AlreadyExists { title: String, year: i32 },
    #[error("The movie with ID '{0}' was not found.")]
    NotFound(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type MovieResult<T> = Result<T, MovieError>;

/// Enforces the (title, year) uniqueness and existence rules on top of a
/// [`MovieRepository`].
///
/// Uniqueness is checked before writing so callers get a clean
/// `AlreadyExists`; the store's unique index still has the final word and a
/// violation reported by it maps to the same error.
#[derive(Clone)]
pub struct MovieService {
    repository: Arc<dyn MovieRepository>,
}

impl MovieService {
    pub fn new(repository: Arc<dyn MovieRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, data: MovieData) -> MovieResult<Movie> {
        if self.repository.exists_by_title_year(&data.title, data.year).await? {
            return Err(already_exists(&data.title, data.year));
        }

        let movie = data.into_movie(Uuid::new_v4());
        let mut changes = ChangeSet::new();
        changes.add(movie.clone());
        self.save(changes, &movie).await?;

        info!(id = %movie.id, title = %movie.title, year = movie.year, "movie created");
        Ok(movie)
    }

    pub async fn get_all(&self) -> MovieResult<Vec<Movie>> {
        Ok(self.repository.get_all().await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> MovieResult<Movie> {
        self.repository.get_by_id(id).await?.ok_or(MovieError::NotFound(id))
    }

    pub async fn update(&self, id: Uuid, data: MovieData) -> MovieResult<Movie> {
        let existing = self.get_by_id(id).await?;

        if (!existing.title.eq_ignore_ascii_case(&data.title) || existing.year != data.year)
            && self.repository.exists_by_title_year(&data.title, data.year).await?
        {
            return Err(already_exists(&data.title, data.year));
        }

        let updated = data.into_movie(id);
        let mut changes = ChangeSet::new();
        changes.update(existing, updated.clone());
        self.save(changes, &updated).await?;

        info!(id = %id, "movie updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> MovieResult<()> {
        let existing = self.get_by_id(id).await?;

        let mut changes = ChangeSet::new();
        changes.delete(existing);
        self.repository.save_changes(changes).await?;

        info!(id = %id, "movie deleted");
        Ok(())
    }

    async fn save(&self, changes: ChangeSet, written: &Movie) -> MovieResult<()> {
        match self.repository.save_changes(changes).await {
            Ok(()) => Ok(()),
            Err(StoreError::UniqueViolation(detail)) => {
                debug!(%detail, "store rejected duplicate title/year");
                Err(already_exists(&written.title, written.year))
            },
            Err(err) => Err(err.into()),
        }
    }
}

fn already_exists(title: &str, year: i32) -> MovieError {
    MovieError::AlreadyExists { title: title.to_string(), year }
}
