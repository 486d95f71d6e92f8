use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    SqlErr, TransactionTrait,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    entities::movie::{self, insert_model, update_model},
    models::Movie,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::UniqueViolation(detail),
            _ => Self::Database(err),
        }
    }
}

#[derive(Clone, Debug)]
pub enum PendingChange {
    Add(Movie),
    Update { original: Movie, updated: Movie },
    Delete(Movie),
}

/// Writes staged by one request, applied together by
/// [`MovieRepository::save_changes`].
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    pending: Vec<PendingChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, movie: Movie) {
        self.pending.push(PendingChange::Add(movie));
    }

    pub fn update(&mut self, original: Movie, updated: Movie) {
        self.pending.push(PendingChange::Update { original, updated });
    }

    pub fn delete(&mut self, movie: Movie) {
        self.pending.push(PendingChange::Delete(movie));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn into_changes(self) -> Vec<PendingChange> {
        self.pending
    }
}

/// Data access for movie records. Absence is `None`, never an error.
#[async_trait]
pub trait MovieRepository: Send + Sync + 'static {
    async fn get_all(&self) -> StoreResult<Vec<Movie>>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Movie>>;

    async fn exists_by_title_year(&self, title: &str, year: i32) -> StoreResult<bool>;

    /// Applies every staged write in a single transaction.
    async fn save_changes(&self, changes: ChangeSet) -> StoreResult<()>;
}

#[derive(Clone, Debug)]
pub struct SeaOrmMovieRepository {
    db: DatabaseConnection,
}

impl SeaOrmMovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieRepository for SeaOrmMovieRepository {
    async fn get_all(&self) -> StoreResult<Vec<Movie>> {
        movie::Entity::find()
            .order_by_asc(movie::Column::Title)
            .order_by_asc(movie::Column::Year)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Movie::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Movie>> {
        movie::Entity::find_by_id(id).one(&self.db).await?.map(Movie::try_from).transpose()
    }

    async fn exists_by_title_year(&self, title: &str, year: i32) -> StoreResult<bool> {
        let count = movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .filter(movie::Column::Year.eq(year))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn save_changes(&self, changes: ChangeSet) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;

        for change in changes.into_changes() {
            match change {
                PendingChange::Add(movie) => {
                    movie::Entity::insert(insert_model(&movie)?).exec_without_returning(&txn).await?;
                },
                PendingChange::Update { original, updated } => {
                    let Some(model) = update_model(&original, &updated)? else {
                        debug!(id = %original.id, "update left every column unchanged");
                        continue;
                    };
                    movie::Entity::update(model).exec(&txn).await?;
                },
                PendingChange::Delete(movie) => {
                    movie::Entity::delete_by_id(movie.id).exec(&txn).await?;
                },
            }
        }

        txn.commit().await?;

        Ok(())
    }
}
