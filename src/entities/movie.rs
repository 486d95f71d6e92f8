use sea_orm::{Set, entity::prelude::*};

use crate::{models::Movie, repository::StoreError};

/// List-valued columns hold a JSON array of strings.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub rating: i32,
    pub synopsis: String,
    pub year: i32,
    pub styles: String,
    pub length: i32,
    pub trailer_link: String,
    pub realisators: String,
    pub scenarists: String,
    pub actors: String,
    pub producers: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn encode_list(values: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(values).map_err(|e| StoreError::InvalidData(e.to_string()))
}

pub fn decode_list(column: &str, raw: &str) -> Result<Vec<String>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| StoreError::InvalidData(format!("column {column} is not a string list: {e}")))
}

/// Element-wise comparison; two lists are the same when they hold equal
/// strings in the same order, wherever they were allocated.
pub fn same_list(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

impl TryFrom<Model> for Movie {
    type Error = StoreError;

    fn try_from(row: Model) -> Result<Self, Self::Error> {
        Ok(Movie {
            id: row.id,
            styles: decode_list("styles", &row.styles)?,
            realisators: decode_list("realisators", &row.realisators)?,
            scenarists: decode_list("scenarists", &row.scenarists)?,
            actors: decode_list("actors", &row.actors)?,
            producers: decode_list("producers", &row.producers)?,
            title: row.title,
            rating: row.rating,
            synopsis: row.synopsis,
            year: row.year,
            length: row.length,
            trailer_link: row.trailer_link,
        })
    }
}

pub fn insert_model(movie: &Movie) -> Result<ActiveModel, StoreError> {
    Ok(ActiveModel {
        id: Set(movie.id),
        title: Set(movie.title.clone()),
        rating: Set(movie.rating),
        synopsis: Set(movie.synopsis.clone()),
        year: Set(movie.year),
        styles: Set(encode_list(&movie.styles)?),
        length: Set(movie.length),
        trailer_link: Set(movie.trailer_link.clone()),
        realisators: Set(encode_list(&movie.realisators)?),
        scenarists: Set(encode_list(&movie.scenarists)?),
        actors: Set(encode_list(&movie.actors)?),
        producers: Set(encode_list(&movie.producers)?),
    })
}

/// Builds an update touching only the columns whose value differs between
/// `original` and `updated`. Returns `None` when nothing changed.
pub fn update_model(original: &Movie, updated: &Movie) -> Result<Option<ActiveModel>, StoreError> {
    let mut model = ActiveModel { id: Set(original.id), ..Default::default() };
    let mut dirty = false;

    macro_rules! scalar {
        ($field:ident) => {
            if original.$field != updated.$field {
                model.$field = Set(updated.$field.clone());
                dirty = true;
            }
        };
    }
    macro_rules! list {
        ($field:ident) => {
            if !same_list(&original.$field, &updated.$field) {
                model.$field = Set(encode_list(&updated.$field)?);
                dirty = true;
            }
        };
    }

    scalar!(title);
    scalar!(rating);
    scalar!(synopsis);
    scalar!(year);
    scalar!(length);
    scalar!(trailer_link);
    list!(styles);
    list!(realisators);
    list!(scenarists);
    list!(actors);
    list!(producers);

    Ok(dirty.then_some(model))
}
