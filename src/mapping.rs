use uuid::Uuid;

use crate::models::{Movie, MovieData, MovieRequest, MovieResponse};

/// Only meaningful after the request passed validation; a missing year maps
/// to 0, which validation never lets through.
impl From<MovieRequest> for MovieData {
    fn from(req: MovieRequest) -> Self {
        Self {
            title: req.title.unwrap_or_default(),
            rating: req.rating,
            synopsis: req.synopsis,
            year: req.year.unwrap_or_default(),
            styles: req.styles,
            length: req.length,
            trailer_link: req.trailer_link,
            realisators: req.realisators,
            scenarists: req.scenarists,
            actors: req.actors,
            producers: req.producers,
        }
    }
}

impl MovieData {
    pub fn into_movie(self, id: Uuid) -> Movie {
        Movie {
            id,
            title: self.title,
            rating: self.rating,
            synopsis: self.synopsis,
            year: self.year,
            styles: self.styles,
            length: self.length,
            trailer_link: self.trailer_link,
            realisators: self.realisators,
            scenarists: self.scenarists,
            actors: self.actors,
            producers: self.producers,
        }
    }
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            rating: movie.rating,
            synopsis: movie.synopsis,
            year: movie.year,
            styles: movie.styles,
            length: movie.length,
            trailer_link: movie.trailer_link,
            realisators: movie.realisators,
            scenarists: movie.scenarists,
            actors: movie.actors,
            producers: movie.producers,
        }
    }
}
