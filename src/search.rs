use serde::Deserialize;
use tracing::info;

use crate::models::Genre;
use crate::tmdb::{or_no_data, Discover, MovieRecord, TextSearch, TmdbApi};

/// Raw fields posted by the search form. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    pub title: Option<String>,
    pub genre_id: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub genre_id: Option<u32>,
    pub year: Option<u32>,
}

impl SearchCriteria {
    pub fn from_form(form: &SearchForm) -> Self {
        let title = form
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            title,
            genre_id: form.genre_id.as_deref().and_then(parse_non_negative),
            year: form.year.as_deref().and_then(parse_non_negative),
        }
    }
}

/// Accepts only a plain run of ASCII digits; anything else means "no filter".
pub fn parse_non_negative(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Text search when a title is given (genre filtered locally), otherwise a
/// popularity-sorted discover query with genre and year passed upstream.
pub async fn search_movies(api: &dyn TmdbApi, criteria: &SearchCriteria) -> Vec<MovieRecord> {
    match &criteria.title {
        Some(title) => {
            let query = TextSearch {
                query: title.clone(),
                year: criteria.year,
            };
            let results = or_no_data(api.search_movie(&query).await, "search results");
            let results = match criteria.genre_id {
                Some(genre_id) => filter_by_genre(results, genre_id),
                None => results,
            };
            info!("Search '{}' returned {} movies", title, results.len());
            results
        }
        None => {
            let query = Discover {
                with_genres: criteria.genre_id,
                primary_release_year: criteria.year,
            };
            let results = or_no_data(api.discover_movie(&query).await, "discover results");
            info!(
                genre = ?criteria.genre_id,
                year = ?criteria.year,
                "Discover returned {} movies",
                results.len()
            );
            results
        }
    }
}

pub fn filter_by_genre(records: Vec<MovieRecord>, genre_id: u32) -> Vec<MovieRecord> {
    let genre_id = i64::from(genre_id);
    records
        .into_iter()
        .filter(|m| m.genre_ids.contains(&genre_id))
        .collect()
}

pub fn genre_name(genres: &[Genre], genre_id: u32) -> Option<String> {
    let genre_id = i64::from(genre_id);
    genres
        .iter()
        .find(|g| g.id == genre_id)
        .map(|g| g.name.clone())
}
