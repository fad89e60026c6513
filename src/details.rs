use tracing::info;

use crate::models::{poster_url, release_year, round_rating, MovieDetail};
use crate::tmdb::{or_no_data, MovieDetailRecord, TmdbApi, Video, WatchProviders};

/// "Where to watch" is only resolved for this region.
pub const WATCH_REGION: &str = "US";

/// Fetches one movie with its videos and watch providers. `None` covers both
/// an unknown id and any upstream failure.
pub async fn get_movie_details(
    api: &dyn TmdbApi,
    image_base: &str,
    movie_id: u64,
) -> Option<MovieDetail> {
    let record = or_no_data(api.movie_with_extras(movie_id).await, "movie details");
    let detail = shape_detail(record, image_base)?;
    info!(
        "Loaded movie {} '{}' ({} providers)",
        detail.id,
        detail.title.as_deref().unwrap_or_default(),
        detail.providers.len()
    );
    Some(detail)
}

pub fn shape_detail(record: MovieDetailRecord, image_base: &str) -> Option<MovieDetail> {
    let id = record.id?;
    let trailer_url = select_trailer(&record.videos.results);
    let providers = flatrate_providers(&record.watch_providers, WATCH_REGION);
    Some(MovieDetail {
        id,
        poster_url: poster_url(image_base, record.poster_path.as_deref()),
        rating: round_rating(record.vote_average),
        vote_count: record.vote_count,
        year: release_year(record.release_date.as_deref()),
        genres: record.genres.into_iter().map(|g| g.name).collect(),
        title: record.title,
        overview: record.overview,
        trailer_url,
        providers,
    })
}

/// First YouTube trailer in upstream order.
pub fn select_trailer(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|v| {
            v.site.as_deref() == Some("YouTube") && v.video_type.as_deref() == Some("Trailer")
        })
        .and_then(|v| v.key.as_deref())
        .map(|key| format!("https://www.youtube.com/watch?v={key}"))
}

/// Subscription provider names for `region`, in upstream order.
pub fn flatrate_providers(providers: &WatchProviders, region: &str) -> Vec<String> {
    providers
        .results
        .get(region)
        .and_then(|r| r.flatrate.as_ref())
        .map(|list| {
            list.iter()
                .filter_map(|p| p.provider_name.as_deref())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
