use serde::{Deserialize, Serialize};

use crate::tmdb::MovieRecord;

pub const EXCERPT_CHARS: usize = 230;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// List-view projection of a search or discover result.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: Option<String>,
    pub overview_excerpt: String,
    pub excerpt_truncated: bool,
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub year: String,
}

impl MovieSummary {
    pub fn from_record(record: &MovieRecord, image_base: &str) -> Self {
        let overview = record.overview.as_deref().unwrap_or_default();
        let overview_excerpt = excerpt(overview, EXCERPT_CHARS);
        Self {
            id: record.id,
            title: record.title.clone(),
            excerpt_truncated: overview_excerpt.len() < overview.len(),
            overview_excerpt,
            poster_url: poster_url(image_base, record.poster_path.as_deref()),
            rating: round_rating(record.vote_average),
            vote_count: record.vote_count,
            year: release_year(record.release_date.as_deref()),
        }
    }
}

/// Detail-view projection: summary fields plus enrichment.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub year: String,
    pub genres: Vec<String>,
    pub trailer_url: Option<String>,
    pub providers: Vec<String>,
}

pub fn poster_url(image_base: &str, poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{image_base}{p}"))
}

/// One decimal place, rounding the exact binary value with ties to even, so
/// 7.25 shows as 7.2. Zero is a real score; only a missing value is "no rating".
pub fn round_rating(vote_average: Option<f64>) -> Option<f64> {
    vote_average.and_then(|v| format!("{v:.1}").parse().ok())
}

pub fn release_year(release_date: Option<&str>) -> String {
    release_date
        .map(|d| d.chars().take(4).collect())
        .unwrap_or_default()
}

pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG: &str = "https://image.tmdb.org/t/p/w342";

    #[test]
    fn zero_rating_is_kept_and_null_is_absent() {
        assert_eq!(round_rating(Some(0.0)), Some(0.0));
        assert_eq!(round_rating(None), None);
        assert_eq!(round_rating(Some(6.04)), Some(6.0));
        assert_eq!(round_rating(Some(8.433)), Some(8.4));
    }

    #[test]
    fn rating_ties_round_on_exact_binary_value() {
        let cases = [
            (7.25, 7.2),
            (6.35, 6.3),
            (8.45, 8.4),
            (7.65, 7.7),
            (5.05, 5.0),
        ];
        for (raw, shown) in cases {
            assert_eq!(round_rating(Some(raw)), Some(shown), "rating {raw}");
        }
    }

    #[test]
    fn zero_vote_average_survives_json_decode() {
        let record: MovieRecord =
            serde_json::from_str(r#"{"id": 1, "vote_average": 0}"#).expect("decode");
        assert_eq!(MovieSummary::from_record(&record, IMG).rating, Some(0.0));
        let record: MovieRecord =
            serde_json::from_str(r#"{"id": 1, "vote_average": null}"#).expect("decode");
        assert_eq!(MovieSummary::from_record(&record, IMG).rating, None);
    }

    #[test]
    fn year_is_first_four_chars_or_empty() {
        assert_eq!(release_year(Some("1999-03-31")), "1999");
        assert_eq!(release_year(Some("")), "");
        assert_eq!(release_year(None), "");
    }

    #[test]
    fn poster_needs_a_path() {
        assert_eq!(
            poster_url(IMG, Some("/abc.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w342/abc.jpg")
        );
        assert_eq!(poster_url(IMG, Some("")), None);
        assert_eq!(poster_url(IMG, None), None);
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let long = "é".repeat(300);
        let cut = excerpt(&long, EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), 230);
        assert_eq!(excerpt("short", EXCERPT_CHARS), "short");
    }

    #[test]
    fn summary_flags_only_cut_overviews() {
        let short = MovieRecord {
            id: 1,
            overview: Some("A short plot.".to_string()),
            ..Default::default()
        };
        assert!(!MovieSummary::from_record(&short, IMG).excerpt_truncated);

        let exact = MovieRecord {
            id: 2,
            overview: Some("é".repeat(EXCERPT_CHARS)),
            ..Default::default()
        };
        assert!(!MovieSummary::from_record(&exact, IMG).excerpt_truncated);

        let long = MovieRecord {
            id: 3,
            overview: Some("y".repeat(EXCERPT_CHARS + 1)),
            ..Default::default()
        };
        assert!(MovieSummary::from_record(&long, IMG).excerpt_truncated);
    }

    #[test]
    fn summary_from_sparse_record() {
        let record = MovieRecord {
            id: 42,
            ..Default::default()
        };
        let summary = MovieSummary::from_record(&record, IMG);
        assert_eq!(summary.id, 42);
        assert_eq!(summary.overview_excerpt, "");
        assert!(!summary.excerpt_truncated);
        assert_eq!(summary.poster_url, None);
        assert_eq!(summary.year, "");
        assert_eq!(summary.vote_count, None);
    }
}
