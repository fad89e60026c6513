use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::models::Genre;

/// Failure kinds at the upstream boundary. Callers pick their own fallback;
/// pages use [`or_no_data`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("resource not found")]
    NotFound,
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Collapses any upstream failure into "no data". The failure itself was
/// already logged by the client.
pub fn or_no_data<T: Default>(result: UpstreamResult<T>, what: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            debug!("No {} from TMDB ({})", what, e);
            T::default()
        }
    }
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self) -> UpstreamResult<Vec<Genre>>;
    async fn search_movie(&self, query: &TextSearch) -> UpstreamResult<Vec<MovieRecord>>;
    async fn discover_movie(&self, query: &Discover) -> UpstreamResult<Vec<MovieRecord>>;
    async fn movie_with_extras(&self, id: u64) -> UpstreamResult<MovieDetailRecord>;
}

/// `/search/movie` query shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub query: String,
    pub year: Option<u32>,
}

impl TextSearch {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.query.clone()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        params
    }
}

/// `/discover/movie` query shape, always sorted by popularity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discover {
    pub with_genres: Option<u32>,
    pub primary_release_year: Option<u32>,
}

impl Discover {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(genre) = self.with_genres {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.primary_release_year {
            params.push(("primary_release_year", year.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: Arc<Config>,
}

impl TmdbClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let user_agent = format!("cinesearch/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self { client, config })
    }

    /// GET `path` with `params` as the query string. The API key is always
    /// added; `language` only when the caller did not set one.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> UpstreamResult<T> {
        params.push(("api_key", self.config.api_key.clone()));
        if !params.iter().any(|(k, _)| *k == "language") {
            params.push(("language", self.config.language.clone()));
        }
        let url = format!("{}{}", self.config.api_base, path);
        debug!(path = %path, "TMDB request");

        // without_url keeps the api key out of logs and error messages
        let res = match self.client.get(&url).query(&params).send().await {
            Ok(res) => res,
            Err(e) => {
                let e = e.without_url();
                warn!("TMDB request {} failed: {}", path, e);
                return Err(e.into());
            }
        };
        let status = res.status();
        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => {
                let e = e.without_url();
                warn!("TMDB response {} unreadable: {}", path, e);
                return Err(e.into());
            }
        };

        if status == StatusCode::NOT_FOUND {
            warn!("TMDB error: {} {} {}", path, status, text);
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            error!("TMDB error: {} {} {}", path, status, text);
            return Err(UpstreamError::Status { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| {
            warn!("TMDB response {} did not parse: {}", path, e);
            UpstreamError::from(e)
        })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self) -> UpstreamResult<Vec<Genre>> {
        let data: GenreList = self.get_json("/genre/movie/list", Vec::new()).await?;
        Ok(data.genres)
    }

    async fn search_movie(&self, query: &TextSearch) -> UpstreamResult<Vec<MovieRecord>> {
        let page: ResultPage = self.get_json("/search/movie", query.params()).await?;
        Ok(page.results)
    }

    async fn discover_movie(&self, query: &Discover) -> UpstreamResult<Vec<MovieRecord>> {
        let page: ResultPage = self.get_json("/discover/movie", query.params()).await?;
        Ok(page.results)
    }

    async fn movie_with_extras(&self, id: u64) -> UpstreamResult<MovieDetailRecord> {
        self.get_json(
            &format!("/movie/{id}"),
            vec![("append_to_response", "videos,watch/providers".to_string())],
        )
        .await
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultPage {
    #[serde(default)]
    results: Vec<MovieRecord>,
}

/// One entry of a search or discover result page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// `/movie/{id}` with `videos` and `watch/providers` appended. `id` is
/// optional so an empty body decodes to "no movie".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieDetailRecord {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub videos: VideoList,
    #[serde(rename = "watch/providers", default)]
    pub watch_providers: WatchProviders,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Video {
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionProviders {
    pub flatrate: Option<Vec<Provider>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Provider {
    pub provider_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TmdbClient {
        let config = Config::new("test-key").with_api_base(server.uri());
        TmdbClient::new(Arc::new(config)).expect("client builds")
    }

    #[test]
    fn text_search_params_include_year_only_when_set() {
        let q = TextSearch {
            query: "alien".to_string(),
            year: None,
        };
        assert_eq!(
            q.params(),
            vec![
                ("query", "alien".to_string()),
                ("include_adult", "false".to_string())
            ]
        );
        let q = TextSearch {
            query: "alien".to_string(),
            year: Some(1979),
        };
        assert!(q.params().contains(&("year", "1979".to_string())));
    }

    #[test]
    fn discover_params_always_sort_by_popularity() {
        let params = Discover::default().params();
        assert_eq!(
            params,
            vec![
                ("sort_by", "popularity.desc".to_string()),
                ("include_adult", "false".to_string())
            ]
        );
        let params = Discover {
            with_genres: Some(27),
            primary_release_year: Some(1999),
        }
        .params();
        assert!(params.contains(&("with_genres", "27".to_string())));
        assert!(params.contains(&("primary_release_year", "1999".to_string())));
    }

    #[tokio::test]
    async fn injects_api_key_and_default_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [{ "id": 28, "name": "Action" }, { "id": 35, "name": "Comedy" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let genres = client.genres().await.expect("genres");
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].name, "Comedy");
    }

    #[tokio::test]
    async fn caller_language_is_not_overridden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .and(query_param("language", "fr-FR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "genres": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let data: serde_json::Value = client
            .get_json("/genre/movie/list", vec![("language", "fr-FR".to_string())])
            .await
            .expect("json");
        assert_eq!(data, json!({ "genres": [] }));
    }

    #[tokio::test]
    async fn maps_statuses_to_error_kinds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.movie_with_extras(1).await,
            Err(UpstreamError::NotFound)
        ));
        match client.movie_with_extras(2).await {
            Err(UpstreamError::Status { status, body }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "down");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(matches!(
            client.movie_with_extras(3).await,
            Err(UpstreamError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // nothing listens on port 1
        let config = Config::new("test-key").with_api_base("http://127.0.0.1:1");
        let client = TmdbClient::new(Arc::new(config)).expect("client builds");
        let res = client.genres().await;
        assert!(matches!(res, Err(UpstreamError::Transport(_))));
        assert!(or_no_data(res, "genres").is_empty());
    }

    #[tokio::test]
    async fn requests_detail_with_appended_resources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .and(query_param("append_to_response", "videos,watch/providers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 603,
                "title": "The Matrix",
                "vote_average": 8.2,
                "genres": [{ "id": 28, "name": "Action" }],
                "videos": { "results": [{ "site": "YouTube", "type": "Trailer", "key": "m8e-FF8MsqU" }] },
                "watch/providers": { "results": { "US": { "flatrate": [{ "provider_name": "Max" }] } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let record = client.movie_with_extras(603).await.expect("detail");
        assert_eq!(record.id, Some(603));
        assert_eq!(record.videos.results.len(), 1);
        assert!(record.watch_providers.results.contains_key("US"));
    }

    #[test]
    fn empty_detail_body_has_no_id() {
        let record: MovieDetailRecord = serde_json::from_str("{}").expect("decode");
        assert_eq!(record.id, None);
        assert!(record.genres.is_empty());
    }
}
