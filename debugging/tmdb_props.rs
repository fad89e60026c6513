//! Run a search or detail lookup against TMDB and print the shaped result.
//! Usage:
//!   cargo run --bin tmdb_props -- detail <tmdb_id>
//!   cargo run --bin tmdb_props -- search [title] [genre_id] [year]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Result};
use cinesearch::config::Config;
use cinesearch::details::get_movie_details;
use cinesearch::models::MovieSummary;
use cinesearch::search::{search_movies, SearchCriteria, SearchForm};
use cinesearch::tmdb::TmdbClient;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Arc::new(Config::from_env()?);
    let client = TmdbClient::new(config.clone())?;

    match args.first().map(String::as_str) {
        Some("detail") => {
            let id: u64 = args
                .get(1)
                .ok_or_else(|| anyhow!("detail needs a TMDB id"))?
                .parse()?;
            match get_movie_details(&client, &config.image_base, id).await {
                Some(movie) => println!("{}", serde_json::to_string_pretty(&movie)?),
                None => println!("movie {id} not found"),
            }
        }
        Some("search") => {
            let form = SearchForm {
                title: args.get(1).cloned(),
                genre_id: args.get(2).cloned(),
                year: args.get(3).cloned(),
            };
            let criteria = SearchCriteria::from_form(&form);
            eprintln!("criteria: {:?}", criteria);
            let movies: Vec<MovieSummary> = search_movies(&client, &criteria)
                .await
                .iter()
                .map(|m| MovieSummary::from_record(m, &config.image_base))
                .collect();
            println!("{}", serde_json::to_string_pretty(&movies)?);
        }
        _ => {
            return Err(anyhow!(
                "usage: tmdb_props detail <tmdb_id> | search [title] [genre_id] [year]"
            ))
        }
    }
    Ok(())
}
