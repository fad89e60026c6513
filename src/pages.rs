//! HTML pages. Every value that came from a user or from TMDB goes through
//! [`escape_html`] before it is written out.

use std::fmt::Write;

use crate::models::{Genre, MovieDetail, MovieSummary};

/// Search criteria as shown back on the results page.
#[derive(Debug, Clone, Default)]
pub struct SearchEcho {
    pub title: Option<String>,
    pub genre_name: Option<String>,
    pub year: Option<u32>,
}

pub fn render_index(genres: &[Genre]) -> String {
    let mut options = String::from("<option value=\"\">Any genre</option>\n");
    for genre in genres {
        let _ = writeln!(
            options,
            "<option value=\"{}\">{}</option>",
            genre.id,
            escape_html(&genre.name)
        );
    }
    let body = format!(
        r#"<h1>Find a movie</h1>
<form method="post" action="/search">
  <label>Title <input type="text" name="title" placeholder="e.g. The Matrix"></label>
  <label>Genre <select name="genre_id">
{options}</select></label>
  <label>Year <input type="text" name="year" inputmode="numeric" placeholder="e.g. 1999"></label>
  <button type="submit">Search</button>
</form>"#
    );
    layout("Movie search", &body)
}

pub fn render_results(movies: &[MovieSummary], echo: &SearchEcho) -> String {
    let mut body = String::from("<h1>Results</h1>\n");
    body.push_str(&criteria_line(echo));

    if movies.is_empty() {
        body.push_str("<p class=\"empty\">No movies matched your search.</p>\n");
    } else {
        body.push_str("<ul class=\"results\">\n");
        for movie in movies {
            body.push_str(&result_item(movie));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/\">New search</a></p>");
    layout("Search results", &body)
}

fn criteria_line(echo: &SearchEcho) -> String {
    let mut parts = Vec::new();
    if let Some(title) = &echo.title {
        parts.push(format!("title &ldquo;{}&rdquo;", escape_html(title)));
    }
    if let Some(genre) = &echo.genre_name {
        parts.push(format!("genre {}", escape_html(genre)));
    }
    if let Some(year) = echo.year {
        parts.push(format!("year {year}"));
    }
    if parts.is_empty() {
        "<p class=\"criteria\">Most popular movies</p>\n".to_string()
    } else {
        format!("<p class=\"criteria\">Searching by {}</p>\n", parts.join(", "))
    }
}

fn result_item(movie: &MovieSummary) -> String {
    let title = escape_html(movie.title.as_deref().unwrap_or("Untitled"));
    let mut item = String::from("<li class=\"movie\">\n");
    if let Some(poster) = &movie.poster_url {
        let _ = writeln!(
            item,
            "<img src=\"{}\" alt=\"{title} poster\" loading=\"lazy\">",
            escape_html(poster)
        );
    }
    let _ = write!(item, "<h2><a href=\"/movie/{}\">{title}</a>", movie.id);
    if !movie.year.is_empty() {
        let _ = write!(item, " <span class=\"year\">({})</span>", escape_html(&movie.year));
    }
    item.push_str("</h2>\n");
    item.push_str(&rating_line(movie.rating, movie.vote_count));
    if !movie.overview_excerpt.is_empty() {
        let ellipsis = if movie.excerpt_truncated { "&hellip;" } else { "" };
        let _ = writeln!(
            item,
            "<p>{}{ellipsis}</p>",
            escape_html(&movie.overview_excerpt)
        );
    }
    item.push_str("</li>\n");
    item
}

fn rating_line(rating: Option<f64>, votes: Option<u64>) -> String {
    match (rating, votes) {
        (Some(r), Some(v)) => format!("<p class=\"rating\">&#9733; {r:.1} ({v} votes)</p>\n"),
        (Some(r), None) => format!("<p class=\"rating\">&#9733; {r:.1}</p>\n"),
        (None, _) => "<p class=\"rating\">No rating</p>\n".to_string(),
    }
}

pub fn render_detail(movie: &MovieDetail) -> String {
    let title = escape_html(movie.title.as_deref().unwrap_or("Untitled"));
    let mut body = String::new();
    if let Some(poster) = &movie.poster_url {
        let _ = writeln!(
            body,
            "<img class=\"poster\" src=\"{}\" alt=\"{title} poster\">",
            escape_html(poster)
        );
    }
    let _ = write!(body, "<h1>{title}");
    if !movie.year.is_empty() {
        let _ = write!(body, " <span class=\"year\">({})</span>", escape_html(&movie.year));
    }
    body.push_str("</h1>\n");

    if !movie.genres.is_empty() {
        let genres: Vec<String> = movie.genres.iter().map(|g| escape_html(g)).collect();
        let _ = writeln!(body, "<p class=\"genres\">{}</p>", genres.join(" &middot; "));
    }
    body.push_str(&rating_line(movie.rating, movie.vote_count));
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        let _ = writeln!(body, "<p class=\"overview\">{}</p>", escape_html(overview));
    }
    if let Some(trailer) = &movie.trailer_url {
        let _ = writeln!(
            body,
            "<p><a class=\"trailer\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch trailer</a></p>",
            escape_html(trailer)
        );
    }

    body.push_str("<h2>Where to watch</h2>\n");
    if movie.providers.is_empty() {
        body.push_str("<p>No subscription streaming providers found.</p>\n");
    } else {
        body.push_str("<ul class=\"providers\">\n");
        for provider in &movie.providers {
            let _ = writeln!(body, "<li>{}</li>", escape_html(provider));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/\">Back to search</a></p>");
    layout(movie.title.as_deref().unwrap_or("Movie"), &body)
}

pub fn render_not_found() -> String {
    layout(
        "Not found",
        "<h1>Movie not found</h1>\n<p>We could not find that movie.</p>\n<p><a href=\"/\">Back to search</a></p>",
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
</head>
<body>
<main>
{body}
</main>
<footer><small>Data from TMDB.</small></footer>
</body>
</html>
"#,
        escape_html(title)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
