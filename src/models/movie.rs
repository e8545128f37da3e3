//! Movie metadata shapes, mirroring the subset of the TMDB payload the
//! application consumes. Unknown upstream fields are ignored; absent ones
//! default so that partial records never fail deserialization.

use serde::{Deserialize, Serialize};

/// A movie genre.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A video attached to a movie (trailers, teasers, clips).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Container for a movie's video list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Full movie detail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<VideoList>,
}

impl Movie {
    /// YouTube trailers attached to this movie, in upstream order.
    pub fn youtube_trailers(&self) -> Vec<&Video> {
        self.videos
            .as_ref()
            .map(|v| {
                v.results
                    .iter()
                    .filter(|video| video.site == "YouTube" && video.kind == "Trailer")
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Summary entry in a paged movie listing (popular, top rated, search).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A page of movie summaries as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub total_results: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_trailers_filters_site_and_kind() {
        let movie: Movie = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Test",
            "videos": { "results": [
                { "key": "a", "name": "Official Trailer", "site": "YouTube", "type": "Trailer" },
                { "key": "b", "name": "Teaser", "site": "YouTube", "type": "Teaser" },
                { "key": "c", "name": "Trailer", "site": "Vimeo", "type": "Trailer" }
            ]}
        }))
        .unwrap();

        let trailers = movie.youtube_trailers();
        assert_eq!(trailers.len(), 1);
        assert_eq!(trailers[0].key, "a");
    }

    #[test]
    fn test_movie_without_videos() {
        let movie: Movie =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "Bare" })).unwrap();
        assert!(movie.youtube_trailers().is_empty());
        assert_eq!(movie.vote_average, 0.0);
    }
}
