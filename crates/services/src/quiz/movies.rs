use std::sync::Mutex;

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::model::{Question, QuizSettings};

use super::source::QuestionSource;
use crate::error::QuestionSourceError;

/// Lowest and highest rating threshold a generated question may ask about.
const THRESHOLDS: std::ops::RangeInclusive<u8> = 6..=8;

/// One entry of the movie list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(rename = "imDbRating", alias = "rating", default)]
    pub rating: String,
    #[serde(rename = "image", alias = "imageUrl")]
    pub image_url: String,
}

impl Movie {
    /// Parsed rating; anything unparsable counts as zero.
    #[must_use]
    pub fn rating_value(&self) -> f32 {
        self.rating.trim().parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct MoviesResponse {
    #[serde(rename = "errorMessage", default)]
    error_message: String,
    #[serde(default)]
    items: Vec<Movie>,
}

/// Decode the movie list payload.
///
/// # Errors
///
/// Returns `QuestionSourceError::Api` if the payload carries an error message,
/// `QuestionSourceError::Empty` if it lists no movies, or
/// `QuestionSourceError::Decode` on malformed JSON.
pub fn parse_movies(body: &[u8]) -> Result<Vec<Movie>, QuestionSourceError> {
    let response: MoviesResponse = serde_json::from_slice(body)?;
    if !response.error_message.trim().is_empty() {
        return Err(QuestionSourceError::Api(response.error_message));
    }
    if response.items.is_empty() {
        return Err(QuestionSourceError::Empty);
    }
    Ok(response.items)
}

/// Build a yes/no question about whether `movie` is rated above `threshold`.
#[must_use]
pub fn rating_question(movie: &Movie, threshold: u8, image: Vec<u8>) -> Question {
    Question::new(
        image,
        format!("Is the rating of this movie greater than {threshold}?"),
        movie.rating_value() > f32::from(threshold),
    )
}

/// Question source backed by a remote top-movies list.
///
/// `load_data` fetches the list; each question picks a random movie and
/// threshold and downloads the poster. A failed poster download still yields
/// a question with an empty image.
pub struct MovieQuestionSource {
    client: Client,
    endpoint: Url,
    movies: Mutex<Vec<Movie>>,
}

impl MovieQuestionSource {
    /// # Errors
    ///
    /// Returns `QuestionSourceError::NotConfigured` if the settings carry no
    /// movies URL.
    pub fn new(settings: &QuizSettings) -> Result<Self, QuestionSourceError> {
        Self::with_client(Client::new(), settings)
    }

    /// # Errors
    ///
    /// Same as [`MovieQuestionSource::new`].
    pub fn with_client(
        client: Client,
        settings: &QuizSettings,
    ) -> Result<Self, QuestionSourceError> {
        let endpoint = settings
            .movies_endpoint()?
            .ok_or(QuestionSourceError::NotConfigured)?;
        Ok(Self {
            client,
            endpoint,
            movies: Mutex::new(Vec::new()),
        })
    }

    fn pick(&self) -> Option<(Movie, u8)> {
        let movies = match self.movies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut rng = rand::thread_rng();
        let movie = movies.choose(&mut rng)?.clone();
        let threshold = rng.gen_range(THRESHOLDS);
        Some((movie, threshold))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_poster(&self, movie: &Movie) -> Vec<u8> {
        match self.download(&movie.image_url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    target: "quiz.movies",
                    title = %movie.title,
                    %err,
                    "poster download failed"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QuestionSource for MovieQuestionSource {
    async fn load_data(&self) -> Result<(), QuestionSourceError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }
        let body = response.bytes().await?;
        let movies = parse_movies(&body)?;
        tracing::debug!(target: "quiz.movies", count = movies.len(), "movie list loaded");

        let mut guard = match self.movies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = movies;
        Ok(())
    }

    async fn request_next_question(&self) -> Option<Question> {
        let (movie, threshold) = self.pick()?;
        let image = self.fetch_poster(&movie).await;
        Some(rating_question(&movie, threshold, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizSettingsDraft;

    fn movie(rating: &str) -> Movie {
        Movie {
            title: "Vivarium".into(),
            rating: rating.into(),
            image_url: "https://example.com/vivarium.jpg".into(),
        }
    }

    #[test]
    fn parses_movie_list() {
        let body = br#"{
            "errorMessage": "",
            "items": [
                {"id": "tt0111161", "title": "The Shawshank Redemption", "imDbRating": "9.2", "image": "https://example.com/a.jpg"},
                {"title": "Old", "rating": "5.8", "imageUrl": "https://example.com/b.jpg"}
            ]
        }"#;

        let movies = parse_movies(body).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[1].title, "Old");
        assert!((movies[0].rating_value() - 9.2).abs() < 1e-6);
    }

    #[test]
    fn api_error_message_is_a_failure() {
        let body = br#"{"errorMessage": "Invalid API Key", "items": []}"#;
        let err = parse_movies(body).unwrap_err();
        assert!(matches!(err, QuestionSourceError::Api(msg) if msg == "Invalid API Key"));
    }

    #[test]
    fn empty_list_is_a_failure() {
        let err = parse_movies(br#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, QuestionSourceError::Empty));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_movies(b"<html>").unwrap_err();
        assert!(matches!(err, QuestionSourceError::Decode(_)));
    }

    #[test]
    fn question_compares_rating_with_threshold() {
        assert!(rating_question(&movie("8.1"), 7, Vec::new()).correct_answer());
        assert!(!rating_question(&movie("5.8"), 6, Vec::new()).correct_answer());
        assert!(!rating_question(&movie("7"), 7, Vec::new()).correct_answer());

        let question = rating_question(&movie(""), 6, vec![1, 2, 3]);
        assert!(!question.correct_answer());
        assert_eq!(question.text(), "Is the rating of this movie greater than 6?");
        assert_eq!(question.image(), [1_u8, 2, 3].as_slice());
    }

    #[test]
    fn source_requires_movies_url() {
        let settings = QuizSettingsDraft::new().validate().unwrap();
        assert!(matches!(
            MovieQuestionSource::new(&settings),
            Err(QuestionSourceError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn unloaded_source_yields_no_question() {
        let settings = QuizSettingsDraft {
            movies_url: Some("https://example.com/movies".into()),
            api_key: None,
        }
        .validate()
        .unwrap();
        let source = MovieQuestionSource::new(&settings).unwrap();

        assert_eq!(source.request_next_question().await, None);
    }
}
