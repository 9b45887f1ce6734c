use thiserror::Error;
use url::Url;

/// Connection settings for the movie question source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuizSettings {
    movies_url: Option<String>,
    api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub movies_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("invalid movies URL: {0}")]
    InvalidMoviesUrl(String),

    #[error("movies URL cannot carry an API key segment")]
    CannotBeBase,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and validate the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidMoviesUrl` if the URL is present but
    /// does not parse.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        let movies_url = normalize_optional(self.movies_url);
        let api_key = normalize_optional(self.api_key);

        if let Some(raw) = movies_url.as_ref() {
            Url::parse(raw).map_err(|_| QuizSettingsError::InvalidMoviesUrl(raw.clone()))?;
        }

        Ok(QuizSettings {
            movies_url,
            api_key,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn movies_url(&self) -> Option<&str> {
        self.movies_url.as_deref()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The full movie-list endpoint, with the API key appended as the last
    /// path segment when one is configured.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the stored URL cannot take path segments.
    pub fn movies_endpoint(&self) -> Result<Option<Url>, QuizSettingsError> {
        let Some(raw) = self.movies_url() else {
            return Ok(None);
        };
        let mut url =
            Url::parse(raw).map_err(|_| QuizSettingsError::InvalidMoviesUrl(raw.to_owned()))?;
        if let Some(key) = self.api_key() {
            url.path_segments_mut()
                .map_err(|()| QuizSettingsError::CannotBeBase)?
                .pop_if_empty()
                .push(key);
        }
        Ok(Some(url))
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_become_absent() {
        let settings = QuizSettingsDraft {
            movies_url: Some("   ".into()),
            api_key: Some(String::new()),
        }
        .validate()
        .unwrap();

        assert_eq!(settings, QuizSettings::default());
        assert_eq!(settings.movies_endpoint().unwrap(), None);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = QuizSettingsDraft {
            movies_url: Some("not a url".into()),
            api_key: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(err, QuizSettingsError::InvalidMoviesUrl("not a url".into()));
    }

    #[test]
    fn api_key_is_appended_as_segment() {
        let settings = QuizSettingsDraft {
            movies_url: Some(" https://tv-api.com/en/API/Top250Movies/ ".into()),
            api_key: Some("k_123".into()),
        }
        .validate()
        .unwrap();

        assert_eq!(
            settings.movies_url(),
            Some("https://tv-api.com/en/API/Top250Movies/")
        );
        assert_eq!(settings.api_key(), Some("k_123"));
        let url = settings.movies_endpoint().unwrap().unwrap();
        assert_eq!(url.as_str(), "https://tv-api.com/en/API/Top250Movies/k_123");
    }
}
