//! Target text supply.
//!
//! A [`WordProvider`] makes one attempt to produce words. [`fetch_words`]
//! wraps it so the caller always gets something typeable: on failure the
//! error message itself becomes the word list.

use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::WordSourceError;

pub const DEFAULT_PROVIDER_URL: &str = "https://random-word-api.vercel.app/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can produce `count` words in a single attempt
pub trait WordProvider: Send + Sync {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError>;
}

/// Word list provider reachable over HTTP. Expects a JSON array of strings
/// from `GET <url>?words=<count>`.
#[derive(Debug, Clone)]
pub struct HttpWordProvider {
    client: Client,
    url: String,
}

impl HttpWordProvider {
    /// Fails when the HTTP client cannot be built (e.g. no TLS backend)
    pub fn new(url: impl Into<String>) -> Result<Self, WordSourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WordProvider for HttpWordProvider {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("words", count)])
            .send()?;

        if !response.status().is_success() {
            return Err(WordSourceError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Vec<String>>()?)
    }
}

/// Fixed word list, used for custom prompts
#[derive(Debug, Clone)]
pub struct StaticWordProvider {
    words: Vec<String>,
}

impl StaticWordProvider {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn from_prompt(prompt: &str) -> Self {
        Self::new(prompt.split_whitespace().map(String::from).collect())
    }
}

impl WordProvider for StaticWordProvider {
    fn fetch(&self, _count: usize) -> Result<Vec<String>, WordSourceError> {
        Ok(self.words.clone())
    }
}

/// Fetch `count` words, never failing. Provider errors and empty lists are
/// logged and replaced by the error message split on whitespace.
pub fn fetch_words(provider: &dyn WordProvider, count: usize) -> Vec<String> {
    let result = provider.fetch(count).and_then(|words| {
        if words.is_empty() {
            Err(WordSourceError::Empty)
        } else {
            Ok(words)
        }
    });

    match result {
        Ok(words) => {
            tracing::debug!(count = words.len(), "fetched words");
            words
        }
        Err(err) => {
            tracing::error!(error = %err, "There was a problem with the fetch operation");
            fallback_words(&err)
        }
    }
}

fn fallback_words(err: &WordSourceError) -> Vec<String> {
    err.to_string()
        .split_whitespace()
        .map(String::from)
        .collect()
}
