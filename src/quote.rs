//! Random quote retrieval.

use crate::errors::FetchError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_QUOTE_URL: &str = "https://quoteslate.vercel.app/api/quotes/random";

/// Shown in place of a quote when the fetch fails for any reason.
pub const FALLBACK_QUOTE: &str = "Could not fetch a thoughtful quote right now.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    pub quote: String,
    #[serde(default)]
    pub author: String,
}

impl Quote {
    pub fn fallback() -> Self {
        Quote {
            quote: FALLBACK_QUOTE.to_string(),
            author: String::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait QuoteService: Send + Sync {
    /// One attempt, no retry.
    async fn fetch_random_quote(&self) -> Result<Quote, FetchError>;
}

/// Decodes a `{quote, author, ...}` body. Unknown fields are ignored.
pub fn parse_quote(body: &str) -> Result<Quote, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
}

pub struct HttpQuoteService {
    client: reqwest::Client,
    url: String,
}

impl HttpQuoteService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpQuoteService {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl QuoteService for HttpQuoteService {
    async fn fetch_random_quote(&self) -> Result<Quote, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network(e.to_string());

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?;
        let body = response.text().await.map_err(network)?;
        debug!(url = %self.url, bytes = body.len(), "quote response received");

        parse_quote(&body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoteslate_payload() {
        let body = r#"{
            "id": 498,
            "quote": "The best way out is always through.",
            "author": "Robert Frost",
            "length": 35,
            "tags": ["perseverance"]
        }"#;

        let quote = parse_quote(body).unwrap();

        assert_eq!(quote.quote, "The best way out is always through.");
        assert_eq!(quote.author, "Robert Frost");
    }

    #[test]
    fn missing_author_is_empty() {
        let quote = parse_quote(r#"{"quote": "Breathe."}"#).unwrap();
        assert_eq!(quote.author, "");
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(parse_quote("<html>502</html>"), Err(FetchError::Parse(_))));
        assert!(matches!(
            parse_quote(r#"{"author": "Nobody"}"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn fallback_has_no_author() {
        let quote = Quote::fallback();
        assert_eq!(quote.quote, FALLBACK_QUOTE);
        assert!(quote.author.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let service =
            HttpQuoteService::new("http://127.0.0.1:9/quotes", Duration::from_secs(2)).unwrap();

        let result = service.fetch_random_quote().await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
