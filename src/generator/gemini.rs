use serde::{Deserialize, Serialize};

use crate::generator::QuestionFetcher;
use crate::generator::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// `generateContent` client. Holds the key so a missing key is reported
/// per request rather than at startup.
#[cfg_attr(not(feature = "network"), allow(dead_code))]
pub struct GeminiFetcher {
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout_secs: u64,
}

impl GeminiFetcher {
    pub fn new(base_url: &str, model: &str, api_key_env: &str, timeout_secs: u64) -> Self {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            api_key_env: api_key_env.to_string(),
            timeout_secs,
        }
    }

    #[cfg_attr(not(feature = "network"), allow(dead_code))]
    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={key}",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg_attr(not(feature = "network"), allow(dead_code))]
fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
#[cfg_attr(not(feature = "network"), allow(dead_code))]
fn unwrap_envelope(body: &str) -> Result<String, FetchError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| FetchError::MalformedResponse("no candidate text".to_string()))
}

#[cfg(feature = "network")]
impl QuestionFetcher for GeminiFetcher {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    fn fetch(&self, prompt: &str) -> Result<String, FetchError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::MissingApiKey(self.api_key_env.clone()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let response = client
            .post(self.endpoint(key))
            .json(&request_body(prompt))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout_secs)
                } else {
                    FetchError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        tracing::debug!(bytes = body.len(), "generateContent response");
        unwrap_envelope(&body)
    }
}

#[cfg(not(feature = "network"))]
impl QuestionFetcher for GeminiFetcher {
    fn fetch(&self, _prompt: &str) -> Result<String, FetchError> {
        Err(FetchError::Disabled)
    }
}

/// Stands in when remote generation is off; every request falls back.
pub struct DisabledFetcher;

impl QuestionFetcher for DisabledFetcher {
    fn fetch(&self, _prompt: &str) -> Result<String, FetchError> {
        Err(FetchError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[1]"}],"role":"model"}}]}"#;
        assert_eq!(unwrap_envelope(body).unwrap(), "[1]");
    }

    #[test]
    fn test_unwrap_envelope_rejects_empty_candidates() {
        assert!(matches!(
            unwrap_envelope(r#"{"candidates":[]}"#),
            Err(FetchError::MalformedResponse(_))
        ));
        assert!(matches!(
            unwrap_envelope("<html>"),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let fetcher = GeminiFetcher::new("http://localhost:9/", "m1", "MINDMAZE_TEST_UNSET_KEY", 5);
        assert_eq!(
            fetcher.endpoint("k"),
            "http://localhost:9/v1beta/models/m1:generateContent?key=k"
        );
    }

    #[test]
    fn test_missing_key_is_reported() {
        let fetcher = GeminiFetcher::new(DEFAULT_BASE_URL, DEFAULT_MODEL, "MINDMAZE_TEST_UNSET_KEY", 5);
        let err = fetcher.fetch("prompt").unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingApiKey(_) | FetchError::Disabled
        ));
    }

    #[test]
    fn test_disabled_fetcher() {
        assert!(matches!(DisabledFetcher.fetch("x"), Err(FetchError::Disabled)));
    }
}
