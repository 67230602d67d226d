use thiserror::Error;

/// Why a remote question request produced nothing usable. Every variant is
/// recovered from by falling back to the built-in bank.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Remote generation is switched off in config or on the command line.
    #[error("remote questions are disabled")]
    Disabled,

    /// The configured API key variable is unset or empty.
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body lacked `candidates[0].content.parts[0].text`.
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),

    /// No `[ ... ]` span in the generated text.
    #[error("no JSON array in generated text")]
    NoJsonArray,

    #[error("generated JSON did not parse: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The array parsed but every element failed validation.
    #[error("no usable questions in generated text")]
    NoValidQuestions,
}
