//! Completion gateway: the language-model service the graph grows from.
//!
//! The navigator only needs "query text + seed → reply text", plus the model
//! identifier and response fingerprint of the last call for provenance.
//! [`CompletionGateway`] is that seam; [`OpenAiClient`] talks to an
//! OpenAI-compatible chat completions endpoint and [`ScriptedCompletion`]
//! replays canned replies.

pub mod openai;
pub mod scripted;

use miette::Diagnostic;
use thiserror::Error;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use scripted::ScriptedCompletion;

/// Errors from the completion subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("no API key: environment variable {var} is not set")]
    #[diagnostic(
        code(knowgen::llm::missing_api_key),
        help("Export {var}, point `llm.api_key_env` at another variable, or run with --offline.")
    )]
    MissingApiKey { var: String },

    #[error("completion request failed: {message}")]
    #[diagnostic(
        code(knowgen::llm::request_failed),
        help("Check connectivity, the endpoint URL in `llm.base_url`, and that the model name is valid.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse completion response: {message}")]
    #[diagnostic(
        code(knowgen::llm::parse_error),
        help("The service returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("no scripted reply left for query")]
    #[diagnostic(
        code(knowgen::llm::script_exhausted),
        help("The offline gateway has replayed all of its canned replies.")
    )]
    ScriptExhausted,
}

/// A text completion service.
pub trait CompletionGateway {
    /// Send `query` with `seed` and return the reply text.
    fn complete(&mut self, query: &str, seed: u64) -> Result<String, LlmError>;

    /// Identifier of the model answering requests.
    fn model(&self) -> &str;

    /// Fingerprint reported with the last successful reply.
    fn fingerprint(&self) -> Option<&str>;
}
