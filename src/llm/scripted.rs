//! Offline gateway that replays canned replies in order.

use std::collections::VecDeque;

use super::{CompletionGateway, LlmError};

/// Replays a fixed list of replies and remembers the queries it was sent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCompletion {
    model: String,
    replies: VecDeque<String>,
    queries: Vec<(String, u64)>,
    fingerprint: Option<String>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "scripted".into(),
            replies: replies.into_iter().map(Into::into).collect(),
            queries: Vec::new(),
            fingerprint: None,
        }
    }

    /// Report `model` as the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Queries received so far, with their seeds.
    pub fn queries(&self) -> &[(String, u64)] {
        &self.queries
    }

    /// Replies not yet handed out.
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl CompletionGateway for ScriptedCompletion {
    fn complete(&mut self, query: &str, seed: u64) -> Result<String, LlmError> {
        self.queries.push((query.to_string(), seed));
        let reply = self.replies.pop_front().ok_or(LlmError::ScriptExhausted)?;
        self.fingerprint = Some(format!("scripted-{}", self.queries.len()));
        Ok(reply)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}
