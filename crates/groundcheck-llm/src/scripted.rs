//! Scripted generator backend for tests and development.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use groundcheck_utils::error::GeneratorError;

use crate::{Generated, GenerationRequest, Generator};

/// One scripted reply for a [`ScriptedGenerator`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Hand this text back as the generated analysis.
    Text(String),
    /// Fail the attempt with a backend error carrying this reason.
    Failure(String),
}

/// Generator that replays a fixed reply sequence instead of spawning
/// anything. Each `generate` call consumes the next reply; an exhausted
/// queue answers with [`GeneratorError::Empty`]. Received instructions are
/// recorded so tests can assert on what the pipeline actually asked for.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ScriptedReply>>,
    instructions: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Scripted backend answering with the given texts, in order.
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_replies(
            texts
                .into_iter()
                .map(|text| ScriptedReply::Text(text.into()))
                .collect(),
        )
    }

    /// Scripted backend with explicit per-call replies, failures included.
    #[must_use]
    pub fn from_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Instructions received so far, in call order.
    #[must_use]
    pub fn instructions(&self) -> Vec<String> {
        lock(&self.instructions).clone()
    }

    /// Number of `generate` calls served.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.instructions).len()
    }

    /// Replies not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GeneratorError> {
        lock(&self.instructions).push(request.instruction);
        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(Generated::new(text, "scripted")),
            Some(ScriptedReply::Failure(reason)) => Err(GeneratorError::Spawn {
                command: "scripted".to_string(),
                reason,
            }),
            None => Err(GeneratorError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_texts_in_order() {
        let backend = ScriptedGenerator::new(["first", "second"]);
        let one = backend
            .generate(GenerationRequest::new("a", "KSV001"))
            .await
            .unwrap();
        let two = backend
            .generate(GenerationRequest::new("b", "KSV001"))
            .await
            .unwrap();
        assert_eq!(one.text, "first");
        assert_eq!(two.text, "second");
        assert_eq!(one.backend, "scripted");
        assert_eq!(backend.calls(), 2);
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn failure_reply_surfaces_as_error() {
        let backend = ScriptedGenerator::from_replies(vec![ScriptedReply::Failure(
            "wedged".to_string(),
        )]);
        let err = backend
            .generate(GenerationRequest::new("a", "KSV001"))
            .await
            .unwrap_err();
        match err {
            GeneratorError::Spawn { reason, .. } => assert_eq!(reason, "wedged"),
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_queue_answers_empty() {
        let backend = ScriptedGenerator::new(Vec::<String>::new());
        let err = backend
            .generate(GenerationRequest::new("a", "KSV001"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Empty));
    }

    #[tokio::test]
    async fn records_received_instructions() {
        let backend = ScriptedGenerator::new(["ok"]);
        backend
            .generate(GenerationRequest::new("analyze KSV001", "KSV001"))
            .await
            .unwrap();
        assert_eq!(backend.instructions(), vec!["analyze KSV001".to_string()]);
    }
}
