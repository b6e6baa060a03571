//! HTTP client for the answer evaluation service.

use async_trait::async_trait;
use viva_core::{AnswerEvaluator, EvaluationRequest, EvaluationVerdict, EvaluatorError};

use crate::config::RemoteConfig;
use crate::http::Backend;

/// Answer judgment over the collaborator's HTTP API.
///
/// The request and verdict shapes are the `viva-core` port DTOs verbatim;
/// the service speaks the same camelCase JSON. The engine wraps every call
/// in its own deadline, so this client's retry budget should stay small
/// enough to fit inside it.
pub struct RemoteEvaluator {
    backend: Backend,
}

impl RemoteEvaluator {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            backend: Backend::new(config),
        }
    }
}

#[async_trait]
impl AnswerEvaluator for RemoteEvaluator {
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationVerdict, EvaluatorError> {
        let verdict = self.backend.post_json("/v1/evaluate", &request).await?;
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viva_core::DecisionAction;

    #[test]
    fn verdict_decodes_from_service_json() {
        let verdict: EvaluationVerdict = serde_json::from_str(
            r#"{"action":"probe","text":"What is the lookup cost?","score":0.6}"#,
        )
        .unwrap();
        assert_eq!(verdict.action, DecisionAction::Probe);
        assert_eq!(verdict.text, "What is the lookup cost?");
        assert_eq!(verdict.score, Some(0.6));
        assert!(verdict.feedback.is_none());
    }

    #[test]
    fn verdict_text_defaults_to_empty_for_silent_actions() {
        let verdict: EvaluationVerdict = serde_json::from_str(r#"{"action":"continue"}"#).unwrap();
        assert_eq!(verdict.action, DecisionAction::Continue);
        assert!(verdict.text.is_empty());
    }
}
