//! HTTP client for the report generation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use viva_core::{ReportError, ReportGenerator, ReportId, SessionId, TranscriptSnapshot};

use crate::config::RemoteConfig;
use crate::http::Backend;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest<'a> {
    session_id: SessionId,
    transcript: &'a TranscriptSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportReply {
    report_id: String,
}

/// Report generation over the collaborator's HTTP API.
///
/// Ships the frozen transcript once per session; the service owns scoring
/// and storage, we only keep the returned id for the audit log.
pub struct RemoteReporter {
    backend: Backend,
}

impl RemoteReporter {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            backend: Backend::new(config),
        }
    }
}

#[async_trait]
impl ReportGenerator for RemoteReporter {
    async fn generate(
        &self,
        session_id: SessionId,
        transcript: TranscriptSnapshot,
    ) -> Result<ReportId, ReportError> {
        let request = ReportRequest {
            session_id,
            transcript: &transcript,
        };
        let reply: ReportReply = self.backend.post_json("/v1/reports", &request).await?;
        Ok(ReportId::new(reply.report_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let session_id = SessionId::new();
        let transcript = TranscriptSnapshot { entries: vec![] };
        let request = ReportRequest {
            session_id,
            transcript: &transcript,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sessionId"], session_id.to_string());
        assert!(value["transcript"]["entries"].as_array().unwrap().is_empty());
    }

    #[test]
    fn reply_decodes_report_id() {
        let reply: ReportReply = serde_json::from_str(r#"{"reportId":"rep_0042"}"#).unwrap();
        assert_eq!(reply.report_id, "rep_0042");
    }
}
