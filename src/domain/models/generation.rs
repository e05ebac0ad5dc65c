use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use super::CompletionResponse;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObservationLevel {
    Default,
    Error,
}

/// A finished "generation" observation: one model call with its inputs,
/// output, and timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub trace_id: String,
    pub name: String,
    pub model: String,
    pub model_parameters: Value,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub level: ObservationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Generation {
    pub fn is_error(&self) -> bool {
        self.level == ObservationLevel::Error
    }
}

/// Scoped span around one model call.
///
/// Opened with [`GenerationSpan::start`] and closed with
/// [`GenerationSpan::finish`]. A span dropped without being finished (the
/// call was cancelled or panicked) is reported as abandoned.
#[derive(Debug)]
pub struct GenerationSpan {
    id: String,
    trace_id: String,
    name: String,
    model: String,
    model_parameters: Value,
    input: Value,
    start_time: DateTime<Utc>,
    finished: bool,
}

impl GenerationSpan {
    pub fn start(
        name: impl Into<String>,
        model: impl Into<String>,
        model_parameters: Value,
        input: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trace_id: Uuid::new_v4().to_string(),
            name: name.into(),
            model: model.into(),
            model_parameters,
            input,
            start_time: Utc::now(),
            finished: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn finish(mut self, result: &Result<CompletionResponse, DomainError>) -> Generation {
        self.finished = true;
        let (output, level, status_message) = match result {
            Ok(response) => (Some(response.raw().clone()), ObservationLevel::Default, None),
            Err(e) => (
                Some(json!({ "error": e.to_string() })),
                ObservationLevel::Error,
                Some(e.to_string()),
            ),
        };

        Generation {
            id: std::mem::take(&mut self.id),
            trace_id: std::mem::take(&mut self.trace_id),
            name: std::mem::take(&mut self.name),
            model: std::mem::take(&mut self.model),
            model_parameters: self.model_parameters.take(),
            input: self.input.take(),
            output,
            level,
            status_message,
            start_time: self.start_time,
            end_time: Utc::now(),
        }
    }
}

impl Drop for GenerationSpan {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                span = %self.name,
                id = %self.id,
                "Generation span abandoned before the call completed"
            );
        }
    }
}
