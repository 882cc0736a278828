//! Per-request metadata passed explicitly through scheduler calls.

use uuid::Uuid;

/// Cross-cutting request data. Constructed by the caller for each request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    /// Authenticated user issuing the request, when known.
    pub actor_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor_id: None,
        }
    }

    pub fn for_actor(actor_id: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            actor_id: Some(actor_id.into()),
        }
    }

    /// Span carrying the request fields.
    pub fn span(&self, operation: &'static str) -> tracing::Span {
        tracing::info_span!(
            "mastery",
            op = operation,
            request_id = %self.request_id,
            actor = self.actor_id.as_deref().unwrap_or("-"),
        )
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
