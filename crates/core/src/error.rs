use crate::domain::marker::MarkerId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("invalid value for marker {marker}: {reason}")]
    InvalidMarkerValue { marker: MarkerId, reason: String },

    #[error("catalog gap: no {marker} range covers {value}")]
    CatalogGap { marker: MarkerId, value: f64 },

    #[error("marker {0} has no range table in the catalog")]
    UnknownMarker(MarkerId),

    #[error("unknown supplement reference `{name}` ({context})")]
    UnknownSupplementReference { name: String, context: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl PipelineError {
    pub fn invalid_value(marker: MarkerId, reason: impl Into<String>) -> Self {
        Self::InvalidMarkerValue {
            marker,
            reason: reason.into(),
        }
    }
}
