//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid Tenor link: {0}")]
    InvalidLink(String),

    #[error("No Tenor asset found for id {0}")]
    AssetNotFound(String),

    #[error("Tenor API error: status {status}")]
    Provider { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Caller {0} already has a conversion in flight")]
    Busy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] spress_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Stable machine-readable kind for the boundary layer, which owns
    /// the human-facing wording.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidLink(_) => "invalid_link",
            PipelineError::AssetNotFound(_) => "asset_not_found",
            PipelineError::Provider { .. } => "provider",
            PipelineError::Network(_) => "network",
            PipelineError::Busy(_) => "busy",
            PipelineError::Config(_) => "config",
            PipelineError::Media(e) => match e {
                spress_media::MediaError::ProbeFailed { .. } => "probe",
                spress_media::MediaError::UnsupportedFormat(_) => "unsupported_format",
                spress_media::MediaError::Oversize { .. } => "oversize",
                _ => "encode",
            },
            PipelineError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spress_media::MediaError;

    #[test]
    fn test_kinds_are_distinguishable() {
        assert_eq!(PipelineError::InvalidLink("x".into()).kind(), "invalid_link");
        assert_eq!(PipelineError::AssetNotFound("1".into()).kind(), "asset_not_found");
        assert_eq!(PipelineError::Provider { status: 500 }.kind(), "provider");
        assert_eq!(PipelineError::Busy("42".into()).kind(), "busy");
        assert_eq!(
            PipelineError::Media(MediaError::Oversize {
                actual: 100,
                limit: 10
            })
            .kind(),
            "oversize"
        );
        assert_eq!(
            PipelineError::Media(MediaError::UnsupportedFormat("text/plain".into())).kind(),
            "unsupported_format"
        );
    }
}
