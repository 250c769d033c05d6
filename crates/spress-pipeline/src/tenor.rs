//! Tenor share-link resolution.
//!
//! Turns `tenor.com/view/...` share links into downloadable GIF URLs via
//! the Tenor v2 posts endpoint, preferring the largest available GIF
//! variant.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use spress_media::MediaError;
use spress_models::{first_match, RemoteAsset};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

const DEFAULT_ENDPOINT: &str = "https://tenor.googleapis.com/v2/posts";

/// Ordered ID extraction patterns, most specific first. All capture the
/// trailing numeric post id.
fn id_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"tenor\.com/(?:[a-z]{2}/)?view/[^/]+-(\d+)$",
            r"tenor\.com/(?:[a-z]{2}/)?view/.*-(\d+)$",
            r"tenor\.com/.*/(\d+)$",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn normalize(share_url: &str) -> String {
    let trimmed = share_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Whether a URL looks like a Tenor share link at all.
pub fn is_tenor_link(url: &str) -> bool {
    normalize(url).contains("tenor.com/")
}

/// Extract the numeric post id from a Tenor share link.
pub fn extract_tenor_id(share_url: &str) -> PipelineResult<String> {
    let url = normalize(share_url);

    id_patterns()
        .iter()
        .find_map(|re| re.captures(&url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PipelineError::InvalidLink(share_url.to_string()))
}

#[derive(Debug, Deserialize)]
struct TenorResponse {
    #[serde(default)]
    results: Vec<TenorPost>,
}

#[derive(Debug, Deserialize)]
struct TenorPost {
    #[serde(default)]
    content_description: Option<String>,
    #[serde(default)]
    media_formats: TenorMediaFormats,
}

#[derive(Debug, Default, Deserialize)]
struct TenorMediaFormats {
    gif: Option<TenorVariant>,
    mediumgif: Option<TenorVariant>,
    tinygif: Option<TenorVariant>,
}

#[derive(Debug, Deserialize)]
struct TenorVariant {
    url: String,
}

/// Client for the Tenor v2 posts API.
#[derive(Debug, Clone)]
pub struct TenorClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl TenorClient {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_endpoint(config, DEFAULT_ENDPOINT)
    }

    /// Construct against a non-default endpoint. Used by tests against a
    /// local mock server.
    pub fn with_endpoint(config: &PipelineConfig, endpoint: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_key: config.tenor_api_key.clone(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Resolve a share link to a downloadable GIF asset.
    pub async fn resolve(&self, share_url: &str) -> PipelineResult<RemoteAsset> {
        let id = extract_tenor_id(share_url)?;
        debug!(id = %id, "resolving tenor post");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("ids", id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Provider {
                status: status.as_u16(),
            });
        }

        let body: TenorResponse = response.json().await?;
        let post = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::AssetNotFound(id.clone()))?;

        let formats = post.media_formats;
        let variant = first_match(
            [formats.gif, formats.mediumgif, formats.tinygif],
            |v: &TenorVariant| !v.url.is_empty(),
        )
        .ok_or_else(|| PipelineError::AssetNotFound(id.clone()))?;

        info!(id = %id, url = %variant.url, "tenor post resolved");

        Ok(RemoteAsset {
            provider_id: id,
            source_url: variant.url,
            title: post
                .content_description
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "tenor_gif".to_string()),
        })
    }

    /// Download a resolved asset to `dest`, rejecting bodies larger
    /// than `max_bytes`.
    ///
    /// The body streams to disk chunk by chunk; an oversize body is
    /// aborted mid-stream and the partial file removed, so at no point
    /// does more than one chunk sit in memory.
    pub async fn fetch(
        &self,
        remote: &RemoteAsset,
        dest: &Path,
        max_bytes: u64,
    ) -> PipelineResult<()> {
        let mut response = self.http.get(&remote.source_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Provider {
                status: status.as_u16(),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > max_bytes {
                return Err(PipelineError::Media(MediaError::Oversize {
                    actual: declared,
                    limit: max_bytes,
                }));
            }
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > max_bytes {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(PipelineError::Media(MediaError::Oversize {
                    actual: written,
                    limit: max_bytes,
                }));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        debug!(dest = %dest.display(), bytes = written, "asset downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_id_from_view_link() {
        let id = extract_tenor_id("https://tenor.com/view/cute-panda-gif-123456").unwrap();
        assert_eq!(id, "123456");
    }

    #[test]
    fn test_extract_id_from_localized_link() {
        let id = extract_tenor_id("https://tenor.com/de/view/lachen-gif-987654").unwrap();
        assert_eq!(id, "987654");
    }

    #[test]
    fn test_extract_id_without_scheme() {
        let id = extract_tenor_id("tenor.com/view/wave-gif-42").unwrap();
        assert_eq!(id, "42");
    }

    #[test]
    fn test_extract_id_with_trailing_slash() {
        let id = extract_tenor_id("https://tenor.com/view/wave-gif-42/").unwrap();
        assert_eq!(id, "42");
    }

    #[test]
    fn test_extract_id_bare_numeric_path() {
        let id = extract_tenor_id("https://tenor.com/view/55555").unwrap();
        assert_eq!(id, "55555");
    }

    #[test]
    fn test_non_tenor_link_rejected() {
        let err = extract_tenor_id("https://example.com/view/cat-gif-123").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLink(_)));
    }

    #[test]
    fn test_link_without_id_rejected() {
        let err = extract_tenor_id("https://tenor.com/view/no-id-here").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLink(_)));
    }

    #[test]
    fn test_is_tenor_link() {
        assert!(is_tenor_link("https://tenor.com/view/x-1"));
        assert!(is_tenor_link("tenor.com/view/x-1"));
        assert!(!is_tenor_link("https://giphy.com/gifs/abc"));
    }

    #[test]
    fn test_variant_priority_prefers_full_gif() {
        let formats = TenorMediaFormats {
            gif: Some(TenorVariant {
                url: "https://media.tenor.com/full.gif".into(),
            }),
            mediumgif: Some(TenorVariant {
                url: "https://media.tenor.com/medium.gif".into(),
            }),
            tinygif: Some(TenorVariant {
                url: "https://media.tenor.com/tiny.gif".into(),
            }),
        };

        let variant = first_match(
            [formats.gif, formats.mediumgif, formats.tinygif],
            |v: &TenorVariant| !v.url.is_empty(),
        )
        .unwrap();
        assert_eq!(variant.url, "https://media.tenor.com/full.gif");
    }

    #[test]
    fn test_variant_priority_falls_back_to_tiny() {
        let formats = TenorMediaFormats {
            gif: None,
            mediumgif: None,
            tinygif: Some(TenorVariant {
                url: "https://media.tenor.com/tiny.gif".into(),
            }),
        };

        let variant = first_match(
            [formats.gif, formats.mediumgif, formats.tinygif],
            |v: &TenorVariant| !v.url.is_empty(),
        )
        .unwrap();
        assert_eq!(variant.url, "https://media.tenor.com/tiny.gif");
    }

    #[test]
    fn test_response_parses_without_media_formats() {
        let json = r#"{"results":[{"content_description":"a cat"}]}"#;
        let parsed: TenorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert!(parsed.results[0].media_formats.gif.is_none());
    }
}
