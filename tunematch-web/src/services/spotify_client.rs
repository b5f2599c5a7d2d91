//! Spotify Web API client
//!
//! Implements both external collaborators of the pipeline:
//! - `CatalogSearch` via `GET /v1/search?type=track`
//! - `DescriptorProvider` via `GET /v1/audio-features?ids=...`
//!
//! Authentication uses the client-credentials flow. The bearer token is
//! cached until shortly before it expires; concurrent refreshes are
//! serialised behind one async mutex.
//!
//! Every request is rate limited (token bucket), bounded by the configured
//! timeouts, and retried with backoff on transient failures.

use crate::error::PipelineError;
use crate::services::{build_search_query, CatalogSearch, DescriptorProvider};
use crate::types::{AudioDescriptors, CatalogEntry};
use crate::utils::{retry_transient, AttemptError, RetryPolicy};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tunematch_common::config::{get_user_agent, Credentials, TomlConfig};

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh the token this long before the server-side expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on a cached token's lifetime, whatever the server claims
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Option<TrackItem>>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    album: AlbumItem,
}

#[derive(Debug, Deserialize)]
struct AlbumItem {
    name: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    artists: Vec<ArtistItem>,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    name: String,
}

impl From<TrackItem> for CatalogEntry {
    fn from(item: TrackItem) -> Self {
        let artist = item
            .album
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();

        CatalogEntry {
            id: item.id,
            album: item.album.name,
            artist,
            release_date: item.album.release_date,
            track: item.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    #[serde(default)]
    audio_features: Vec<Option<AudioFeatureItem>>,
}

#[derive(Debug, Deserialize)]
struct AudioFeatureItem {
    danceability: f64,
    energy: f64,
    acousticness: f64,
    instrumentalness: f64,
    valence: f64,
    loudness: f64,
    tempo: f64,
    duration_ms: f64,
}

impl From<AudioFeatureItem> for AudioDescriptors {
    fn from(item: AudioFeatureItem) -> Self {
        AudioDescriptors {
            danceability: item.danceability,
            energy: item.energy,
            acousticness: item.acousticness,
            instrumentalness: item.instrumentalness,
            valence: item.valence,
            loudness: item.loudness,
            tempo: item.tempo,
            duration_ms: item.duration_ms,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Connection settings for `SpotifyClient`
#[derive(Debug, Clone)]
pub struct SpotifyClientConfig {
    pub credentials: Credentials,
    pub api_base_url: String,
    pub token_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    pub requests_per_second: u32,
    pub market: Option<String>,
}

impl SpotifyClientConfig {
    /// Production endpoints with limits taken from the bootstrap config
    pub fn from_toml(credentials: Credentials, toml_config: &TomlConfig) -> Self {
        Self {
            credentials,
            api_base_url: SPOTIFY_API_BASE_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(toml_config.request_timeout_secs),
            connect_timeout: Duration::from_secs(toml_config.connect_timeout_secs),
            retry: RetryPolicy::new(toml_config.max_retries),
            requests_per_second: toml_config.requests_per_second,
            market: toml_config.market.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: Client,
    config: SpotifyClientConfig,
    token: Mutex<Option<CachedToken>>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl SpotifyClient {
    pub fn new(config: SpotifyClientConfig) -> tunematch_common::Result<Self> {
        let http_client = Client::builder()
            .user_agent(get_user_agent())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                tunematch_common::Error::Internal(format!("Failed to build HTTP client: {}", e))
            })?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http_client,
            config,
            token: Mutex::new(None),
            rate_limiter,
        })
    }

    /// Return a valid bearer token, fetching a new one when needed
    async fn bearer_token(&self) -> Result<String, AttemptError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!(url = %self.config.token_url, "Requesting catalog access token");

        let response = self
            .http_client
            .post(&self.config.token_url)
            .basic_auth(
                &self.config.credentials.client_id,
                Some(&self.config.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let response = check_status(response)?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::fatal(format!("Invalid token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in)
            .min(MAX_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        tracing::info!(expires_in = token.expires_in, "Catalog access token acquired");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Authenticated GET with rate limiting and retry
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        operation_name: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, String> {
        let url = format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path);
        let url = url.as_str();

        retry_transient(operation_name, &self.config.retry, move || async move {
            self.rate_limiter.until_ready().await;

            let token = self.bearer_token().await?;

            let response = self
                .http_client
                .get(url)
                .bearer_auth(token)
                .query(query)
                .send()
                .await
                .map_err(classify_transport_error)?;

            if response.status() == StatusCode::UNAUTHORIZED {
                self.invalidate_token().await;
                return Err(AttemptError::transient("access token rejected (401)"));
            }

            let response = check_status(response)?;

            response
                .json::<T>()
                .await
                .map_err(|e| AttemptError::fatal(format!("Failed to parse response: {}", e)))
        })
        .await
    }
}

fn classify_transport_error(e: reqwest::Error) -> AttemptError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        AttemptError::transient(format!("Network error: {}", e))
    } else {
        AttemptError::fatal(format!("Network error: {}", e))
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AttemptError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(AttemptError::Transient {
            reason: "rate limited (429)".to_string(),
            retry_after,
        });
    }

    if status.is_server_error() {
        return Err(AttemptError::transient(format!("API error {}", status.as_u16())));
    }

    Err(AttemptError::fatal(format!("API error {}", status.as_u16())))
}

#[async_trait]
impl CatalogSearch for SpotifyClient {
    async fn search_track(
        &self,
        track: &str,
        album: &str,
    ) -> Result<Option<CatalogEntry>, PipelineError> {
        let q = build_search_query(track, album);

        let mut params = vec![("q", q.as_str()), ("type", "track"), ("limit", "1")];
        if let Some(market) = self.config.market.as_deref() {
            params.push(("market", market));
        }

        tracing::debug!(track = %track, album = %album, query = %q, "Searching catalog");

        let response: SearchResponse = self
            .get_json("catalog search", "search", &params)
            .await
            .map_err(PipelineError::CatalogUnavailable)?;

        let entry = response
            .tracks
            .items
            .into_iter()
            .next()
            .flatten()
            .map(CatalogEntry::from);

        match &entry {
            Some(e) => tracing::info!(
                catalog_id = %e.id,
                track = %e.track,
                artist = %e.artist,
                album = %e.album,
                "Catalog search matched"
            ),
            None => tracing::info!(track = %track, album = %album, "Catalog search returned no results"),
        }

        Ok(entry)
    }
}

#[async_trait]
impl DescriptorProvider for SpotifyClient {
    async fn audio_descriptors(
        &self,
        catalog_id: &str,
    ) -> Result<Vec<AudioDescriptors>, PipelineError> {
        tracing::debug!(catalog_id = %catalog_id, "Fetching audio features");

        let response: AudioFeaturesResponse = self
            .get_json("audio features", "audio-features", &[("ids", catalog_id)])
            .await
            .map_err(|reason| {
                PipelineError::CatalogUnavailable(format!("audio features request failed: {}", reason))
            })?;

        Ok(response
            .audio_features
            .into_iter()
            .flatten()
            .map(AudioDescriptors::from)
            .collect())
    }
}
