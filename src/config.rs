//! Recognition service configuration
//!
//! Credentials and the endpoint come from the process environment at call
//! time; audio format and recognition options are fixed per session. Missing
//! credentials are a routine condition; the façade answers with the
//! fallback transcript instead of failing.

use uuid::Uuid;

/// Default service endpoint for the streaming recognition model
pub const DEFAULT_ENDPOINT: &str = "wss://openspeech.bytedance.com/api/v3/sauc/bigmodel";

const ENV_APP_KEY: &str = "DOUBAO_ASR_APP_KEY";
const ENV_ACCESS_TOKEN: &str = "DOUBAO_ASR_ACCESS_TOKEN";
const ENV_RESOURCE_ID: &str = "DOUBAO_ASR_RESOURCE_ID";
const ENV_ENDPOINT: &str = "DOUBAO_ASR_ENDPOINT";

/// Credentials and endpoint for the recognition service
#[derive(Debug, Clone)]
pub struct AsrConfig {
    /// WebSocket endpoint (`wss://…`)
    pub endpoint: String,
    pub app_key: String,
    pub access_token: String,
    pub resource_id: String,
}

impl AsrConfig {
    /// Read the configuration from the environment
    ///
    /// Returns `None` when any required key is absent or empty. A `.env`
    /// file is loaded first when present (development convenience).
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        Some(Self {
            endpoint: env_non_empty(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            app_key: env_non_empty(ENV_APP_KEY)?,
            access_token: env_non_empty(ENV_ACCESS_TOKEN)?,
            resource_id: env_non_empty(ENV_RESOURCE_ID)?,
        })
    }

    /// Required environment keys that are currently absent or empty
    ///
    /// For status display; an empty result means `from_env` will succeed.
    pub fn missing_env_keys() -> Vec<&'static str> {
        [ENV_APP_KEY, ENV_ACCESS_TOKEN, ENV_RESOURCE_ID]
            .into_iter()
            .filter(|key| env_non_empty(key).is_none())
            .collect()
    }

    /// Connection URL with authentication as query parameters
    ///
    /// The transport cannot attach custom headers to the handshake, so the
    /// application key, access token, resource id, and the per-session
    /// correlation token all ride in the query string. An endpoint without a
    /// path gets a root path inserted; a bare `host:port?query` request line
    /// is not valid HTTP.
    pub fn connect_url(&self, connect_id: &str) -> String {
        let has_path = self
            .endpoint
            .splitn(2, "://")
            .nth(1)
            .is_some_and(|rest| rest.contains('/'));
        format!(
            "{}{}?appkey={}&token={}&resource_id={}&connect_id={}",
            self.endpoint,
            if has_path { "" } else { "/" },
            self.app_key,
            self.access_token,
            self.resource_id,
            connect_id
        )
    }

    /// Generate a fresh per-session correlation token
    pub fn new_connect_id() -> String {
        Uuid::new_v4().to_string()
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Sample encoding of the captured audio, reported in the configuration
/// request. Immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct AudioFormat {
    /// Container format: `pcm`, `wav`, `ogg`, or `mp3`
    pub format: String,
    /// Codec name within the container
    pub codec: String,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            format: "pcm".to_string(),
            codec: "raw".to_string(),
            sample_rate: 16000,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

/// Recognition behavior switches, reported in the configuration request
#[derive(Debug, Clone)]
pub struct RecognitionOptions {
    /// Inverse text normalization ("twenty twenty-six" → "2026")
    pub enable_itn: bool,
    /// Automatic punctuation
    pub enable_punc: bool,
    /// Semantic smoothing (disfluency removal)
    pub enable_ddc: bool,
    /// Result granularity requested from the service
    pub result_type: String,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            enable_itn: true,
            enable_punc: true,
            enable_ddc: true,
            result_type: "full".to_string(),
        }
    }
}
