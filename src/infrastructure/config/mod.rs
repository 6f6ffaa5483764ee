use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    // Speech engine
    pub tts_api_base: String,
    pub tts_api_key: String,
    pub tts_model: String,
    pub synthesis_timeout_secs: u64,
    // Uploads
    pub max_upload_bytes: usize,
    pub temp_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_format: LogFormat::Pretty,
            tts_api_base: "https://ttsapi.site/v1".to_string(),
            tts_api_key: String::new(),
            tts_model: "tts-1".to_string(),
            synthesis_timeout_secs: 600,
            max_upload_bytes: 50 * 1024 * 1024,
            temp_root: env::temp_dir(),
        }
    }
}

type ConfigResult<T> = Result<T, Box<dyn std::error::Error>>;

impl Config {
    /// Full server configuration from the environment (and `.env`)
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), true)
    }

    /// Configuration for the command line tool.
    ///
    /// Only the speech engine, timeout and log settings are read; server-only
    /// variables (`HOST`, `PORT`, `MAX_UPLOAD_BYTES`, `TEMP_ROOT`) are ignored.
    pub fn cli_from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), false)
    }

    fn from_lookup<F>(lookup: F, include_server: bool) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            };
        }
        if let Some(api_base) = lookup("TTS_API_BASE") {
            config.tts_api_base = api_base;
        }
        if let Some(api_key) = lookup("TTS_API_KEY") {
            config.tts_api_key = api_key;
        }
        if let Some(model) = lookup("TTS_MODEL") {
            config.tts_model = model;
        }
        if let Some(timeout) = lookup("SYNTHESIS_TIMEOUT_SECS") {
            config.synthesis_timeout_secs = timeout.parse()?;
        }
        if config.synthesis_timeout_secs == 0 {
            return Err("SYNTHESIS_TIMEOUT_SECS must be greater than zero".into());
        }

        if include_server {
            if let Some(host) = lookup("HOST") {
                config.host = host;
            }
            if let Some(port) = lookup("PORT") {
                config.port = port.parse()?;
            }
            if let Some(max_upload_bytes) = lookup("MAX_UPLOAD_BYTES") {
                config.max_upload_bytes = max_upload_bytes.parse()?;
            }
            if let Some(temp_root) = lookup("TEMP_ROOT") {
                config.temp_root = PathBuf::from(temp_root);
            }
        }

        Ok(config)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}
