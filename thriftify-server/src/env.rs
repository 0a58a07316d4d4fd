use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

#[cfg(not(test))]
pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

#[cfg(test)]
pub static CONF: Lazy<Config> = Lazy::new(testing::config);

const DB_URI_VAR: &str = "THRIFTIFY_DB_URI";
const DB_MAX_CONNECTIONS_VAR: &str = "THRIFTIFY_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "THRIFTIFY_DB_IDLE_TIMEOUT_SECS";

const HASHING_KEY_VAR: &str = "THRIFTIFY_HASHING_KEY_B64";
const SESSION_SIGNING_KEY_VAR: &str = "THRIFTIFY_SESSION_SIGNING_KEY_B64";

const HASH_LENGTH_VAR: &str = "THRIFTIFY_HASH_LENGTH";
const HASH_ITERATIONS_VAR: &str = "THRIFTIFY_HASH_ITERATIONS";
const HASH_MEM_COST_KIB_VAR: &str = "THRIFTIFY_HASH_MEM_COST_KIB";
const HASH_THREADS_VAR: &str = "THRIFTIFY_HASH_THREADS";
const HASH_SALT_LENGTH_VAR: &str = "THRIFTIFY_HASH_SALT_LENGTH";

const SESSION_LIFETIME_HOURS_VAR: &str = "THRIFTIFY_SESSION_LIFETIME_HOURS";
const SECURE_COOKIES_VAR: &str = "THRIFTIFY_SECURE_COOKIES";

const AI_ENABLED_VAR: &str = "THRIFTIFY_AI_ENABLED";
const AI_API_KEY_VAR: &str = "THRIFTIFY_AI_API_KEY";
const AI_MODEL_VAR: &str = "THRIFTIFY_AI_MODEL";
const AI_ENDPOINT_VAR: &str = "THRIFTIFY_AI_ENDPOINT";
const AI_TIMEOUT_SECS_VAR: &str = "THRIFTIFY_AI_TIMEOUT_SECS";

const CRAWLER_ENABLED_VAR: &str = "THRIFTIFY_CRAWLER_ENABLED";
const IMAGE_SEARCH_URL_VAR: &str = "THRIFTIFY_IMAGE_SEARCH_URL";
const IMAGE_ROOT_VAR: &str = "THRIFTIFY_IMAGE_ROOT";
const CRAWLER_TIMEOUT_SECS_VAR: &str = "THRIFTIFY_CRAWLER_TIMEOUT_SECS";

const ACTIX_WORKER_COUNT_VAR: &str = "THRIFTIFY_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "THRIFTIFY_LOG_LEVEL";

const HASHING_KEY_SIZE: usize = 32;
const SESSION_SIGNING_KEY_SIZE: usize = 64;

#[derive(Zeroize)]
pub struct ConfigInner {
    pub db_uri: Option<String>,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,

    pub hashing_key: [u8; HASHING_KEY_SIZE],
    pub session_signing_key: [u8; SESSION_SIGNING_KEY_SIZE],

    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,

    #[zeroize(skip)]
    pub session_lifetime: Duration,
    pub secure_cookies: bool,

    pub ai_enabled: bool,
    pub ai_api_key: String,
    #[zeroize(skip)]
    pub ai_model: String,
    #[zeroize(skip)]
    pub ai_endpoint: String,
    #[zeroize(skip)]
    pub ai_timeout: Duration,

    pub crawler_enabled: bool,
    #[zeroize(skip)]
    pub image_search_url: String,
    #[zeroize(skip)]
    pub image_root: PathBuf,
    #[zeroize(skip)]
    pub crawler_timeout: Duration,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub log_level: String,
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let hashing_key = decode_key::<HASHING_KEY_SIZE>(HASHING_KEY_VAR)?;
        let session_signing_key = decode_key::<SESSION_SIGNING_KEY_SIZE>(SESSION_SIGNING_KEY_VAR)?;

        let ai_enabled = env_var_or(AI_ENABLED_VAR, false);
        let ai_api_key = if ai_enabled {
            env_var(AI_API_KEY_VAR)?
        } else {
            env_var_or(AI_API_KEY_VAR, String::new())
        };

        let inner = ConfigInner {
            db_uri: std::env::var(DB_URI_VAR).ok().filter(|uri| !uri.is_empty()),
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            hashing_key,
            session_signing_key,

            hash_length: env_var_or(HASH_LENGTH_VAR, 32),
            hash_iterations: env_var_or(HASH_ITERATIONS_VAR, 3),
            hash_mem_cost_kib: env_var_or(HASH_MEM_COST_KIB_VAR, 65536),
            hash_threads: env_var_or(HASH_THREADS_VAR, 1),
            hash_salt_length: env_var_or(HASH_SALT_LENGTH_VAR, 16),

            session_lifetime: Duration::from_secs(
                env_var_or(SESSION_LIFETIME_HOURS_VAR, 24) * 3600,
            ),
            secure_cookies: env_var_or(SECURE_COOKIES_VAR, true),

            ai_enabled,
            ai_api_key,
            ai_model: env_var_or(AI_MODEL_VAR, String::from("gemini-1.5-pro-latest")),
            ai_endpoint: env_var_or(
                AI_ENDPOINT_VAR,
                String::from("https://generativelanguage.googleapis.com/v1beta"),
            ),
            ai_timeout: Duration::from_secs(env_var_or(AI_TIMEOUT_SECS_VAR, 60)),

            crawler_enabled: env_var_or(CRAWLER_ENABLED_VAR, false),
            image_search_url: env_var_or(
                IMAGE_SEARCH_URL_VAR,
                String::from("https://www.bing.com/images/async"),
            ),
            image_root: PathBuf::from(env_var_or(
                IMAGE_ROOT_VAR,
                String::from("static/crawl_images"),
            )),
            crawler_timeout: Duration::from_secs(env_var_or(CRAWLER_TIMEOUT_SECS_VAR, 20)),

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

fn decode_key<const N: usize>(key: &'static str) -> Result<[u8; N], ConfigError> {
    let encoded = Zeroizing::new(env_var::<String>(key)?);
    let decoded = Zeroizing::new(
        b64.decode(encoded.as_bytes())
            .map_err(|_| ConfigError::invalid(key))?,
    );

    <[u8; N]>::try_from(&decoded[..]).map_err(|_| ConfigError::invalid(key))
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Cheap hashing parameters and fixed keys so handler tests don't depend on the environment.
    pub fn config() -> Config {
        let inner = ConfigInner {
            db_uri: None,
            db_max_connections: 4,
            db_idle_timeout: Duration::from_secs(30),

            hashing_key: [7; HASHING_KEY_SIZE],
            session_signing_key: [11; SESSION_SIGNING_KEY_SIZE],

            hash_length: 16,
            hash_iterations: 1,
            hash_mem_cost_kib: 64,
            hash_threads: 1,
            hash_salt_length: 16,

            session_lifetime: Duration::from_secs(3600),
            secure_cookies: false,

            ai_enabled: false,
            ai_api_key: String::new(),
            ai_model: String::from("test-model"),
            ai_endpoint: String::from("http://127.0.0.1:9"),
            ai_timeout: Duration::from_secs(1),

            crawler_enabled: false,
            image_search_url: String::from("http://127.0.0.1:9"),
            image_root: std::env::temp_dir().join("thriftify-test-images"),
            crawler_timeout: Duration::from_secs(1),

            actix_worker_count: 1,
            log_level: String::from("debug"),
        };

        Config {
            inner: UnsafeCell::new(inner),
        }
    }

    #[test]
    fn test_decode_key_length() {
        std::env::set_var("THRIFTIFY_TEST_KEY_OK", b64.encode([3u8; 32]));
        std::env::set_var("THRIFTIFY_TEST_KEY_SHORT", b64.encode([3u8; 16]));
        std::env::set_var("THRIFTIFY_TEST_KEY_GARBAGE", "not base64!");

        assert_eq!(decode_key::<32>("THRIFTIFY_TEST_KEY_OK").unwrap(), [3u8; 32]);
        assert!(matches!(
            decode_key::<32>("THRIFTIFY_TEST_KEY_SHORT"),
            Err(ConfigError::InvalidVar(_))
        ));
        assert!(matches!(
            decode_key::<32>("THRIFTIFY_TEST_KEY_GARBAGE"),
            Err(ConfigError::InvalidVar(_))
        ));
        assert!(matches!(
            decode_key::<32>("THRIFTIFY_TEST_KEY_MISSING"),
            Err(ConfigError::MissingVar(_))
        ));
    }
}
