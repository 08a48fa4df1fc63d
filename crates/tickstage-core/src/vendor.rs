//! Vendor dataset endpoint configuration.
//!
//! The vendor serves one compressed CSV file per (exchange, stream kind,
//! day, symbol) at
//! `{base}/{exchange}/{stream-kind}/{yyyy}/{mm}/{dd}/{symbol}.csv.gz`,
//! authenticated with a static bearer token.

use crate::domain::FetchKey;
use crate::http_client::HttpAuth;

pub const DEFAULT_BASE_URL: &str = "https://datasets.tardis.dev/v1";

const API_KEY_ENV: &str = "TARDIS_API_KEY";

/// Base URL plus the bearer credential.
///
/// The credential is read once at startup and never validated up front: an
/// invalid key surfaces only as per-day download denials.
#[derive(Debug, Clone)]
pub struct VendorConfig {
    base_url: String,
    api_key: String,
}

impl VendorConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads the credential from `TARDIS_API_KEY`.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_else(|_| String::from("demo"));
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    pub fn auth(&self) -> HttpAuth {
        HttpAuth::Bearer(self.api_key.clone())
    }

    /// Deterministic dataset URL for one raw artifact.
    pub fn dataset_url(&self, key: &FetchKey) -> String {
        format!(
            "{}/{}/{}/{:04}/{:02}/{:02}/{}.csv.gz",
            self.base_url,
            key.exchange.as_str(),
            key.kind.as_str(),
            key.date.year(),
            key.date.month() as u8,
            key.date.day(),
            urlencoding::encode(key.symbol.as_str()),
        )
    }
}
