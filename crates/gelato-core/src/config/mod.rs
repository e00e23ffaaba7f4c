//! Client configuration from the environment.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::remote::HttpEntryClient;
use crate::stats::{ShopPair, DEFAULT_PRIMARY_SHOP, DEFAULT_SECONDARY_SHOP};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub shops: ShopPair,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            shops: ShopPair::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = value_or_default(&lookup, "GELATO_API_URL", DEFAULT_API_URL);
        if !is_http_url(&api_url) {
            return Err(Error::Configuration(
                "GELATO_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout_secs = value_or_default(
            &lookup,
            "GELATO_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|_| {
            Error::Configuration("GELATO_HTTP_TIMEOUT_SECS must be an integer".to_string())
        })?;
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(Error::Configuration(format!(
                "GELATO_HTTP_TIMEOUT_SECS must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}"
            )));
        }

        let shops = ShopPair::new(
            value_or_default(&lookup, "GELATO_PRIMARY_SHOP", DEFAULT_PRIMARY_SHOP),
            value_or_default(&lookup, "GELATO_SECONDARY_SHOP", DEFAULT_SECONDARY_SHOP),
        );

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            shops,
        })
    }

    /// Replace the API URL, e.g. from a command-line flag.
    #[must_use]
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(api_url) = normalize_text_option(api_url) {
            self.api_url = api_url;
        }
        self
    }

    pub fn http_client(&self) -> Result<HttpEntryClient> {
        HttpEntryClient::new(self.api_url.clone(), self.timeout)
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    normalize_text_option(lookup(name)).unwrap_or_else(|| default.to_string())
}
