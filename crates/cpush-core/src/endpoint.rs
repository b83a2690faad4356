//! Target endpoint: base URL plus the delivery and health paths.

use url::Url;

const PRODUCTS_PATH: &str = "produtos";
const HEALTH_PATH: &str = "health";

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid endpoint URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("endpoint must be an http or https URL (got {0})")]
    Scheme(String),
}

/// Base URL of the receiving API. Paths are joined relative to it, so a base
/// with a path prefix (`http://host/api`) keeps that prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, EndpointError> {
        let mut url = Url::parse(base.trim())?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(EndpointError::Scheme(url.scheme().to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { base: url })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// `POST` target for records.
    pub fn products_url(&self) -> String {
        self.join(PRODUCTS_PATH)
    }

    /// `GET` target for the connectivity probe.
    pub fn health_url(&self) -> String {
        self.join(HEALTH_PATH)
    }

    fn join(&self, path: &str) -> String {
        // The base always ends with '/', so joining a relative segment cannot fail.
        self.base
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.base, path))
    }
}
