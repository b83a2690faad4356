//! HTTP transport used by the delivery client.
//!
//! `CurlTransport` keeps a single curl easy handle for the whole run so libcurl
//! can reuse the connection between attempts and records.

use std::time::Duration;

use crate::retry::TransportError;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One request/response exchange. A returned `HttpResponse` may carry any status;
/// `Err` means no status was received.
pub trait Transport {
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;

    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// libcurl-backed transport. Not `Sync`; owned by exactly one client.
pub struct CurlTransport {
    easy: curl::easy::Easy,
}

impl CurlTransport {
    pub fn new() -> Result<Self, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.useragent(concat!("cpush/", env!("CARGO_PKG_VERSION")))?;
        easy.follow_location(false)?;
        Ok(Self { easy })
    }

    fn headers(json_body: bool) -> Result<curl::easy::List, TransportError> {
        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        if json_body {
            list.append("Content-Type: application/json")?;
            // Small bodies; skip the 100-continue round trip.
            list.append("Expect:")?;
        }
        Ok(list)
    }

    fn perform(&mut self, timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.easy.timeout(timeout)?;
        self.easy.connect_timeout(timeout)?;

        let mut body = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = self.easy.response_code()?;
        Ok(HttpResponse {
            status: u16::try_from(status).unwrap_or(u16::MAX),
            body,
        })
    }
}

impl Transport for CurlTransport {
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.easy.url(url)?;
        self.easy.post(true)?;
        self.easy.post_fields_copy(body)?;
        self.easy.http_headers(Self::headers(true)?)?;
        self.perform(timeout)
    }

    fn get(&mut self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.easy.url(url)?;
        self.easy.get(true)?;
        self.easy.http_headers(Self::headers(false)?)?;
        self.perform(timeout)
    }
}
