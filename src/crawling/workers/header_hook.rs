//! Extra request headers injected per request

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::net::Ipv4Addr;

/// Supplies per-request headers on top of the client's defaults.
pub trait RequestHeaderHook: Send + Sync {
    fn extra_headers(&self) -> HeaderMap;
}

/// Adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraHeaders;

impl RequestHeaderHook for NoExtraHeaders {
    fn extra_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Sends a random IPv4 address in `x-forwarded-host`, fresh for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedHostHeader;

impl ForwardedHostHeader {
    pub const HEADER: &'static str = "x-forwarded-host";

    pub fn random_address() -> Ipv4Addr {
        Ipv4Addr::from(fastrand::u32(1..=u32::MAX))
    }
}

impl RequestHeaderHook for ForwardedHostHeader {
    fn extra_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        // dotted-quad text is always a valid header value
        if let Ok(value) = HeaderValue::from_str(&Self::random_address().to_string()) {
            headers.insert(HeaderName::from_static(Self::HEADER), value);
        }
        headers
    }
}
