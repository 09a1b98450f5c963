//! HAL hypermedia support: links, link building and the `application/hal+json`
//! response wrapper.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, Uri, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::convert::Infallible;
use url::form_urlencoded;
use utoipa::ToSchema;

use crate::api::dto::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::entities::DeviceFilter;
use crate::state::AppState;

pub const HAL_JSON: &str = "application/hal+json";

/// Collection path of the device resource.
pub const DEVICES_PATH: &str = "/api/v1/devices";

/// A single HAL link object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Link {
    #[schema(example = "http://localhost:8080/api/v1/devices/1")]
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Serializes `T` as JSON with the `application/hal+json` content type.
#[derive(Debug)]
pub struct Hal<T>(pub T);

impl<T: Serialize> IntoResponse for Hal<T> {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, HAL_JSON)], Json(self.0)).into_response()
    }
}

/// Builds absolute links to device resources.
///
/// Extracted per request: the base is `PUBLIC_BASE_URL` when configured,
/// otherwise it is derived from the forwarding and `Host` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn device(&self, id: i64) -> Link {
        Link::new(format!("{}{}/{}", self.base, DEVICES_PATH, id))
    }

    /// Link to the first page of the unfiltered collection.
    pub fn devices(&self) -> Link {
        self.devices_page(&DeviceFilter::default(), 0, DEFAULT_PAGE_SIZE)
    }

    /// Link to `page` of the collection, carrying the active filters.
    pub fn devices_page(&self, filter: &DeviceFilter, page: u32, size: u32) -> Link {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(brand) = &filter.brand {
            query.append_pair("brand", brand);
        }
        if let Some(state) = filter.state {
            query.append_pair("state", state.as_api_str());
        }
        query.append_pair("page", &page.to_string());
        query.append_pair("size", &size.to_string());

        Link::new(format!("{}{}?{}", self.base, DEVICES_PATH, query.finish()))
    }
}

impl FromRequestParts<AppState> for LinkBuilder {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let base = match &state.public_base_url {
            Some(base) => base.clone(),
            None => base_url_from_request(&parts.headers, &parts.uri),
        };
        Ok(LinkBuilder::new(base))
    }
}

/// Reconstructs the externally visible base URL of a request.
///
/// Priority: `X-Forwarded-Proto`/`X-Forwarded-Host`, then `Host`, then the
/// request URI authority, then `http://localhost`.
pub fn base_url_from_request(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = first_header_value(headers, "x-forwarded-proto")
        .filter(|p| *p == "http" || *p == "https")
        .map(str::to_string)
        .or_else(|| uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, header::HOST.as_str()))
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .filter(|h| is_plausible_host(h))
        .unwrap_or_else(|| "localhost".to_string());

    format!("{}://{}", scheme, host)
}

fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn is_plausible_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DeviceState;
    use axum::http::HeaderValue;

    #[test]
    fn test_device_link() {
        let links = LinkBuilder::new("http://localhost:8080/");
        assert_eq!(
            links.device(7).href,
            "http://localhost:8080/api/v1/devices/7"
        );
    }

    #[test]
    fn test_default_collection_link() {
        let links = LinkBuilder::new("http://localhost:8080");
        assert_eq!(
            links.devices().href,
            "http://localhost:8080/api/v1/devices?page=0&size=100"
        );
    }

    #[test]
    fn test_page_link_carries_filters() {
        let links = LinkBuilder::new("https://api.example.com");
        let filter = DeviceFilter::new()
            .with_brand(Some("Test Brand"))
            .with_state(Some(DeviceState::InUse));

        assert_eq!(
            links.devices_page(&filter, 2, 10).href,
            "https://api.example.com/api/v1/devices?brand=Test+Brand&state=in_use&page=2&size=10"
        );
    }

    #[test]
    fn test_base_url_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("devices.local:3000"));

        let uri: Uri = "/api/v1/devices".parse().unwrap();
        assert_eq!(
            base_url_from_request(&headers, &uri),
            "http://devices.local:3000"
        );
    }

    #[test]
    fn test_base_url_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("10.0.0.5:8080"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("api.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(
            base_url_from_request(&headers, &uri),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_base_url_rejects_suspicious_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("evil.com/path?x=1"));

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(base_url_from_request(&headers, &uri), "http://localhost");
    }

    #[test]
    fn test_base_url_falls_back_to_localhost() {
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(
            base_url_from_request(&HeaderMap::new(), &uri),
            "http://localhost"
        );
    }
}
