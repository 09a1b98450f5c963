//! Query parameters of the device listing endpoint.

use serde::Deserialize;
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use utoipa::IntoParams;

use crate::domain::entities::{DeviceFilter, DeviceState, PageRequest};
use crate::error::AppError;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// `GET /api/v1/devices` query string.
///
/// Numbers arrive as strings and are parsed with `serde_with`; a value that is
/// not a non-negative integer rejects the whole query.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDevicesParams {
    /// Exact brand, case-insensitive. Blank means no filter.
    pub brand: Option<String>,

    /// `available`, `in_use` or `inactive`. Blank means no filter.
    pub state: Option<String>,

    /// Zero-based page index (default 0).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[param(minimum = 0)]
    pub page: Option<u32>,

    /// Page size (default 100).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[param(minimum = 1, maximum = 1000)]
    pub size: Option<u32>,
}

impl ListDevicesParams {
    /// Builds the repository filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown state.
    pub fn to_filter(&self) -> Result<DeviceFilter, AppError> {
        let state = match self.state.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<DeviceState>().map_err(|e| {
                AppError::bad_request(e.to_string(), json!({ "state": raw }))
            })?),
        };

        Ok(DeviceFilter::new()
            .with_brand(self.brand.as_deref())
            .with_state(state))
    }

    /// Resolves the requested page, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `size` is 0 or above `max_size`.
    pub fn to_page_request(&self, max_size: u32) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE.min(max_size));

        if size == 0 || size > max_size {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {}", max_size),
                json!({ "size": size }),
            ));
        }

        Ok(PageRequest::new(page, size))
    }
}
