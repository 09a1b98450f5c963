//! Device request bodies and HAL representations.

use chrono::SecondsFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::hal::{Link, LinkBuilder};
use crate::domain::entities::{
    Device, DeviceFilter, DeviceState, DeviceUpdate, NewDevice, Page,
};
use crate::error::AppError;

/// Accepted spellings of a device state.
static STATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(available|in_use|inactive)$").unwrap());

const STATE_MESSAGE: &str = "Device state must be one of: available, in_use, inactive";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn parse_state(raw: &str) -> Result<DeviceState, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request(STATE_MESSAGE, json!({ "state": raw })))
}

/// Body of `POST /api/v1/devices` and `PUT /api/v1/devices/{id}`.
///
/// Every field is required. Read-only members a client may echo back
/// (`id`, `creationTime`, `_links`) are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRequest {
    #[validate(
        required(message = "Device name is required"),
        custom(function = "not_blank", message = "Device name is required")
    )]
    #[schema(example = "Galaxy S24")]
    pub name: Option<String>,

    #[validate(
        required(message = "Device brand is required"),
        custom(function = "not_blank", message = "Device brand is required")
    )]
    #[schema(example = "Samsung")]
    pub brand: Option<String>,

    #[validate(
        required(message = "Device state is required"),
        regex(path = "*STATE_PATTERN", message = "Device state must be one of: available, in_use, inactive")
    )]
    #[schema(example = "available")]
    pub state: Option<String>,
}

impl DeviceRequest {
    /// Validates the body and converts it into a device to register.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with per-field messages.
    pub fn into_new_device(self) -> Result<NewDevice, AppError> {
        self.validate()?;

        let (Some(name), Some(brand), Some(state)) = (self.name, self.brand, self.state) else {
            return Err(AppError::bad_request("Invalid input data", json!({})));
        };

        Ok(NewDevice {
            name: name.trim().to_string(),
            brand: brand.trim().to_string(),
            state: parse_state(&state)?,
        })
    }

    /// Validates the body and converts it into a full replacement.
    pub fn into_update(self) -> Result<DeviceUpdate, AppError> {
        let device = self.into_new_device()?;
        Ok(DeviceUpdate {
            name: Some(device.name),
            brand: Some(device.brand),
            state: Some(device.state),
        })
    }
}

/// Body of `PATCH /api/v1/devices/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatchRequest {
    #[validate(custom(function = "not_blank", message = "Device name must not be blank"))]
    #[schema(example = "Galaxy S24 Ultra")]
    pub name: Option<String>,

    #[validate(custom(function = "not_blank", message = "Device brand must not be blank"))]
    pub brand: Option<String>,

    #[validate(regex(path = "*STATE_PATTERN", message = "Device state must be one of: available, in_use, inactive"))]
    #[schema(example = "in_use")]
    pub state: Option<String>,
}

impl DevicePatchRequest {
    pub fn into_update(self) -> Result<DeviceUpdate, AppError> {
        self.validate()?;

        Ok(DeviceUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            brand: self.brand.map(|b| b.trim().to_string()),
            state: self.state.as_deref().map(parse_state).transpose()?,
        })
    }
}

/// Links of a single device.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub devices: Link,
}

/// HAL representation of a device.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceModel {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Galaxy S24")]
    pub name: String,
    #[schema(example = "Samsung")]
    pub brand: String,
    #[schema(example = "available")]
    pub state: String,
    /// RFC 3339 UTC timestamp, second precision.
    #[schema(example = "2023-10-01T12:00:00Z")]
    pub creation_time: String,
    #[serde(rename = "_links")]
    pub links: DeviceLinks,
}

impl DeviceModel {
    pub fn from_device(device: &Device, links: &LinkBuilder) -> Self {
        Self {
            id: device.id,
            name: device.name.clone(),
            brand: device.brand.clone(),
            state: device.state.as_api_str().to_string(),
            creation_time: device
                .created_on
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            links: DeviceLinks {
                self_link: links.device(device.id),
                devices: links.devices(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmbeddedDevices {
    pub devices: Vec<DeviceModel>,
}

/// Navigation links of a device page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
    #[serde(rename = "self")]
    pub self_link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Link>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: u32,
    pub number: u32,
}

/// HAL representation of one page of devices.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PagedDevicesModel {
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<EmbeddedDevices>,
    #[serde(rename = "_links")]
    pub links: PageLinks,
    pub page: PageMetadata,
}

impl PagedDevicesModel {
    pub fn from_page(page: Page<Device>, filter: &DeviceFilter, links: &LinkBuilder) -> Self {
        let size = page.size;
        let link = |number: u32| links.devices_page(filter, number, size);

        let page_links = PageLinks {
            first: page.has_previous().then(|| link(0)),
            prev: page.has_previous().then(|| link(page.number - 1)),
            self_link: link(page.number),
            next: page.has_next().then(|| link(page.number + 1)),
            last: page.has_next().then(|| link(page.last_page())),
        };

        let metadata = PageMetadata {
            size,
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
            number: page.number,
        };

        let devices: Vec<DeviceModel> = page
            .items
            .iter()
            .map(|d| DeviceModel::from_device(d, links))
            .collect();

        Self {
            embedded: (!devices.is_empty()).then_some(EmbeddedDevices { devices }),
            links: page_links,
            page: metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PageRequest;
    use chrono::{TimeZone, Utc};

    fn request(name: Option<&str>, brand: Option<&str>, state: Option<&str>) -> DeviceRequest {
        DeviceRequest {
            name: name.map(str::to_string),
            brand: brand.map(str::to_string),
            state: state.map(str::to_string),
        }
    }

    fn device(id: i64) -> Device {
        Device::new(
            id,
            format!("Device {id}"),
            "Apple".to_string(),
            DeviceState::InUse,
            Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_valid_request_converts() {
        let new_device = request(Some(" iPhone 15 "), Some("Apple"), Some("IN_USE"))
            .into_new_device()
            .unwrap();

        assert_eq!(new_device.name, "iPhone 15");
        assert_eq!(new_device.state, DeviceState::InUse);
    }

    #[test]
    fn test_missing_and_blank_fields_are_reported() {
        let err = request(None, Some("  "), Some("available"))
            .into_new_device()
            .unwrap_err();

        let info = err.to_error_info();
        assert_eq!(info.code, "validation_error");
        assert_eq!(info.details["fields"]["name"][0], "Device name is required");
        assert_eq!(info.details["fields"]["brand"][0], "Device brand is required");
    }

    #[test]
    fn test_misspelled_state_is_rejected() {
        let err = request(Some("Pixel"), Some("Google"), Some("inactve"))
            .into_new_device()
            .unwrap_err();

        assert!(err.to_error_info().details["fields"]["state"].is_array());
    }

    #[test]
    fn test_unknown_members_are_ignored() {
        let body = r#"{"id": 9, "name": "Pixel", "brand": "Google", "state": "available",
                       "creationTime": "2023-10-01T12:00:00Z", "_links": {}}"#;
        let parsed: DeviceRequest = serde_json::from_str(body).unwrap();
        assert!(parsed.into_new_device().is_ok());
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let patch: DevicePatchRequest = serde_json::from_str(r#"{"state": "inactive"}"#).unwrap();
        let update = patch.into_update().unwrap();

        assert_eq!(update.name, None);
        assert_eq!(update.brand, None);
        assert_eq!(update.state, Some(DeviceState::Inactive));
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch: DevicePatchRequest = serde_json::from_str(r#"{"name": " "}"#).unwrap();
        assert!(patch.into_update().is_err());
    }

    #[test]
    fn test_device_model_serialization() {
        let links = LinkBuilder::new("http://localhost:8080");
        let value = serde_json::to_value(DeviceModel::from_device(&device(1), &links)).unwrap();

        assert_eq!(value["state"], "in_use");
        assert_eq!(value["creationTime"], "2023-10-01T12:00:00Z");
        assert_eq!(
            value["_links"]["self"]["href"],
            "http://localhost:8080/api/v1/devices/1"
        );
        assert_eq!(
            value["_links"]["devices"]["href"],
            "http://localhost:8080/api/v1/devices?page=0&size=100"
        );
    }

    #[test]
    fn test_middle_page_has_all_links() {
        let links = LinkBuilder::new("http://localhost");
        let page = Page::new(vec![device(3), device(4)], PageRequest::new(1, 2), 6);
        let model = PagedDevicesModel::from_page(page, &DeviceFilter::new(), &links);
        let value = serde_json::to_value(model).unwrap();

        assert_eq!(value["_embedded"]["devices"].as_array().unwrap().len(), 2);
        assert_eq!(value["_links"]["first"]["href"], "http://localhost/api/v1/devices?page=0&size=2");
        assert_eq!(value["_links"]["prev"]["href"], "http://localhost/api/v1/devices?page=0&size=2");
        assert_eq!(value["_links"]["self"]["href"], "http://localhost/api/v1/devices?page=1&size=2");
        assert_eq!(value["_links"]["next"]["href"], "http://localhost/api/v1/devices?page=2&size=2");
        assert_eq!(value["_links"]["last"]["href"], "http://localhost/api/v1/devices?page=2&size=2");
        assert_eq!(value["page"]["totalPages"], 3);
        assert_eq!(value["page"]["totalElements"], 6);
    }

    #[test]
    fn test_empty_page_omits_embedded_and_navigation() {
        let links = LinkBuilder::new("http://localhost");
        let page = Page::new(Vec::new(), PageRequest::new(0, 100), 0);
        let value =
            serde_json::to_value(PagedDevicesModel::from_page(page, &DeviceFilter::new(), &links))
                .unwrap();

        assert!(value.get("_embedded").is_none());
        assert!(value["_links"].get("first").is_none());
        assert!(value["_links"].get("next").is_none());
        assert!(value["_links"]["self"].is_object());
        assert_eq!(value["page"]["totalPages"], 0);
    }
}
