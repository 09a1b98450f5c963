//! Filtering and pagination value types shared by the repository and services.

use crate::domain::entities::DeviceState;

/// Optional criteria narrowing a device listing. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

impl DeviceFilter {
    /// Creates an empty filter matching every device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by brand. Blank values are treated as "no filter".
    pub fn with_brand(mut self, brand: Option<&str>) -> Self {
        self.brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_state(mut self, state: Option<DeviceState>) -> Self {
        self.state = state;
        self
    }

    /// Returns true when `brand` and `state` match this filter.
    ///
    /// Brand comparison is case-insensitive.
    pub fn matches(&self, brand: &str, state: DeviceState) -> bool {
        let brand_ok = self
            .brand
            .as_deref()
            .is_none_or(|b| b.to_lowercase() == brand.to_lowercase());
        let state_ok = self.state.is_none_or(|s| s == state);
        brand_ok && state_ok
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        Self {
            items,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.size == 0 || self.total_elements <= 0 {
            return 0;
        }
        let size = i64::from(self.size);
        let pages = (self.total_elements + size - 1) / size;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    /// Index of the last page (0 for an empty result).
    pub fn last_page(&self) -> u32 {
        self.total_pages().saturating_sub(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
