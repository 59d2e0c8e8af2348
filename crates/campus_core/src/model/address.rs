//! Address entity.
//!
//! # Invariants
//! - An address row is owned by at most one student (`students.address_id`
//!   is unique).
//! - `id` is assigned by the store and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key of an address row.
pub type AddressId = i64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Option<AddressId>,
    /// Street line, e.g. `Nagymező street 44`.
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<i32>,
}

impl Address {
    pub fn builder() -> AddressBuilder {
        AddressBuilder::default()
    }
}

/// Fluent constructor for [`Address`].
#[derive(Debug, Default)]
pub struct AddressBuilder {
    inner: Address,
}

impl AddressBuilder {
    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.inner.street = Some(street.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.inner.city = Some(city.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.inner.country = Some(country.into());
        self
    }

    pub fn zip_code(mut self, zip_code: i32) -> Self {
        self.inner.zip_code = Some(zip_code);
        self
    }

    pub fn build(self) -> Address {
        self.inner
    }
}
