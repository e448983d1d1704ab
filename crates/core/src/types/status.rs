//! Enumerations shared by the catalog, orders and accounts.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted enum code is unknown.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order lifecycle status.
///
/// Serialized with the storage codes (`KRIJUAR`, `NE_PROCES`, ...). The
/// human-facing Albanian label is available through [`OrderStatus::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "KRIJUAR")]
    Created,
    #[serde(rename = "NE_PROCES")]
    Processing,
    #[serde(rename = "NE_DERGIM")]
    Shipping,
    #[serde(rename = "DOREZUAR")]
    Delivered,
    #[serde(rename = "ANULUAR")]
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::Processing,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Created => "KRIJUAR",
            Self::Processing => "NE_PROCES",
            Self::Shipping => "NE_DERGIM",
            Self::Delivered => "DOREZUAR",
            Self::Cancelled => "ANULUAR",
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Krijuar",
            Self::Processing => "Në proces",
            Self::Shipping => "Në dërgim",
            Self::Delivered => "Dorëzuar",
            Self::Cancelled => "Anuluar",
        }
    }

    /// Parse either a storage code or a display label.
    #[must_use]
    pub fn from_code_or_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s || status.label() == s)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code_or_label(s).ok_or_else(|| UnknownVariant::new("order status", s))
    }
}

/// Filament material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilamentType {
    #[default]
    Pla,
    Petg,
    Abs,
    Tpu,
    Asa,
}

impl FilamentType {
    /// Storage code, e.g. `PLA`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pla => "PLA",
            Self::Petg => "PETG",
            Self::Abs => "ABS",
            Self::Tpu => "TPU",
            Self::Asa => "ASA",
        }
    }
}

impl fmt::Display for FilamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FilamentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLA" => Ok(Self::Pla),
            "PETG" => Ok(Self::Petg),
            "ABS" => Ok(Self::Abs),
            "TPU" => Ok(Self::Tpu),
            "ASA" => Ok(Self::Asa),
            _ => Err(UnknownVariant::new("filament type", s)),
        }
    }
}

/// Account role.
///
/// Derived from the identity provider's group claim. A profile can never
/// assign itself a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Name of the identity-provider group that grants [`Role::Admin`].
    pub const ADMIN_GROUP: &'static str = "ADMINS";

    /// Derive a role from the caller's group memberships.
    #[must_use]
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a str>) -> Self {
        if groups.into_iter().any(|g| g.trim() == Self::ADMIN_GROUP) {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Whether this role may manage the catalog and orders.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_codes_and_labels() {
        for status in OrderStatus::ALL {
            assert_eq!(status.code().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.label().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_uses_codes() {
        let json = serde_json::to_string(&OrderStatus::Shipping).unwrap();
        assert_eq!(json, "\"NE_DERGIM\"");
        let parsed: OrderStatus = serde_json::from_str("\"ANULUAR\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_filament_type_serde() {
        assert_eq!(serde_json::to_string(&FilamentType::Petg).unwrap(), "\"PETG\"");
        assert_eq!("asa".parse::<FilamentType>().unwrap(), FilamentType::Asa);
    }

    #[test]
    fn test_role_from_groups() {
        assert_eq!(Role::from_groups(["users", "ADMINS"]), Role::Admin);
        assert_eq!(Role::from_groups(["users"]), Role::User);
        assert_eq!(Role::from_groups([]), Role::User);
    }
}
