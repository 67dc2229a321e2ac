//! Status flags
//!
//! Most records carry `1`/`0`; orders carry a richer lifecycle enum.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::ModelError;

/// Active/suspended flag (`1` = active, `0` = suspended on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveStatus {
    #[default]
    Active,
    Suspended,
}

impl ActiveStatus {
    pub fn code(self) -> u8 {
        match self {
            ActiveStatus::Active => 1,
            ActiveStatus::Suspended => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActiveStatus::Active => "Active",
            ActiveStatus::Suspended => "Suspended",
        }
    }

    pub fn is_active(self) -> bool {
        self == ActiveStatus::Active
    }
}

impl FromStr for ActiveStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "active" => Ok(ActiveStatus::Active),
            "0" | "false" | "suspended" | "inactive" => Ok(ActiveStatus::Suspended),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

impl Serialize for ActiveStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ActiveStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(1) => Ok(ActiveStatus::Active),
            Raw::Int(0) => Ok(ActiveStatus::Suspended),
            Raw::Int(n) => Err(serde::de::Error::custom(ModelError::InvalidStatus(n.to_string()))),
            Raw::Bool(b) => Ok(if b { ActiveStatus::Active } else { ActiveStatus::Suspended }),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "completed" | "complete" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            _ => Err(ModelError::UnknownOrderStatus(s.to_string())),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
