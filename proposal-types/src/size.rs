//! Disk size type shared across settings, templates and engine specs
//!
//! Sizes are either a byte count or unlimited. Product configuration files
//! write them as human strings ("10 GiB"), the wire format as byte counts.

use std::fmt;
use std::ops::Add;

use anyhow::{Result, anyhow};
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// A size in bytes, or no limit at all.
///
/// `Unlimited` compares greater than any byte count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiskSize {
    Bytes(u64),
    Unlimited,
}

impl DiskSize {
    pub const fn zero() -> Self {
        Self::Bytes(0)
    }

    pub const fn b(bytes: u64) -> Self {
        Self::Bytes(bytes)
    }

    pub const fn kib(value: u64) -> Self {
        Self::Bytes(value * 1024)
    }

    pub const fn mib(value: u64) -> Self {
        Self::Bytes(value * 1024 * 1024)
    }

    pub const fn gib(value: u64) -> Self {
        Self::Bytes(value * 1024 * 1024 * 1024)
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Bytes(0))
    }

    /// Byte count, or `None` when unlimited
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Bytes(bytes) => Some(*bytes),
            Self::Unlimited => None,
        }
    }

    /// Parse a human-readable size ("10 GiB", "1.5TB", "unlimited", "4096").
    ///
    /// Units are case-insensitive and always powers of 1024, so "GB" and
    /// "GiB" are the same unit.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::Unlimited);
        }

        let split_at = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split_at);
        if number.is_empty() {
            return Err(anyhow!("Invalid size: {text}"));
        }

        let value: f64 = number.parse()?;
        let exponent = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 0,
            "k" | "kb" | "kib" => 1,
            "m" | "mb" | "mib" => 2,
            "g" | "gb" | "gib" => 3,
            "t" | "tb" | "tib" => 4,
            "p" | "pb" | "pib" => 5,
            "e" | "eb" | "eib" => 6,
            other => return Err(anyhow!("Invalid unit: {other}")),
        };

        let bytes = value * 1024_f64.powi(exponent);
        if !bytes.is_finite() || bytes >= u64::MAX as f64 {
            return Err(anyhow!("Size out of range: {text}"));
        }

        Ok(Self::Bytes(bytes.round() as u64))
    }

    /// Like [`DiskSize::parse`] but `None` on malformed input
    pub fn parse_or_none(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Human-readable string including the exact byte count
    pub fn to_human_string_with_bytes(&self) -> String {
        match self {
            Self::Bytes(bytes) => {
                format!("{} ({} bytes)", self, bytes.to_formatted_string(&Locale::en))
            }
            Self::Unlimited => self.to_string(),
        }
    }
}

impl Default for DiskSize {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for DiskSize {
    type Output = DiskSize;

    fn add(self, other: DiskSize) -> DiskSize {
        match (self, other) {
            (Self::Bytes(a), Self::Bytes(b)) => Self::Bytes(a.saturating_add(b)),
            _ => Self::Unlimited,
        }
    }
}

impl fmt::Display for DiskSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = match self {
            Self::Unlimited => return f.write_str("unlimited"),
            Self::Bytes(bytes) => *bytes,
        };

        let mut steps = 0;
        let mut val = bytes as f64;
        while val >= 1024. && steps < UNITS.len() - 1 {
            val /= 1024.;
            steps += 1;
        }

        if steps == 0 {
            write!(f, "{} B", bytes)
        } else {
            write!(f, "{:.2} {}", val, UNITS[steps])
        }
    }
}

// Byte counts travel as JSON numbers, "unlimited" as a string.
impl Serialize for DiskSize {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bytes(bytes) => serializer.serialize_u64(*bytes),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for DiskSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(bytes) => Ok(Self::Bytes(bytes)),
            Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
