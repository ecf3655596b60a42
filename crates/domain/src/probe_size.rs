use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Probe size carried by an untagged query name.
pub const DEFAULT_PROBE_SIZE: u16 = 1500;

/// Smallest link MTU every IPv6 path must support (RFC 8200 §5).
pub const IPV6_MIN_MTU: u16 = 1280;

/// A path-MTU candidate that fits the four-digit size field of a marker label.
///
/// The value is always in `1000..=9999`, so [`ProbeSize::digits`] never needs
/// padding or truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ProbeSize(u16);

impl ProbeSize {
    pub const DEFAULT: ProbeSize = ProbeSize(DEFAULT_PROBE_SIZE);

    pub fn new(value: u16) -> Result<Self, DomainError> {
        if (1000..=9999).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidProbeSize(value as u32))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn is_default(self) -> bool {
        self.0 == DEFAULT_PROBE_SIZE
    }

    /// Decimal ASCII form, most significant digit first.
    pub fn digits(self) -> [u8; 4] {
        let v = self.0;
        [
            b'0' + (v / 1000) as u8,
            b'0' + (v / 100 % 10) as u8,
            b'0' + (v / 10 % 10) as u8,
            b'0' + (v % 10) as u8,
        ]
    }

    /// Reads a size field. Returns `None` unless all four bytes are ASCII
    /// digits and the leading digit is non-zero.
    pub fn from_digits(digits: &[u8; 4]) -> Option<Self> {
        let mut value: u16 = 0;
        for &d in digits {
            if !d.is_ascii_digit() {
                return None;
            }
            value = value * 10 + (d - b'0') as u16;
        }
        Self::new(value).ok()
    }
}

impl Default for ProbeSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u16> for ProbeSize {
    type Error = DomainError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProbeSize> for u16 {
    fn from(size: ProbeSize) -> Self {
        size.0
    }
}

impl FromStr for ProbeSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u16 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidProbeSizeText(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for ProbeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
