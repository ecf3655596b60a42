use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;
use crate::probe_size::ProbeSize;

/// Payload length of a marker label, `DDDD-plusM`.
pub const MARKER_LABEL_LEN: usize = 10;

/// Payload offset of the size field's first digit.
pub const SIZE_FIELD_OFFSET: usize = 0;

/// Payload offset of the `-plus` tag.
pub const TAG_OFFSET: usize = 4;

/// Payload offset of the marker digit.
pub const DIGIT_OFFSET: usize = 9;

pub const TAG: &[u8; 5] = b"-plus";

/// State digit carried in the last byte of a marker label.
///
/// Untagged queries carry `Zero`. The ingress rewrite picks one of the other
/// six from the raw length byte of the counter label, see
/// [`MarkerDigit::from_selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerDigit {
    Zero,
    Two,
    Four,
    Six,
    Eight,
    Ten,
    Twelve,
}

impl MarkerDigit {
    pub const TAGGED: [MarkerDigit; 6] = [
        MarkerDigit::Two,
        MarkerDigit::Four,
        MarkerDigit::Six,
        MarkerDigit::Eight,
        MarkerDigit::Ten,
        MarkerDigit::Twelve,
    ];

    /// Maps a counter label length to the digit it selects.
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            39 => Some(MarkerDigit::Two),
            38 => Some(MarkerDigit::Four),
            37 => Some(MarkerDigit::Six),
            36 => Some(MarkerDigit::Eight),
            35 => Some(MarkerDigit::Ten),
            34 => Some(MarkerDigit::Twelve),
            _ => None,
        }
    }

    /// Counter label length that selects this digit; `None` for `Zero`.
    pub fn selector(&self) -> Option<u8> {
        match self {
            MarkerDigit::Zero => None,
            MarkerDigit::Two => Some(39),
            MarkerDigit::Four => Some(38),
            MarkerDigit::Six => Some(37),
            MarkerDigit::Eight => Some(36),
            MarkerDigit::Ten => Some(35),
            MarkerDigit::Twelve => Some(34),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            MarkerDigit::Zero => b'0',
            MarkerDigit::Two => b'2',
            MarkerDigit::Four => b'4',
            MarkerDigit::Six => b'6',
            MarkerDigit::Eight => b'8',
            MarkerDigit::Ten => b'a',
            MarkerDigit::Twelve => b'c',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_lowercase() {
            b'0' => Some(MarkerDigit::Zero),
            b'2' => Some(MarkerDigit::Two),
            b'4' => Some(MarkerDigit::Four),
            b'6' => Some(MarkerDigit::Six),
            b'8' => Some(MarkerDigit::Eight),
            b'a' => Some(MarkerDigit::Ten),
            b'c' => Some(MarkerDigit::Twelve),
            _ => None,
        }
    }

    pub fn is_pristine(&self) -> bool {
        matches!(self, MarkerDigit::Zero)
    }
}

impl fmt::Display for MarkerDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Text form of a marker label as produced by a cooperating query generator,
/// e.g. `1500-plus0` in `$r-$t-$p.1500-plus0.pmtu4.example.net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerLabel {
    pub size: ProbeSize,
    pub digit: MarkerDigit,
}

impl MarkerLabel {
    pub fn new(size: ProbeSize, digit: MarkerDigit) -> Self {
        Self { size, digit }
    }

    pub fn pristine(size: ProbeSize) -> Self {
        Self::new(size, MarkerDigit::Zero)
    }

    pub fn to_bytes(&self) -> [u8; MARKER_LABEL_LEN] {
        let mut out = [0u8; MARKER_LABEL_LEN];
        out[SIZE_FIELD_OFFSET..TAG_OFFSET].copy_from_slice(&self.size.digits());
        out[TAG_OFFSET..DIGIT_OFFSET].copy_from_slice(TAG);
        out[DIGIT_OFFSET] = self.digit.as_byte();
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidMarkerLabel(String::from_utf8_lossy(bytes).into_owned());

        if bytes.len() != MARKER_LABEL_LEN {
            return Err(invalid());
        }
        if !bytes[TAG_OFFSET..DIGIT_OFFSET].eq_ignore_ascii_case(TAG) {
            return Err(invalid());
        }

        let mut digits = [0u8; 4];
        digits.copy_from_slice(&bytes[SIZE_FIELD_OFFSET..TAG_OFFSET]);
        let size = ProbeSize::from_digits(&digits).ok_or_else(invalid)?;
        let digit = MarkerDigit::from_byte(bytes[DIGIT_OFFSET])
            .ok_or(DomainError::InvalidMarkerDigit(bytes[DIGIT_OFFSET] as char))?;

        Ok(Self { size, digit })
    }
}

impl fmt::Display for MarkerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-plus{}", self.size, self.digit)
    }
}

impl FromStr for MarkerLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}
