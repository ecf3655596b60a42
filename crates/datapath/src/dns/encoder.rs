use qrewrite_domain::{MarkerDigit, ProbeSize};

use super::marker::MarkerMatch;
use crate::packet::TransportChecksum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    Encoded {
        digit: MarkerDigit,
        size_rewritten: bool,
    },
    /// The marker digit was not '0'; carries the digit byte found.
    AlreadyTagged(u8),
    /// The counter label length is not one of the six selectors.
    SelectorMiss(u8),
}

/// Tags a pristine marker with the digit its counter label selects, and
/// stamps the probe size into the size field when it differs from 1500.
///
/// A tagged marker or an unknown selector leaves the buffer untouched.
pub fn encode(
    buf: &mut [u8],
    marker: &MarkerMatch,
    checksum: &TransportChecksum,
    probe: ProbeSize,
) -> EncodeOutcome {
    let current = marker.digit(buf);
    if current != MarkerDigit::Zero.as_byte() {
        return EncodeOutcome::AlreadyTagged(current);
    }
    let Some(digit) = MarkerDigit::from_selector(marker.selector) else {
        return EncodeOutcome::SelectorMiss(marker.selector);
    };

    checksum.rewrite(buf, marker.digit_offset(), &[digit.as_byte()]);

    let size_rewritten = !probe.is_default()
        && marker.size_field(buf) == ProbeSize::DEFAULT.digits()
        && checksum.rewrite(buf, marker.size_offset(), &probe.digits());

    EncodeOutcome::Encoded {
        digit,
        size_rewritten,
    }
}
