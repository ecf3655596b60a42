use qrewrite_domain::{MarkerDigit, ProbeSize};

use super::marker::MarkerMatch;
use crate::packet::{ChecksumRepair, TransportChecksum};

/// What the egress rewrite put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restore {
    /// Marker digit byte before the rewrite.
    pub previous_digit: u8,
    pub digit_restored: bool,
    pub size_restored: bool,
    pub checksum: ChecksumRepair,
}

impl Restore {
    pub fn changed(&self) -> bool {
        self.digit_restored || self.size_restored
    }
}

/// Resets the marker to its pristine form and zeroes the UDP checksum if
/// anything changed.
pub fn restore_ipv4(
    buf: &mut [u8],
    marker: &MarkerMatch,
    checksum: &TransportChecksum,
    probe: ProbeSize,
) -> Restore {
    let mut restore = restore_marker(buf, marker, probe, |buf, at, bytes| {
        buf[at..at + bytes.len()].copy_from_slice(bytes);
        true
    });
    if restore.changed() {
        checksum.invalidate(buf);
        restore.checksum = ChecksumRepair::Zeroed;
    }
    restore
}

/// Resets the marker to its pristine form, patching the UDP checksum word by
/// word. Also returns the offset of the marker label's length byte.
pub fn restore_ipv6(
    buf: &mut [u8],
    marker: &MarkerMatch,
    checksum: &TransportChecksum,
    probe: ProbeSize,
) -> (Restore, usize) {
    let mut restore = restore_marker(buf, marker, probe, |buf, at, bytes| {
        checksum.rewrite(buf, at, bytes)
    });
    if restore.changed() {
        restore.checksum = ChecksumRepair::Incremental;
    }
    (restore, marker.label)
}

fn restore_marker<W>(
    buf: &mut [u8],
    marker: &MarkerMatch,
    probe: ProbeSize,
    mut write: W,
) -> Restore
where
    W: FnMut(&mut [u8], usize, &[u8]) -> bool,
{
    let pristine = MarkerDigit::Zero.as_byte();
    let previous_digit = marker.digit(buf);

    let digit_restored =
        previous_digit != pristine && write(buf, marker.digit_offset(), &[pristine]);

    let size_restored = !probe.is_default()
        && marker.size_field(buf) == probe.digits()
        && write(buf, marker.size_offset(), &ProbeSize::DEFAULT.digits());

    Restore {
        previous_digit,
        digit_restored,
        size_restored,
        checksum: ChecksumRepair::Untouched,
    }
}
