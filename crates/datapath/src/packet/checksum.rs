use qrewrite_domain::AddressFamily;

use super::cursor::{set_u16_at, u16_at};
use super::headers::UdpHeader;

/// One's-complement addition with end-around carry.
#[inline]
fn ones_add(a: u16, b: u16) -> u16 {
    let sum = a as u32 + b as u32;
    ((sum & 0xFFFF) + (sum >> 16)) as u16
}

/// Incremental checksum update (RFC 1624, eqn. 3): `HC' = ~(~HC + ~m + m')`.
///
/// `old` and `new` are the before/after contents of one 16-bit word that is
/// aligned relative to the start of the checksummed region.
#[inline]
pub fn update(checksum: u16, old: u16, new: u16) -> u16 {
    let without_old = ones_add(!checksum, !old);
    !ones_add(without_old, new)
}

/// How the transport checksum was brought back in line after a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumRepair {
    Untouched,
    Incremental,
    Zeroed,
}

/// The UDP checksum field of one packet, plus the offset that word
/// alignment is measured from (the first byte of the UDP header).
#[derive(Debug, Clone, Copy)]
pub struct TransportChecksum {
    base: usize,
    field: usize,
    family: AddressFamily,
}

impl TransportChecksum {
    pub fn udp(header: &UdpHeader, family: AddressFamily) -> Self {
        Self {
            base: header.offset,
            field: header.checksum_offset(),
            family,
        }
    }

    pub fn value(&self, buf: &[u8]) -> u16 {
        u16_at(buf, self.field).unwrap_or(0)
    }

    /// Over IPv4 a zero checksum means the sender did not compute one.
    pub fn is_disabled(&self, buf: &[u8]) -> bool {
        self.family == AddressFamily::Ipv4 && self.value(buf) == 0
    }

    /// Offset of the aligned word containing `offset`.
    pub fn word_start(&self, offset: usize) -> usize {
        offset - (offset.wrapping_sub(self.base) & 1)
    }

    /// Writes `bytes` at `start` and folds each touched word into the
    /// checksum as soon as its bytes have changed.
    ///
    /// A field starting on an odd offset touches one word more than the same
    /// field on an even offset. A word that runs past the end of the buffer
    /// is read with a zero pad byte, matching how the checksum itself pads
    /// odd-length payloads. Returns `false`, leaving the buffer alone, when
    /// `bytes` does not fit.
    pub fn rewrite(&self, buf: &mut [u8], start: usize, bytes: &[u8]) -> bool {
        let end = match start.checked_add(bytes.len()) {
            Some(end) if end <= buf.len() => end,
            _ => return false,
        };
        let patch = !self.is_disabled(buf);
        let mut checksum = self.value(buf);

        let mut word = self.word_start(start);
        while word < end {
            let old = padded_word(buf, word);
            for i in word.max(start)..(word + 2).min(end) {
                buf[i] = bytes[i - start];
            }
            let new = padded_word(buf, word);
            if patch {
                checksum = update(checksum, old, new);
            }
            word += 2;
        }

        if patch {
            // RFC 768: a computed zero is transmitted as all ones
            let checksum = if checksum == 0 { 0xFFFF } else { checksum };
            set_u16_at(buf, self.field, checksum);
        }
        true
    }

    /// Marks the checksum as unused. Only meaningful for UDP over IPv4.
    pub fn invalidate(&self, buf: &mut [u8]) {
        set_u16_at(buf, self.field, 0);
    }
}

fn padded_word(buf: &[u8], offset: usize) -> u16 {
    let hi = buf.get(offset).copied().unwrap_or(0);
    let lo = buf.get(offset + 1).copied().unwrap_or(0);
    u16::from_be_bytes([hi, lo])
}
