use crate::packet::Cursor;

/// Iteration budget for one question name, root label included.
pub const MAX_LABELS: usize = 50;

const LABEL_TYPE_MASK: u8 = 0xC0;

/// Why a name walk gave up. None of these is an error; the packet is just
/// not one this crate rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAbort {
    /// A length byte would lie at or past the end of the buffer.
    Truncated,
    /// Both top bits set (RFC 1035 §4.1.4).
    CompressionPointer,
    /// Exactly one top bit set: extended or reserved label type.
    ReservedLabelType,
    /// No root label within [`MAX_LABELS`] labels.
    TooManyLabels,
}

/// Offsets of a name's length bytes, in wire order, ending with the root.
#[derive(Debug, Clone, Copy)]
pub struct LabelSequence {
    offsets: [usize; MAX_LABELS],
    root: usize,
}

impl LabelSequence {
    /// Index of the root label, which is also the number of non-root labels.
    pub fn count(&self) -> usize {
        self.root
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets[..=self.root]
    }

    /// Offset of the label `back` positions before the root.
    pub fn from_root(&self, back: usize) -> Option<usize> {
        self.root.checked_sub(back).map(|i| self.offsets[i])
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Walk {
    Terminated(LabelSequence),
    Aborted(WalkAbort),
}

/// Walks the label sequence starting at the cursor.
///
/// Each length byte is bounds-checked before it is read. The label body is
/// skipped without a check of its own; a body that runs off the buffer makes
/// the next length read fail instead. On success the cursor sits just past
/// the root label.
pub fn walk_labels(cursor: &mut Cursor<'_>) -> Walk {
    let mut offsets = [0usize; MAX_LABELS];

    for i in 0..MAX_LABELS {
        let Some(len) = cursor.peek_u8() else {
            return Walk::Aborted(WalkAbort::Truncated);
        };
        match len & LABEL_TYPE_MASK {
            0x00 => {}
            LABEL_TYPE_MASK => return Walk::Aborted(WalkAbort::CompressionPointer),
            _ => return Walk::Aborted(WalkAbort::ReservedLabelType),
        }

        offsets[i] = cursor.position();
        cursor.advance(len as usize + 1);
        if len == 0 {
            return Walk::Terminated(LabelSequence { offsets, root: i });
        }
    }

    Walk::Aborted(WalkAbort::TooManyLabels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_name(labels: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for label in labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label);
        }
        out.push(0);
        out
    }

    fn walk(buf: &mut [u8]) -> Walk {
        walk_labels(&mut Cursor::new(buf))
    }

    #[test]
    fn test_walk_records_every_length_byte() {
        let mut buf = encode_name(&[b"www", b"example", b"com"]);
        let Walk::Terminated(labels) = walk(&mut buf) else {
            panic!("expected terminated walk");
        };
        assert_eq!(labels.count(), 3);
        assert_eq!(labels.offsets(), &[0, 4, 12, 16]);
        assert_eq!(labels.from_root(0), Some(16));
        assert_eq!(labels.from_root(3), Some(0));
        assert_eq!(labels.from_root(4), None);
    }

    #[test]
    fn test_walk_root_only() {
        let mut buf = [0u8];
        let Walk::Terminated(labels) = walk(&mut buf) else {
            panic!("expected terminated walk");
        };
        assert_eq!(labels.count(), 0);
        assert_eq!(labels.offsets(), &[0]);
    }

    #[test]
    fn test_walk_stops_at_cursor_past_root() {
        let mut buf = encode_name(&[b"a"]);
        buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        let mut cursor = Cursor::new(&mut buf);
        assert!(matches!(walk_labels(&mut cursor), Walk::Terminated(_)));
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_compression_pointer_aborts() {
        let mut buf = vec![3, b'w', b'w', b'w', 0xC0, 0x0C];
        assert!(matches!(
            walk(&mut buf),
            Walk::Aborted(WalkAbort::CompressionPointer)
        ));
    }

    #[test]
    fn test_reserved_label_types_abort() {
        for first in [0x40u8, 0x7F, 0x80, 0xBF] {
            let mut buf = vec![first, 0, 0];
            assert!(
                matches!(walk(&mut buf), Walk::Aborted(WalkAbort::ReservedLabelType)),
                "length byte {:#04x}",
                first
            );
        }
    }

    #[test]
    fn test_truncated_body_aborts_on_next_read() {
        let mut buf = vec![10, b'a', b'b'];
        assert!(matches!(walk(&mut buf), Walk::Aborted(WalkAbort::Truncated)));

        let mut empty: [u8; 0] = [];
        assert!(matches!(walk(&mut empty), Walk::Aborted(WalkAbort::Truncated)));
    }

    #[test]
    fn test_missing_root_aborts() {
        let mut buf = vec![1, b'a', 1, b'b'];
        assert!(matches!(walk(&mut buf), Walk::Aborted(WalkAbort::Truncated)));
    }

    #[test]
    fn test_label_budget() {
        let label: &[u8] = b"x";
        let mut fits = encode_name(&vec![label; MAX_LABELS - 1]);
        let Walk::Terminated(labels) = walk(&mut fits) else {
            panic!("49 labels plus root should fit");
        };
        assert_eq!(labels.count(), MAX_LABELS - 1);

        let mut too_long = encode_name(&vec![label; MAX_LABELS]);
        assert!(matches!(
            walk(&mut too_long),
            Walk::Aborted(WalkAbort::TooManyLabels)
        ));
    }

    #[test]
    fn test_every_prefix_of_a_name_is_safe() {
        let name = encode_name(&[b"abc", b"1500-plus0", b"pmtu4", b"example", b"net"]);
        for cut in 0..name.len() {
            let mut prefix = name[..cut].to_vec();
            assert!(
                matches!(walk(&mut prefix), Walk::Aborted(WalkAbort::Truncated)),
                "prefix of {} bytes",
                cut
            );
        }
    }
}
