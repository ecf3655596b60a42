use qrewrite_domain::marker::{DIGIT_OFFSET, MARKER_LABEL_LEN, TAG, TAG_OFFSET};

use super::labels::{LabelSequence, MAX_LABELS};

/// Labels between the marker and the root, root included:
/// `<counter>.<marker>.<zone>.<parent>.<tld>.`
const MARKER_FROM_ROOT: usize = 4;
const COUNTER_FROM_ROOT: usize = MARKER_FROM_ROOT + 1;

/// A marker label found in a question name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Absolute offset of the marker label's length byte.
    pub label: usize,
    /// Raw length byte of the counter label in front of the marker.
    pub selector: u8,
}

impl MarkerMatch {
    pub fn size_offset(&self) -> usize {
        self.label + 1
    }

    pub fn digit_offset(&self) -> usize {
        self.label + 1 + DIGIT_OFFSET
    }

    pub fn digit(&self, buf: &[u8]) -> u8 {
        buf[self.digit_offset()]
    }

    pub fn size_field(&self, buf: &[u8]) -> [u8; 4] {
        let at = self.size_offset();
        [buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]
    }
}

/// Finds a `DDDD-plusM` label four labels before the root.
///
/// Besides the label itself, the byte right after it must be inside the
/// buffer: the aligned word around the marker digit may extend into it.
pub fn match_marker(buf: &[u8], labels: &LabelSequence) -> Option<MarkerMatch> {
    let count = labels.count();
    if !(COUNTER_FROM_ROOT..MAX_LABELS).contains(&count) {
        return None;
    }

    let label = labels.from_root(MARKER_FROM_ROOT)?;
    let counter = labels.from_root(COUNTER_FROM_ROOT)?;

    if *buf.get(label)? as usize != MARKER_LABEL_LEN {
        return None;
    }
    let payload = buf.get(label + 1..label + MARKER_LABEL_LEN + 2)?;
    if !is_marker_payload(&payload[..MARKER_LABEL_LEN]) {
        return None;
    }

    Some(MarkerMatch {
        label,
        selector: *buf.get(counter)?,
    })
}

fn is_marker_payload(payload: &[u8]) -> bool {
    payload[..TAG_OFFSET].iter().all(u8::is_ascii_digit)
        && payload[TAG_OFFSET..DIGIT_OFFSET].eq_ignore_ascii_case(TAG)
}
