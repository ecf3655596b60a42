//! Fuzz target for the question-name walker and marker matcher.

#![no_main]

use libfuzzer_sys::fuzz_target;
use qrewrite_datapath::dns::{match_marker, walk_labels, Walk, MAX_LABELS};
use qrewrite_datapath::packet::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut buf = data.to_vec();
    let mut cursor = Cursor::new(&mut buf);

    if let Walk::Terminated(labels) = walk_labels(&mut cursor) {
        assert!(labels.count() < MAX_LABELS);
        assert!(labels.offsets().iter().all(|&offset| offset < data.len()));
        assert_eq!(data[labels.offsets()[labels.count()]], 0);

        if let Some(marker) = match_marker(cursor.buffer(), &labels) {
            assert!(marker.digit_offset() + 1 < data.len());
        }
    }
});
