pub mod decoder;
pub mod encoder;
pub mod labels;
pub mod marker;

pub use decoder::{restore_ipv4, restore_ipv6, Restore};
pub use encoder::{encode, EncodeOutcome};
pub use labels::{walk_labels, LabelSequence, Walk, WalkAbort, MAX_LABELS};
pub use marker::{match_marker, MarkerMatch};
