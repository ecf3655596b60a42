//! Fuzz target for the ingress hook.
//!
//! Arbitrary frames must never panic, and the frame length never changes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use qrewrite_datapath::{IngressHook, PacketHook};
use qrewrite_domain::{ProbeConfig, ProbeSize};

fuzz_target!(|data: &[u8]| {
    let mut frame = data.to_vec();
    IngressHook::default().process(&mut frame);
    assert_eq!(frame.len(), data.len());

    // A non-default probe size also exercises the size-field rewrite
    let size = ProbeSize::new(1492).unwrap();
    let mut frame = data.to_vec();
    let report = IngressHook::new(ProbeConfig::new(size, size)).process(&mut frame);
    assert_eq!(report.modified(), frame != data);
});
