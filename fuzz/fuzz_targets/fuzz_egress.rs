//! Fuzz target for the egress hook.

#![no_main]

use libfuzzer_sys::fuzz_target;
use qrewrite_datapath::{EgressHook, PacketHook};
use qrewrite_domain::{ProbeConfig, ProbeSize};

fuzz_target!(|data: &[u8]| {
    let size = ProbeSize::new(1400).unwrap();
    let hook = EgressHook::new(ProbeConfig::new(size, size));

    let mut frame = data.to_vec();
    let first = hook.process(&mut frame);
    assert_eq!(frame.len(), data.len());

    // restoring twice is a no-op
    let once = frame.clone();
    let second = hook.process(&mut frame);
    assert!(!second.modified(), "{:?} then {:?}", first, second);
    assert_eq!(frame, once);
});
