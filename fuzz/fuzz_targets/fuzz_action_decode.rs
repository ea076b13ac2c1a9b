//! Fuzz target: action JSON decoding
//!
//! Feeds arbitrary bytes to the SaleAction / DistributionAction decoders.
//! Verifies decoding never panics and that decoded actions re-encode.
//!
//! Run: cargo +nightly fuzz run fuzz_action_decode

#![no_main]
use harvest_distribution::DistributionAction;
use harvest_sale::SaleAction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(action) = serde_json::from_slice::<SaleAction>(data) {
        let json = serde_json::to_string(&action).expect("decoded action must encode");
        let back: SaleAction = serde_json::from_str(&json).expect("re-decode");
        assert_eq!(back, action);
    }
    if let Ok(action) = serde_json::from_slice::<DistributionAction>(data) {
        let json = serde_json::to_string(&action).expect("decoded action must encode");
        let back: DistributionAction = serde_json::from_str(&json).expect("re-decode");
        assert_eq!(back, action);
    }
});
