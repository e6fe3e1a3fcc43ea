#![allow(dead_code)]

use provenance_rs::{AccountId, Registry};

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub fn manufacturer() -> AccountId {
    AccountId::parse("0x1111111111111111111111111111111111111111").unwrap()
}

pub fn customer() -> AccountId {
    AccountId::parse("0x2222222222222222222222222222222222222222").unwrap()
}

pub fn collector() -> AccountId {
    AccountId::parse("0x3333333333333333333333333333333333333333").unwrap()
}

pub fn imei(n: u64) -> String {
    format!("IMEI-{n:015}")
}

/// Registry pre-seeded with `count` products from `manufacturer()`.
pub fn seeded_registry(count: u64) -> Registry {
    let registry = Registry::new();
    let maker = manufacturer();
    for n in 0..count {
        registry.register(&imei(n), &maker).unwrap();
    }
    registry
}
