//! End-to-end operation scenarios through the public `Registry` handle.

mod fixtures;

use fixtures::identity::{collector, customer, imei, manufacturer, ZERO_ADDRESS};
use provenance_rs::{Config, Limits, Registry, RegistryError, Seq0};

#[test]
fn register_verify_lifecycle() {
    let registry = Registry::new();
    let maker = manufacturer();

    let receipt = registry.register("IMEI-1", &maker).unwrap();
    assert_eq!(receipt.seq.get(), 1);

    assert_eq!(registry.total_count(), 1);
    assert_eq!(registry.get_by_index(0).unwrap().as_str(), "IMEI-1");

    let record = registry.verify("IMEI-1").unwrap();
    assert_eq!(record.current_owner, maker);
    assert_eq!(record.manufacturer, maker);
    assert!(record.is_registered);
    assert!(!record.is_sold);
}

#[test]
fn duplicate_registration_leaves_count_unchanged() {
    let registry = Registry::new();
    registry.register("IMEI-1", &manufacturer()).unwrap();

    let err = registry.register("IMEI-1", &customer()).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
    assert_eq!(registry.total_count(), 1);

    // The original manufacturer still owns the record.
    let record = registry.verify("IMEI-1").unwrap();
    assert_eq!(record.manufacturer, manufacturer());
}

#[test]
fn sale_chain_tracks_current_owner() {
    let registry = Registry::new();
    let maker = manufacturer();
    registry.register("IMEI-1", &maker).unwrap();

    registry
        .sell("IMEI-1", &maker, customer().as_str())
        .unwrap();
    let record = registry.verify("IMEI-1").unwrap();
    assert_eq!(record.current_owner, customer());
    assert!(record.is_sold);

    registry
        .sell("IMEI-1", &customer(), collector().as_str())
        .unwrap();
    let record = registry.verify("IMEI-1").unwrap();
    assert_eq!(record.current_owner, collector());
    assert_eq!(record.transfer_count, 2);

    // Provenance unchanged across both sales.
    assert_eq!(record.manufacturer, maker);
    assert_eq!(record.registered_at.get(), 1);
}

#[test]
fn former_owner_cannot_resell() {
    let registry = Registry::new();
    let maker = manufacturer();
    registry.register("IMEI-1", &maker).unwrap();
    registry
        .sell("IMEI-1", &maker, customer().as_str())
        .unwrap();

    let err = registry
        .sell("IMEI-1", &maker, collector().as_str())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized { .. }));
    assert_eq!(registry.verify("IMEI-1").unwrap().current_owner, customer());
}

#[test]
fn sale_to_zero_address_rejected() {
    let registry = Registry::new();
    let maker = manufacturer();
    registry.register("IMEI-1", &maker).unwrap();

    let err = registry.sell("IMEI-1", &maker, ZERO_ADDRESS).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidNewOwner { .. }));

    let record = registry.verify("IMEI-1").unwrap();
    assert!(!record.is_sold);
    assert_eq!(record.current_owner, maker);
    // The refused write consumed no sequence number.
    assert_eq!(registry.head_seq().get(), 1);
}

#[test]
fn unknown_product_cannot_be_sold_or_verified() {
    let registry = Registry::new();
    assert!(matches!(
        registry.verify("IMEI-404").unwrap_err(),
        RegistryError::NotFound { .. }
    ));
    assert!(matches!(
        registry
            .sell("IMEI-404", &manufacturer(), customer().as_str())
            .unwrap_err(),
        RegistryError::NotFound { .. }
    ));
    assert!(!registry.is_registered("IMEI-404"));
}

#[test]
fn empty_and_whitespace_ids_rejected() {
    let registry = Registry::new();
    for raw in ["", "   ", "\t\n"] {
        assert_eq!(
            registry.register(raw, &manufacturer()).unwrap_err(),
            RegistryError::EmptyIdentifier,
            "{raw:?}"
        );
    }
    assert_eq!(registry.total_count(), 0);
    assert!(registry.events_since(Seq0::ZERO).is_empty());
}

#[test]
fn configured_id_bounds_apply_to_writes() {
    let config = Config {
        limits: Limits {
            max_product_id_bytes: 4,
            ..Limits::default()
        },
        ..Config::default()
    };
    let registry = Registry::with_config(&config);
    let maker = manufacturer();

    let err = registry
        .register("IMEI-123456789012345678", &maker)
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidIdentifier { .. }));
    assert_eq!(registry.total_count(), 0);
    assert_eq!(registry.head_seq().get(), 0);

    registry.register("OK-1", &maker).unwrap();
    assert!(registry.is_registered("OK-1"));
}

#[test]
fn registry_status_tracks_the_log_head() {
    let registry = Registry::new();
    let maker = manufacturer();

    let status = registry.status();
    assert_eq!(status.total_products, 0);
    assert_eq!(status.head_seq, 0);
    assert!(status.head_sha256.is_none());

    registry.register("IMEI-1", &maker).unwrap();
    registry.sell("IMEI-1", &maker, customer().as_str()).unwrap();

    let status = registry.status();
    assert_eq!(status.total_products, 1);
    assert_eq!(status.head_seq, 2);
    assert_eq!(status.head_sha256, registry.head_sha256());
}

#[test]
fn index_enumeration_is_stable_under_later_writes() {
    let registry = Registry::new();
    let maker = manufacturer();
    registry.register(&imei(0), &maker).unwrap();
    registry.register(&imei(1), &maker).unwrap();

    let first = registry.get_by_index(0).unwrap();
    let second = registry.get_by_index(1).unwrap();

    // Sales and further registrations must not move existing indices.
    registry.sell(&imei(0), &maker, customer().as_str()).unwrap();
    registry.register(&imei(2), &maker).unwrap();

    assert_eq!(registry.get_by_index(0).unwrap(), first);
    assert_eq!(registry.get_by_index(1).unwrap(), second);
    assert_eq!(registry.get_by_index(2).unwrap().as_str(), imei(2));

    let err = registry.get_by_index(5).unwrap_err();
    assert_eq!(err, RegistryError::IndexOutOfBounds { index: 5, len: 3 });
}

#[test]
fn whitespace_around_id_is_the_same_key() {
    let registry = Registry::new();
    registry.register("  IMEI-1  ", &manufacturer()).unwrap();
    assert!(registry.is_registered("IMEI-1"));
    assert!(registry.is_registered(" IMEI-1 "));
    assert!(matches!(
        registry.register("IMEI-1", &manufacturer()).unwrap_err(),
        RegistryError::AlreadyRegistered { .. }
    ));
}
