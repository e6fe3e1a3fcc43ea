//! Concurrent callers: writes serialize into one total order, reads never
//! observe a half-applied write.

mod fixtures;

use std::collections::BTreeSet;
use std::sync::Barrier;
use std::thread;

use fixtures::identity::{imei, manufacturer};
use provenance_rs::{Registry, RegistryError, Seq0};

#[test]
fn concurrent_registrations_get_distinct_gapless_seqs() {
    const WRITERS: usize = 8;
    const PER_WRITER: u64 = 25;

    let registry = Registry::new();
    let barrier = Barrier::new(WRITERS);
    let maker = manufacturer();

    let seqs: Vec<u64> = thread::scope(|scope| {
        let mut handles = Vec::new();
        for w in 0..WRITERS {
            let registry = registry.clone();
            let barrier = &barrier;
            let maker = maker.clone();
            handles.push(scope.spawn(move || {
                barrier.wait();
                let mut out = Vec::new();
                for n in 0..PER_WRITER {
                    let id = imei(w as u64 * 1000 + n);
                    out.push(registry.register(&id, &maker).unwrap().seq.get());
                }
                out
            }));
        }
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let total = WRITERS as u64 * PER_WRITER;
    let distinct: BTreeSet<u64> = seqs.iter().copied().collect();
    assert_eq!(distinct.len() as u64, total);
    assert_eq!(*distinct.first().unwrap(), 1);
    assert_eq!(*distinct.last().unwrap(), total);

    assert_eq!(registry.total_count() as u64, total);
    assert_eq!(registry.events_since(Seq0::ZERO).len() as u64, total);
    registry.snapshot().check_invariants().unwrap();
}

#[test]
fn racing_duplicate_registrations_admit_exactly_one() {
    const RACERS: usize = 8;

    let registry = Registry::new();
    let barrier = Barrier::new(RACERS);

    let outcomes: Vec<bool> = thread::scope(|scope| {
        let mut handles = Vec::new();
        for r in 0..RACERS {
            let registry = registry.clone();
            let barrier = &barrier;
            handles.push(scope.spawn(move || {
                let maker = provenance_rs::AccountId::parse(&format!("0xracer{r}")).unwrap();
                barrier.wait();
                registry.register("IMEI-CONTESTED", &maker).is_ok()
            }));
        }
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(registry.total_count(), 1);
    registry.verify("IMEI-CONTESTED").unwrap();
}

#[test]
fn racing_sales_authorize_against_admitted_state() {
    const RACERS: usize = 6;

    let registry = Registry::new();
    let maker = manufacturer();
    registry.register("IMEI-1", &maker).unwrap();
    let barrier = Barrier::new(RACERS);

    // All racers claim to sell as the manufacturer; only the first admitted
    // write still sees the manufacturer as owner.
    let results: Vec<Result<(), RegistryError>> = thread::scope(|scope| {
        let mut handles = Vec::new();
        for r in 0..RACERS {
            let registry = registry.clone();
            let barrier = &barrier;
            let maker = maker.clone();
            handles.push(scope.spawn(move || {
                barrier.wait();
                registry
                    .sell("IMEI-1", &maker, &format!("0xbuyer{r}"))
                    .map(|_| ())
            }));
        }
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, RegistryError::Unauthorized { .. }));
        }
    }

    let record = registry.verify("IMEI-1").unwrap();
    assert!(record.is_sold);
    assert_eq!(record.transfer_count, 1);
    registry.snapshot().check_invariants().unwrap();
}

#[test]
fn readers_see_consistent_snapshots_during_writes() {
    const PRODUCTS: u64 = 200;

    let registry = Registry::new();
    let maker = manufacturer();

    thread::scope(|scope| {
        let writer = {
            let registry = registry.clone();
            let maker = maker.clone();
            scope.spawn(move || {
                for n in 0..PRODUCTS {
                    registry.register(&imei(n), &maker).unwrap();
                }
            })
        };

        let reader = {
            let registry = registry.clone();
            scope.spawn(move || {
                loop {
                    let count = registry.total_count();
                    // Every id the index exposes must already be verifiable:
                    // a reader can never catch the order ahead of the map.
                    for i in 0..count {
                        let id = registry.get_by_index(i).unwrap();
                        assert!(registry.is_registered(id.as_str()));
                    }
                    // A later write may land between the two reads, so the
                    // head can only be at or past the observed count.
                    assert!(registry.head_seq().get() >= count as u64);
                    if count as u64 == PRODUCTS {
                        break;
                    }
                    std::hint::spin_loop();
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    });

    registry.snapshot().check_invariants().unwrap();
}
