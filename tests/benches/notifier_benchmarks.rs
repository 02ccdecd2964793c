//! # Ledger Notifier Benchmarks
//!
//! | Path | Claim |
//! |------|-------|
//! | Membership filter | probe cost independent of tracked item count |
//! | Change dispatch | interest check stays cheap for untracked batches |
//! | Market fan-out | grouping by pair scales with batch size |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ln_01_membership_filter::{BloomFilter, FilterParameters};
use ln_02_change_notifier::{callback, InMemoryLedger, LedgerObserver, NotifierConfig, SessionHub};
use ln_tests::integration::fixtures::{accounts, balance, limit_order};
use rand::Rng;
use shared_types::{AssetId, ObjectId, ObjectKind};
use tokio::runtime::Runtime;

// ============================================================================
// Membership filter
// ============================================================================

fn bench_filter_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership-filter");
    let params = FilterParameters::default();

    for tracked in [100usize, 1_000, 10_000] {
        let mut filter = BloomFilter::with_parameters(&params);
        let mut rng = rand::thread_rng();
        for _ in 0..tracked {
            filter.insert(&rng.gen::<u64>().to_be_bytes());
        }
        let probes: Vec<[u8; 8]> = (0..1_000).map(|_| rng.gen::<u64>().to_be_bytes()).collect();

        group.throughput(Throughput::Elements(probes.len() as u64));
        group.bench_with_input(BenchmarkId::new("contains", tracked), &probes, |b, probes| {
            b.iter(|| {
                probes
                    .iter()
                    .filter(|probe| filter.contains(probe.as_slice()))
                    .count()
            })
        });
    }

    group.bench_function("insert", |b| {
        let mut filter = BloomFilter::with_parameters(&params);
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            filter.insert(black_box(&n.to_be_bytes()));
        })
    });

    group.finish();
}

// ============================================================================
// Change dispatch through the hub
// ============================================================================

fn seeded_hub(runtime: &Runtime, batch: u64) -> (SessionHub<InMemoryLedger>, Vec<ObjectId>) {
    let _guard = runtime.enter();
    let ledger = Arc::new(InMemoryLedger::new());
    let ids = (0..batch)
        .map(|i| {
            ledger.insert(balance(i, 1, 0, 1));
            ObjectKind::AccountBalance.id(i)
        })
        .collect();
    let hub = SessionHub::start(ledger, NotifierConfig::default()).expect("hub starts");
    (hub, ids)
}

fn bench_change_dispatch(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("change-dispatch");

    for batch in [16u64, 256, 1_024] {
        let (hub, ids) = seeded_hub(&runtime, batch);
        let sessions: Vec<_> = (0..8)
            .map(|_| {
                let session = hub.open_session();
                {
                    let mut guard = session.lock();
                    let _ = guard.subscribe(callback(|_| Ok(())), false);
                    // One tracked id per session, the rest is noise
                    guard.get_objects(&ids[..1]);
                }
                session
            })
            .collect();
        let impacted = accounts(&[]);

        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::new("on_changed", batch), &ids, |b, ids| {
            b.iter(|| hub.on_changed(black_box(ids), &impacted))
        });

        drop(sessions);
        runtime.block_on(hub.shutdown());
    }

    group.finish();
}

fn bench_market_fan_out(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let _guard = runtime.enter();
    let mut group = c.benchmark_group("market-fan-out");

    let ledger = Arc::new(InMemoryLedger::new());
    let ids: Vec<ObjectId> = (0..512u64)
        .map(|i| {
            ledger.insert(limit_order(i, 1, 0, 1 + i % 16));
            ObjectKind::LimitOrder.id(i)
        })
        .collect();
    let hub = SessionHub::start(ledger, NotifierConfig::default()).expect("hub starts");
    let session = hub.open_session();
    for quote in 1..=4 {
        let _ = session
            .lock()
            .subscribe_market(callback(|_| Ok(())), AssetId(0), AssetId(quote));
    }
    let impacted = accounts(&[1]);

    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("orders_across_16_pairs", |b| {
        b.iter(|| hub.on_changed(black_box(&ids), &impacted))
    });

    group.finish();
    drop(session);
}

criterion_group!(
    benches,
    bench_filter_probe,
    bench_change_dispatch,
    bench_market_fan_out
);
criterion_main!(benches);
