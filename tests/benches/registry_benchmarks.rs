//! # Agent Registry Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | `create_agent` | id allocation + record insert + persist (in-memory store) |
//! | `fund` / `withdraw` | ledger mutation, gate and payout round trip |
//! | `file_store` | full snapshot write through the file store at several registry sizes |
//! | `audit` | invariant sweep over the whole registry |

use agent_registry::adapters::codec::encode_snapshot;
use agent_registry::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;

const GOVERNANCE: Address = Address::repeat_byte(0x99);
const OWNER: Address = Address::repeat_byte(0xa1);
const LOGIC: Address = Address::repeat_byte(0x10);

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

fn populated(rt: &Runtime, agents: usize) -> TestRegistryService {
    let registry = create_test_service(GOVERNANCE).expect("registry");
    rt.block_on(async {
        for _ in 0..agents {
            let id = registry
                .create_agent(OWNER, CreateAgentRequest::new(OWNER, LOGIC, "ipfs://bench"))
                .await
                .expect("create");
            registry.fund(OWNER, id, U256::from(1_000)).await.expect("fund");
        }
    });
    registry
}

fn bench_create_agent(c: &mut Criterion) {
    let rt = runtime();
    let registry = create_test_service(GOVERNANCE).expect("registry");
    let registry = &registry;

    c.bench_function("create_agent", |b| {
        b.to_async(&rt).iter(move || async move {
            black_box(
                registry
                    .create_agent(OWNER, CreateAgentRequest::new(OWNER, LOGIC, "ipfs://bench"))
                    .await
                    .expect("create"),
            )
        })
    });
}

fn bench_ledger(c: &mut Criterion) {
    let rt = runtime();
    let registry = populated(&rt, 1);
    let registry = &registry;
    let id = AgentId(1);

    let mut group = c.benchmark_group("ledger");
    group.bench_function("fund", |b| {
        b.to_async(&rt)
            .iter(move || async move { registry.fund(OWNER, id, U256::one()).await.expect("fund") })
    });
    group.bench_function("fund_withdraw", |b| {
        b.to_async(&rt).iter(move || async move {
            registry.fund(OWNER, id, U256::one()).await.expect("fund");
            registry.withdraw(OWNER, id, U256::one()).await.expect("withdraw");
        })
    });
    group.finish();
}

fn bench_file_store(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("file_store");

    for size in [10usize, 100, 1_000] {
        let state = rt.block_on(populated(&rt, size).snapshot());
        let bytes = encode_snapshot(&state).expect("encode").len();
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSnapshotStore::open(dir.path()).expect("store");

        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::new("persist", size), &state, |b, state| {
            b.iter(|| store.persist(black_box(state)).expect("persist"))
        });
    }
    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let rt = runtime();
    let state = rt.block_on(populated(&rt, 1_000).snapshot());

    c.bench_function("audit_1000_agents", |b| {
        b.iter(|| black_box(check_all_invariants(black_box(&state))).is_valid())
    });
}

criterion_group!(
    benches,
    bench_create_agent,
    bench_ledger,
    bench_file_store,
    bench_audit
);
criterion_main!(benches);
