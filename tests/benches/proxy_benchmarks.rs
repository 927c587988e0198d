//! # IBC Proxy Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Commitment tree | Root and proof generation over a chain store |
//! | Multi-hop client | Client state verification per proof depth |
//! | Proxy keeper | Verify-and-commit of one upstream client state |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ibc_proxy_client::{CommitmentTree, LightClient, ProofContext};
use ibc_proxy_keeper::ClientKeeper;
use ibc_proxy_tests::harness::Coordinator;
use ibc_proxy_tests::integration::multihop::Topology;
use ibc_proxy_tests::integration::proxy_flow::ProxyNetwork;
use ibc_proxy_types::path::client_state_path;
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Commitment tree
// ============================================================================

fn store_entries(size: usize) -> BTreeMap<Vec<u8>, Vec<u8>> {
    (0..size)
        .map(|i| {
            (
                format!("ibc/clients/merkle-{i}/clientState").into_bytes(),
                vec![(i % 251) as u8; 64],
            )
        })
        .collect()
}

fn bench_commitment_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("commitment-tree");

    for size in [100, 1_000, 10_000] {
        let entries = store_entries(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &entries, |b, entries| {
            b.iter(|| black_box(CommitmentTree::from_entries(entries.clone()).root()))
        });

        let tree = CommitmentTree::from_entries(entries);
        let present = format!("ibc/clients/merkle-{}/clientState", size / 2).into_bytes();
        let absent = b"ibc/clients/zzz/clientState".to_vec();
        group.bench_with_input(BenchmarkId::new("prove_member", size), &tree, |b, tree| {
            b.iter(|| black_box(tree.prove(&present).is_ok()))
        });
        group.bench_with_input(BenchmarkId::new("prove_absent", size), &tree, |b, tree| {
            b.iter(|| black_box(tree.prove(&absent).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// Multi-hop verification
// ============================================================================

fn bench_multihop_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("multihop-verification");
    group.measurement_time(Duration::from_secs(10));
    let coordinator = Coordinator::new();

    for depth in [0u32, 1, 3, 7] {
        let Ok(topology) = Topology::build(&coordinator, depth) else {
            continue;
        };
        let (Ok(proof), Ok(height), Ok(client), Ok(target)) = (
            topology.client_proof().and_then(|p| Ok(p.to_bytes()?)),
            topology.height(),
            topology.local.client_state(&topology.multihop_client_id),
            topology.target_client(),
        ) else {
            continue;
        };
        let store = topology
            .local
            .host()
            .client_store(&topology.multihop_client_id);
        let prefix = topology.chains[0].prefix().clone();
        let head_client_id = topology.proxy_client_ids[0].clone();

        group.bench_function(BenchmarkId::new("verify_client_state", depth), |b| {
            b.iter(|| {
                black_box(
                    client
                        .verify_client_state(
                            &store,
                            ProofContext::new(height, &prefix, &proof),
                            &head_client_id,
                            &target,
                        )
                        .is_ok(),
                )
            })
        });
    }

    group.finish();
}

// ============================================================================
// Proxy keeper
// ============================================================================

fn bench_verify_and_proxy(c: &mut Criterion) {
    let mut group = c.benchmark_group("proxy-keeper");

    let Ok(mut net) = ProxyNetwork::build() else {
        return;
    };
    if net.commit_upstream().is_err() {
        return;
    }
    let upstream = &net.upstream;
    let (Ok(proof), Ok(height), Ok(client_state)) = (
        upstream.proof(&client_state_path(&net.downstream_client_id)),
        upstream.height(),
        upstream.client_state(&net.downstream_client_id),
    ) else {
        return;
    };

    group.bench_function("verify_and_proxy_client_state", |b| {
        b.iter(|| {
            black_box(
                net.proxy
                    .keeper()
                    .verify_and_proxy_client_state(
                        &net.upstream_client_id,
                        ProofContext::new(height, upstream.prefix(), &proof),
                        &net.downstream_client_id,
                        &client_state,
                    )
                    .is_ok(),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_commitment_tree,
    bench_multihop_verification,
    bench_verify_and_proxy,
);
criterion_main!(benches);
