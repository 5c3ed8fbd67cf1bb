//! Performance benchmarks for visibility decisions and fan-out
//!
//! Run with: cargo bench --bench decision_benchmarks

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sociograph::prelude::*;
use sociograph::relationships::decide;

const TENANT: &str = "bench";

fn sample_activity() -> Activity {
    Activity::builder(TENANT, "post.created", EntityRef::user("author"))
        .target(EntityRef::object("post", "p1"))
        .owner(EntityRef::object("group", "g1"))
        .tags(&["rust", "bench"])
        .build()
}

/// Edges from `viewer` that never fire, so every rule is evaluated
fn non_matching_edges(viewer: &EntityRef, count: usize) -> Vec<RelationshipEdge> {
    (0..count)
        .map(|i| {
            let kind = match i % 4 {
                0 => RelationshipKind::Block,
                1 => RelationshipKind::Deny,
                2 => RelationshipKind::Mute,
                _ => RelationshipKind::Allow,
            };
            let mut edge = RelationshipEdge::new(
                TENANT,
                viewer.clone(),
                EntityRef::user(format!("other-{}", i)),
                kind,
            );
            edge.id = format!("edge-{}", i);
            edge
        })
        .collect()
}

fn bench_pure_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    let viewer = EntityRef::user("viewer");
    let activity = sample_activity();
    let now = Utc::now();

    for count in [0usize, 16, 256] {
        let edges = non_matching_edges(&viewer, count);
        group.bench_with_input(BenchmarkId::new("edges", count), &edges, |b, edges| {
            b.iter(|| decide(black_box(&viewer), black_box(&activity), black_box(edges), now))
        });
    }

    group.finish();
}

fn bench_can_see(c: &mut Criterion) {
    let mut group = c.benchmark_group("can_see");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let graph = Sociograph::for_testing().unwrap();
    let viewer = EntityRef::user("viewer");
    let activity = sample_activity();

    rt.block_on(async {
        for edge in non_matching_edges(&viewer, 256) {
            graph.relationships().upsert(edge).await.unwrap();
        }
        graph
            .relationships()
            .upsert(RelationshipEdge::mute(TENANT, viewer.clone(), EntityRef::user("author")))
            .await
            .unwrap();
    });

    group.bench_function("in_memory_store", |b| {
        b.to_async(&rt).iter(|| async {
            let decision = graph
                .relationships()
                .can_see(TENANT, &viewer, &activity)
                .await
                .unwrap();
            black_box(decision)
        })
    });

    group.finish();
}

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for followers in [10usize, 100] {
        let graph = Sociograph::builder()
            .with_config(ConfigBuilder::new().build().unwrap())
            .build()
            .unwrap();
        let author = EntityRef::user("author");
        rt.block_on(async {
            for i in 0..followers {
                graph
                    .relationships()
                    .upsert(RelationshipEdge::follow(
                        TENANT,
                        EntityRef::user(format!("f{}", i)),
                        author.clone(),
                    ))
                    .await
                    .unwrap();
            }
        });

        // Re-publishing one activity measures resolution plus the dedup path
        let activity = sample_activity();
        group.bench_with_input(
            BenchmarkId::new("republish", followers),
            &activity,
            |b, activity| {
                b.to_async(&rt).iter(|| async {
                    let report = graph
                        .notifications()
                        .on_activity_published(activity)
                        .await
                        .unwrap();
                    black_box(report)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pure_decision, bench_can_see, bench_fanout);

criterion_main!(benches);
