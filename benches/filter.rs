// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orgweave::model::ViewContext;
use orgweave::query::view::{visible_containers, visible_graph};

mod fixtures;

use fixtures::{business_id, lanes_org};

// Benchmark identity (keep stable):
// - Group name in this file: `query.visible`
// - Case IDs must remain stable across refactors (e.g. `business_600`).
fn benches_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("query.visible");

    let graph = lanes_org(600, 12);
    let company = ViewContext::Company;
    let business = ViewContext::Business(business_id("biz-3"));

    group.bench_function("containers_company_600", |b| {
        b.iter(|| black_box(visible_containers(black_box(&graph), &company)).len());
    });

    group.bench_function("containers_business_600", |b| {
        b.iter(|| black_box(visible_containers(black_box(&graph), &business)).len());
    });

    group.bench_function("graph_business_600", |b| {
        b.iter(|| {
            let visible = visible_graph(black_box(&graph), &business);
            black_box(visible.nodes.len() + visible.containers.len())
        });
    });

    group.finish();
}

criterion_group!(benches, benches_filter);
criterion_main!(benches);
