use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use signpost_core::directory::{ListRange, ResourceDirectory};
use signpost_core::planning::PolicyPayload;

fn populated(count: usize) -> ResourceDirectory<PolicyPayload> {
    let dir = ResourceDirectory::builder("routeplanning", "routepolicies").build();
    for i in 0..count {
        dir.create(PolicyPayload::new(format!("policy-{}", i)))
            .unwrap();
    }
    dir
}

fn bench_create(c: &mut Criterion) {
    c.bench_function("directory_create_1000", |b| {
        b.iter_batched(
            || ResourceDirectory::<PolicyPayload>::builder("routeplanning", "routepolicies").build(),
            |dir| {
                for i in 0..1000 {
                    dir.create(PolicyPayload::new(format!("policy-{}", i)))
                        .unwrap();
                }
                dir
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_list(c: &mut Criterion) {
    let dir = populated(1000);

    c.bench_function("directory_list_page_of_100", |b| {
        b.iter(|| black_box(dir.list(ListRange::new(450, 550))))
    });

    c.bench_function("directory_list_all", |b| {
        b.iter(|| black_box(dir.list(ListRange::all())))
    });
}

fn bench_lookup(c: &mut Criterion) {
    let dir = populated(1000);
    let last = dir.list(ListRange::default().starting_at(999))[0].id();

    c.bench_function("directory_element_lookup_worst_case", |b| {
        b.iter(|| black_box(dir.element(last).unwrap()))
    });
}

criterion_group!(benches, bench_create, bench_list, bench_lookup);
criterion_main!(benches);
