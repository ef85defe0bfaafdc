use std::time::Duration;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ilcone_core::{toy_dijet_event, FinalState, FinalStateProjection, Vec4};
use ilcone_jets::{ILConeAlgorithm, ILConeConfig, JetShape, JetShapeConfig};

fn ilcone_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0);
    let events: Vec<Vec<Vec4>> = (0..256)
        .map(|_| toy_dijet_event(&mut rng, 1960.0).momenta())
        .collect();
    let mut group = c.benchmark_group("ILCone Clustering");
    for radius in [0.4, 0.7, 1.0] {
        let algorithm = ILConeAlgorithm::new(ILConeConfig::d0_run2().with_cone_radius(radius))
            .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            let mut i = 0;
            b.iter_batched(
                || {
                    i = (i + 1) % events.len();
                    &events[i]
                },
                |items| std::hint::black_box(algorithm.cluster(items, 0.5)),
                BatchSize::SmallInput,
            )
        });
    }
    group.bench_function("cluster_many", |b| {
        let algorithm = ILConeAlgorithm::default();
        b.iter(|| std::hint::black_box(algorithm.cluster_many(&events, 0.5)))
    });
    group.finish();
}

fn jet_shape_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(1);
    let algorithm = ILConeAlgorithm::default();
    let shape = JetShape::new(JetShapeConfig::default()).unwrap();
    let inputs: Vec<_> = (0..256)
        .map(|_| {
            let event = toy_dijet_event(&mut rng, 1960.0);
            let particles = FinalState::new(-2.0, 2.0, 0.0).particles(&event);
            let axes: Vec<Vec4> = algorithm
                .cluster(&event.momenta(), 0.0)
                .into_iter()
                .map(|j| j.momentum)
                .collect();
            (particles, axes)
        })
        .collect();
    c.bench_function("Jet Shapes", |b| {
        let mut i = 0;
        b.iter_batched(
            || {
                i = (i + 1) % inputs.len();
                &inputs[i]
            },
            |(particles, axes)| std::hint::black_box(shape.compute(particles, axes)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = ilcone_benchmark, jet_shape_benchmark
}
criterion_main!(benches);
