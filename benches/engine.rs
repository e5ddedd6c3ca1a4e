//! Benchmarks for the epidemic engine and trial harness.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use epinet::{
    compute::{
        EngineOptions, InfectN, InitialInfectionStrategy, Simulation, generate, instantiate,
        trials::TrialHarness,
    },
    schema::{AgentBehavior, DiseaseSpec, SeirParams, StopRule, TrialConfig},
};

fn disease() -> DiseaseSpec {
    DiseaseSpec::Seir(SeirParams {
        time_to_i: 2,
        time_to_r: 5,
        infection_probability: 0.1,
        initial_infected: 10,
    })
}

fn bench_engine_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_step");

    for nodes in [1_000, 10_000, 100_000] {
        for (label, behavior) in [
            ("static", AgentBehavior::default()),
            ("rewiring", AgentBehavior::new(1, 20, 0.3, 0.001)),
        ] {
            let spec = disease();
            let mut rng = StdRng::seed_from_u64(1);
            let mut dis = instantiate(&spec, nodes);
            InfectN::new(spec.initial_infected())
                .apply(dis.as_mut(), &mut rng)
                .unwrap();
            let mut sim = Simulation::new(
                generate::ring(nodes),
                vec![dis],
                Arc::new(behavior),
                EngineOptions::default(),
                rng,
            )
            .unwrap();

            group.bench_with_input(
                BenchmarkId::new(label, nodes),
                &nodes,
                |b, _| {
                    b.iter(|| {
                        black_box(sim.step().unwrap());
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_harness(c: &mut Criterion) {
    let mut group = c.benchmark_group("harness");
    group.sample_size(10);

    for trials in [10, 100] {
        let harness = TrialHarness::from_specs(
            generate::clique_gate(5, 40, 4),
            &[disease()],
            AgentBehavior::new(1, 20, 0.3, 0.001),
            TrialConfig {
                trials,
                stop: StopRule::FixedSteps { steps: 100 },
                seed: Some(7),
                ..Default::default()
            },
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(trials), &trials, |b, _| {
            b.iter(|| black_box(harness.run().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine_step, bench_harness);
criterion_main!(benches);
