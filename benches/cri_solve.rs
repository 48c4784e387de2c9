use criterion::{criterion_group, criterion_main, Criterion};

use gridrival::comb::Combinator;
use gridrival::optimiser::{Constraints, Solver, SolverConfig};
use gridrival::roster::Snapshot;

fn criterion_benchmark(c: &mut Criterion) {
    fn fixtures(entrants: usize, teams: usize) -> (Vec<Snapshot>, Vec<Snapshot>) {
        let entrants = (0..entrants)
            .map(|index| {
                let cost = 30e6 - 1.3e6 * index as f64;
                Snapshot::new(format!("d{index}"), cost, cost / 1e6 * 4.0 + index as f64)
            })
            .collect();
        let teams = (0..teams)
            .map(|index| {
                let cost = 27e6 - 2.1e6 * index as f64;
                Snapshot::new(format!("t{index}"), cost, cost / 1e6 * 3.0)
            })
            .collect();
        (entrants, teams)
    }

    c.bench_function("cri_comb_20c5", |b| {
        b.iter(|| Combinator::<5>::new(20).into_iter().count());
    });

    let (entrants, teams) = fixtures(20, 10);
    let solver = Solver::new(&entrants, &teams, SolverConfig::default());

    // sanity check
    assert_eq!(155_040, solver.universe(&Constraints::default()).unwrap().len());

    c.bench_function("cri_solve_20x10", |b| {
        let constraints = Constraints::with_budget(103.4e6);
        b.iter(|| solver.solve(&constraints).unwrap());
    });

    c.bench_function("cri_universe_20x10", |b| {
        let constraints = Constraints::with_budget(103.4e6);
        b.iter(|| solver.universe(&constraints).unwrap().len());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
