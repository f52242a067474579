use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use ttm4_core::{DipoleMethod, Exclusions, MonomerType, Topology};
use ttm4_engine::Engine;

/// A bare water-like topology with no intramonomer exclusions: three sites
/// per monomer, a fixed intramonomer a_DD, and a trivial `gammq` stand-in
/// (accurate enough for a benchmark, which only cares about wall time).
struct BenchTopology;

impl Topology for BenchTopology {
    fn excluded(&self, _mon_id: &str) -> Exclusions {
        Exclusions::default()
    }

    fn get_add(&self, _is_12: bool, _is_13: bool, _is_14: bool, _mon_id: &str) -> f64 {
        0.626
    }

    fn redistribute_virt_grads_to_real(
        &self,
        _mon_id: &str,
        _nmon: usize,
        _first_crd: usize,
        _grad: &mut [f64],
    ) {
    }

    fn charge_derivative_force(
        &self,
        _mon_id: &str,
        _nmon: usize,
        _first_crd: usize,
        _first_site: usize,
        _sys_phi: &[f64],
        _grad: &mut [f64],
        _sys_chg_grad: &[f64],
    ) {
    }

    fn gammq_075(&self, u: f64) -> f64 {
        (-u).exp()
    }

    fn g34(&self) -> f64 {
        1.225_416_702_465_18
    }
}

fn water_system(n_waters: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<MonomerType>) {
    let nsites = 3;
    let n = n_waters * nsites;

    let mut xyz = Vec::with_capacity(3 * n);
    let mut chg = Vec::with_capacity(n);
    let mut pol = Vec::with_capacity(n);
    let mut polfac = Vec::with_capacity(n);

    for w in 0..n_waters {
        let base = (w as f64) * 3.0;
        xyz.extend_from_slice(&[base, 0.0, 0.0]);
        xyz.extend_from_slice(&[base + 0.96, 0.0, 0.0]);
        xyz.extend_from_slice(&[base, 0.96, 0.0]);

        chg.extend_from_slice(&[-0.8, 0.4, 0.4]);
        pol.extend_from_slice(&[0.001_310, 0.000_294, 0.000_294]);
        polfac.extend_from_slice(&[0.837, 0.496, 0.496]);
    }

    let types = vec![MonomerType::new("wat", n_waters, nsites)];
    (xyz, chg, pol, polfac, types)
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("dipole_solvers");

    for &method in &[DipoleMethod::ConjugateGradient, DipoleMethod::Iterative, DipoleMethod::Aspc] {
        let (xyz, chg, pol, polfac, types) = water_system(8);
        let n = chg.len();
        let chg_grad = vec![0.0; n];

        let mut engine = Engine::initialize(
            &chg,
            &chg_grad,
            &polfac,
            &pol,
            &xyz,
            types,
            false,
            1.0e-8,
            100,
            method,
            Arc::new(BenchTopology),
        )
        .expect("bench system is well-formed");

        group.bench_function(format!("{method:?}"), |b| {
            b.iter(|| {
                let mut grad = vec![0.0; 3 * n];
                engine.get_electrostatics(&mut grad).expect("converges")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
