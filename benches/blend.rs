use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faer_core::{Mat, Parallelism};
use npk_blend::{
    solve_dense, BlendOptions, BlendSolver, Material, NutrientProfile, PriorityList,
    PIVOT_TOLERANCE,
};
use std::time::Duration;

fn blend_options(verbose: bool) -> BlendOptions {
    BlendOptions {
        verbose,
        ..BlendOptions::default()
    }
}

fn compound_materials() -> Vec<Material> {
    vec![
        Material::new("urea", NutrientProfile::new(460.0, 0.0, 0.0, 0.0), 25),
        Material::new("dap", NutrientProfile::new(180.0, 460.0, 0.0, 0.0), 25),
        Material::new("mop", NutrientProfile::new(0.0, 0.0, 600.0, 0.0), 25),
        Material::new("kieserite", NutrientProfile::new(0.0, 0.0, 0.0, 250.0), 10),
        Material::new("as", NutrientProfile::new(210.0, 0.0, 0.0, 0.0), 25),
        Material::new("filler", NutrientProfile::ZERO, 5),
    ]
}

fn bench_two_materials(c: &mut Criterion) {
    let materials = vec![
        Material::new("A", NutrientProfile::new(100.0, 0.0, 0.0, 0.0), 25),
        Material::new("B", NutrientProfile::new(0.0, 200.0, 0.0, 0.0), 25),
    ];
    let priorities = PriorityList::from_names(["A", "B"]);
    let target = NutrientProfile::new(20.0, 20.0, 0.0, 0.0);
    let solver = BlendSolver::new(Parallelism::None);
    let opts_verbose = blend_options(true);
    let opts_quiet = blend_options(false);
    let mut first = true;
    c.bench_function("two_materials", |b| {
        b.iter(|| {
            let opts = if first {
                first = false;
                &opts_verbose
            } else {
                &opts_quiet
            };
            let blend = solver
                .solve_materials(&materials, &priorities, &target, opts, None)
                .unwrap();
            black_box(blend);
        });
    });
}

fn bench_compound(c: &mut Criterion) {
    let materials = compound_materials();
    let priorities = PriorityList::from_names(["dap", "mop", "kieserite", "urea", "as"]);
    let target = NutrientProfile::new(12.0, 12.0, 17.0, 2.0);
    let solver = BlendSolver::new(Parallelism::None);
    let opts = blend_options(false);
    c.bench_function("compound_12_12_17_2", |b| {
        b.iter(|| {
            let blend = solver
                .solve_materials(&materials, &priorities, &target, &opts, None)
                .unwrap();
            black_box(blend);
        });
    });
}

fn bench_solve_dense(c: &mut Criterion) {
    let n = 16;
    let s = Mat::<f64>::from_fn(n, n, |i, j| {
        if i == j {
            n as f64 + 1.0
        } else {
            ((i * 7 + j * 3) % 5) as f64 / 5.0
        }
    });
    let rhs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    c.bench_function("solve_dense_16", |b| {
        b.iter(|| {
            let sol = solve_dense(s.as_ref(), &rhs, PIVOT_TOLERANCE).unwrap();
            black_box(sol);
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_millis(1000));
    targets =
        bench_two_materials,
        bench_compound,
        bench_solve_dense
}
criterion_main!(benches);
