use criterion::{Criterion, black_box, criterion_group, criterion_main};
use normative_core::checks::{implicit, indirect};
use normative_core::stats::{chi2_contingency, encode_labels, normalized_mutual_info};
use normative_core::{ColumnRoles, Dataset, ExceptionRegistry, Thresholds};

/// `rows` rows of `inputs` categorical input columns plus `sex` and `approved`.
fn synthetic(rows: usize, inputs: usize) -> (Dataset, Vec<String>) {
    let names: Vec<String> = (0..inputs).map(|i| format!("x{i}")).collect();
    let mut columns: Vec<(String, Vec<String>)> = names
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let values = (0..rows).map(|r| ((r * (c + 3) + c) % (c + 2)).to_string()).collect();
            (name.clone(), values)
        })
        .collect();
    columns.push((
        "sex".to_string(),
        (0..rows).map(|r| if r % 3 == 0 { "f" } else { "m" }.to_string()).collect(),
    ));
    columns.push((
        "approved".to_string(),
        (0..rows).map(|r| if r % 5 < 2 { "yes" } else { "no" }.to_string()).collect(),
    ));
    (Dataset::from_columns(columns).unwrap(), names)
}

fn bench_stats(c: &mut Criterion) {
    let a = encode_labels((0..10_000).map(|i| i % 7));
    let b = encode_labels((0..10_000).map(|i| i % 3));
    c.bench_function("nmi_10k_rows", |bench| {
        bench.iter(|| normalized_mutual_info(black_box(&a), black_box(&b)))
    });

    let table: Vec<Vec<u64>> = vec![vec![120, 80, 45], vec![60, 95, 70]];
    c.bench_function("chi2_contingency_2x3", |bench| {
        bench.iter(|| chi2_contingency(black_box(&table)))
    });
}

fn bench_implicit(c: &mut Criterion) {
    let (dataset, inputs) = synthetic(2_000, 8);
    let protected = vec!["sex".to_string()];

    c.bench_function("implicit_8_inputs_ceiling_3", |b| {
        b.iter(|| {
            implicit::check(
                black_box(&dataset),
                &inputs,
                &protected,
                &[],
                0.6,
                Some(3),
            )
        })
    });

    c.bench_function("implicit_8_inputs_all_sizes", |b| {
        b.iter(|| implicit::correlation_matrix(black_box(&dataset), &inputs, &protected, None))
    });
}

fn bench_indirect(c: &mut Criterion) {
    let (dataset, _) = synthetic(10_000, 1);
    let protected = vec!["sex".to_string()];

    c.bench_function("indirect_10k_rows", |b| {
        b.iter(|| indirect::check(black_box(&dataset), &protected, "approved", &[], 0.8, 0.05))
    });
}

fn bench_full_audit(c: &mut Criterion) {
    let (dataset, inputs) = synthetic(2_000, 5);
    let roles = ColumnRoles::new(inputs, ["sex"], "approved");
    let exceptions = ExceptionRegistry::new();
    let thresholds = Thresholds::default();

    c.bench_function("full_audit_5_inputs", |b| {
        b.iter(|| normative_core::run(black_box(&dataset), &roles, &exceptions, &thresholds))
    });
}

criterion_group!(
    benches,
    bench_stats,
    bench_implicit,
    bench_indirect,
    bench_full_audit,
);
criterion_main!(benches);
