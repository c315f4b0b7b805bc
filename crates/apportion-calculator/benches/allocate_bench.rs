use apportion_calculator::{ContractRecord, FixedIncome, Session, allocate};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn generate_contracts(count: usize, salespeople: usize) -> Vec<ContractRecord> {
    (0..count)
        .map(|i| {
            ContractRecord::new(
                format!("seller_{}", i % salespeople),
                format!("C-{i}"),
                (i % 97) as f64 * 125.5 + 10.0,
            )
        })
        .collect()
}

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");
    let fixed = FixedIncome::new(3500.0, 450.0);

    for size in [100, 10_000, 100_000].iter() {
        let contracts = generate_contracts(*size, 1);
        group.bench_with_input(BenchmarkId::new("single_salesperson", size), size, |b, _| {
            b.iter(|| black_box(allocate(&contracts, &fixed)))
        });
    }
    group.finish();
}

fn bench_session_report(c: &mut Criterion) {
    let mut session = Session::new();
    session.load_contracts(generate_contracts(50_000, 25), 0);
    c.bench_function("session_report", |b| b.iter(|| black_box(session.report("seller_7"))));
}

criterion_group!(benches, bench_allocate, bench_session_report);
criterion_main!(benches);
