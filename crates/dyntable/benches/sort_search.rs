use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use dyntable::{ColumnType, Position, SortKey, Table};

fn bench_rows() -> usize {
    std::env::var("DYNTABLE_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (1_000..=1_000_000).contains(&v))
        .unwrap_or(50_000)
}

fn build_table(rows: usize) -> Table {
    let mut table = Table::new();
    let group = table.add_column("group", ColumnType::Int).unwrap();
    let name = table.add_column("name", ColumnType::String).unwrap();
    let score = table.add_column("score", ColumnType::Double).unwrap();
    // Deterministic scramble so the sort has real work to do.
    let mut state = 0x2545_f491_u64;
    for _ in 0..rows {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let row = table.add_row().unwrap();
        table.set_int(row, group, (state % 64) as i32).unwrap();
        table
            .set_string(row, name, format!("n{:04}", (state >> 8) % 5_000))
            .unwrap();
        table
            .set_double(row, score, ((state >> 20) % 10_000) as f64 / 100.0)
            .unwrap();
    }
    table
}

fn bench_sort_search(c: &mut Criterion) {
    let rows = bench_rows();
    let table = build_table(rows);
    let keys = [
        SortKey::ascending(0),
        SortKey::ascending(1),
        SortKey::descending(2),
    ];

    let mut group = c.benchmark_group("sort_search");
    group.sample_size(10);
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("sort_three_keys", rows), &rows, |b, _| {
        b.iter_batched(
            || table.duplicate(),
            |mut t| {
                t.sort(&keys).unwrap();
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });

    let mut sorted = table.duplicate();
    sorted.sort(&keys).unwrap();
    group.bench_with_input(BenchmarkId::new("sorted_find", rows), &rows, |b, _| {
        b.iter(|| {
            for g in 0..64 {
                black_box(sorted.sorted_find_int(0, g, Position::First).unwrap());
                black_box(sorted.sorted_find_int(0, g, Position::Last).unwrap());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sort_search);
criterion_main!(benches);
