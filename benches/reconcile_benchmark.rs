use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wellness_tracker::models::{completion_points, Difficulty, GoalCategory, Recommendation};

fn make_batch(n: usize, completed: bool) -> Vec<Recommendation> {
    (0..n)
        .map(|i| Recommendation {
            id: format!("rec-{}", i),
            user_id: "bench-user".to_string(),
            goal: format!("Goal {}", i),
            category: GoalCategory::Exercise,
            difficulty: match i % 3 {
                0 => Difficulty::Easy,
                1 => Difficulty::Medium,
                _ => Difficulty::Hard,
            },
            is_completed: completed,
        })
        .collect()
}

fn benchmark_completion_points(c: &mut Criterion) {
    // Real batches hold five goals; the large sizes probe the quadratic
    // id-matching scan.
    let mut group = c.benchmark_group("save_changes_reconciliation");

    for &size in &[5usize, 100, 1000] {
        let persisted = make_batch(size, false);
        let edited = make_batch(size, true);

        group.bench_function(format!("all_transitions_{}", size), |b| {
            b.iter(|| completion_points(black_box(&persisted), black_box(&edited)))
        });

        let unchanged = make_batch(size, false);
        group.bench_function(format!("no_transitions_{}", size), |b| {
            b.iter(|| completion_points(black_box(&persisted), black_box(&unchanged)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_completion_points);
criterion_main!(benches);
