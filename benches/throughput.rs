use std::thread;
use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use rulecheck::{RuleEngine, RuleSet};

/// An engine with a 20-guard root set cascading into a reporting child.
fn build_engine() -> RuleEngine {
    let mut engine = RuleEngine::with_builtins().unwrap();
    engine.set_variable("tier", "gold");

    let mut root = RuleSet::new();
    for i in 0..20 {
        root.push(
            engine
                .parse(&format!("match --value$ {{tier}} --pattern '^gold$|t{i}'"))
                .unwrap(),
        );
    }
    engine.insert_ruleset(".", root.child("report"));
    engine.insert_ruleset(
        "report",
        RuleSet::new().with(
            engine
                .parse("problem --key tiers --message$ 'tier {tier}' --path config")
                .unwrap(),
        ),
    );
    engine
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let mut engine = build_engine();
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = engine.test_default(&());
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
