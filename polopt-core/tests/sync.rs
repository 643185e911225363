use polopt_core::diagnostics::BatchStats;
use polopt_core::rng;
use polopt_core::sync::{ParObjects, Reducer, WorkerContext};
use rand::Rng;
use std::thread;

#[test]
fn reduce_sums_every_worker_exactly_once() {
    let n_workers = 4;
    let reducer = Reducer::new(n_workers, 0u64);
    let totals: Vec<u64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..n_workers)
            .map(|rank| {
                let reducer = &reducer;
                scope.spawn(move || {
                    let ctx = WorkerContext::new(rank, n_workers);
                    reducer.reduce(&ctx, (rank as u64 + 1) * 10, |acc, n| *acc += n)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    // 10 + 20 + 30 + 40, and every worker reads the same final value.
    assert!(totals.iter().all(|t| *t == 100));
}

#[test]
fn reduce_barriers_are_cyclic() {
    let n_workers = 3;
    let reducer = Reducer::new(n_workers, 0u64);
    let per_worker: Vec<Vec<u64>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..n_workers)
            .map(|rank| {
                let reducer = &reducer;
                scope.spawn(move || {
                    let ctx = WorkerContext::new(rank, n_workers);
                    (0..5u64)
                        .map(|round| {
                            reducer.reduce(&ctx, rank as u64 + round, |acc, n| *acc += n)
                        })
                        .collect::<Vec<u64>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for round in 0..5u64 {
        // ranks 0+1+2 plus three copies of the round index, leader value
        // overwritten fresh each round rather than accumulated.
        let expected = 3 + 3 * round;
        for worker in &per_worker {
            assert_eq!(worker[round as usize], expected);
        }
    }
}

#[test]
fn back_to_back_rounds_never_bleed_into_each_other() {
    // No synchronization between rounds besides the reducer itself: a
    // lagging reader must never observe the next round's overwrite.
    let n_workers = 4;
    let rounds = 10_000u64;
    let reducer = Reducer::new(n_workers, 0u64);
    thread::scope(|scope| {
        for rank in 0..n_workers {
            let reducer = &reducer;
            scope.spawn(move || {
                let ctx = WorkerContext::new(rank, n_workers);
                for round in 0..rounds {
                    let got = reducer.reduce(&ctx, rank as u64 + round, |acc, n| *acc += n);
                    // ranks 0+1+2+3 plus four copies of the round index
                    assert_eq!(got, 6 + 4 * round, "rank {rank}, round {round}");
                }
            });
        }
    });
}

#[test]
fn share_step_count_factors_sum_to_one() {
    let n_workers = 4;
    let steps = [700u64, 100, 1, 3200];
    let par = ParObjects::new(n_workers);
    let factors: Vec<f64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..n_workers)
            .map(|rank| {
                let par = &par;
                scope.spawn(move || {
                    let ctx = WorkerContext::new(rank, n_workers);
                    par.share_step_count(&ctx, steps[rank])
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let total: u64 = steps.iter().sum();
    for (rank, factor) in factors.iter().enumerate() {
        assert!((factor - steps[rank] as f64 / total as f64).abs() < 1e-12);
    }
    assert!((factors.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn single_worker_reduce_is_its_own_value() {
    let reducer = Reducer::new(1, 0u64);
    let ctx = WorkerContext::new(0, 1);
    assert_eq!(reducer.reduce(&ctx, 42, |acc, n| *acc += n), 42);
}

#[test]
fn batch_stats_merge_tracks_extremes_regardless_of_order() {
    let mut a = BatchStats {
        sum_return: 3.0,
        num_traj: 2,
        max_return: 2.0,
        min_return: 1.0,
        num_steps: 7,
        ..BatchStats::default()
    };
    let b = BatchStats {
        sum_return: 3.0,
        num_traj: 1,
        max_return: 3.0,
        min_return: 3.0,
        num_steps: 4,
        ..BatchStats::default()
    };
    let mut c = b.clone();
    a.merge(b);
    assert_eq!(a.num_traj, 3);
    assert_eq!(a.sum_return, 6.0);
    assert_eq!(a.max_return, 3.0);
    assert_eq!(a.min_return, 1.0);
    assert_eq!(a.num_steps, 11);

    // opposite arrival order
    c.merge(BatchStats {
        sum_return: 3.0,
        num_traj: 2,
        max_return: 2.0,
        min_return: 1.0,
        num_steps: 7,
        ..BatchStats::default()
    });
    assert_eq!(c.max_return, 3.0);
    assert_eq!(c.min_return, 1.0);
}

#[test]
fn merging_into_identity_is_lossless() {
    let mut identity = BatchStats::default();
    let stats = BatchStats {
        sum_discounted_return: 1.5,
        sum_return: 2.0,
        num_traj: 1,
        max_return: 2.0,
        min_return: 2.0,
        num_steps: 3,
        num_valids: 3.0,
        sum_entropy: 0.9,
    };
    identity.merge(stats.clone());
    assert_eq!(identity.max_return, stats.max_return);
    assert_eq!(identity.min_return, stats.min_return);
    assert_eq!(identity.sum_return, stats.sum_return);
}

#[test]
fn seeded_rng_is_reproducible_per_thread() {
    rng::set_seed(7);
    let first: Vec<u32> = (0..4).map(|_| rng::with_rng(|r| r.random())).collect();
    rng::set_seed(7);
    let second: Vec<u32> = (0..4).map(|_| rng::with_rng(|r| r.random())).collect();
    rng::set_seed(8);
    let third: Vec<u32> = (0..4).map(|_| rng::with_rng(|r| r.random())).collect();
    assert_eq!(first, second);
    assert_ne!(first, third);
}
