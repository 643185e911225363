use polopt_api::builders::polopt::ParallelBatchPoloptBuilder;
use polopt_api::test_utils::{CountingBaseline, FixedPolicy, RecordingLogger, RecordingOptimizer, ScriptedSampler};
use polopt_core::polopt::Worker;

#[test]
fn defaults_mirror_the_serial_algorithm() {
    let builder = ParallelBatchPoloptBuilder::new();
    let config = &builder.config;
    assert_eq!(config.n_itr, 500);
    assert_eq!(config.start_itr, 0);
    assert_eq!(config.batch_size, 5000);
    assert_eq!(config.max_path_length, 500);
    assert_eq!(config.discount, 0.99);
    assert_eq!(config.gae_lambda, 1.0);
    assert!(config.center_adv);
    assert!(!config.positive_adv);
    assert!(!config.whole_paths);
    assert_eq!(config.n_parallel, 1);
    assert_eq!(config.seed, 1);
}

#[test]
fn worker_batch_size_splits_the_batch_evenly() {
    let mut builder = ParallelBatchPoloptBuilder::new();
    builder.set_n_parallel(4);
    assert_eq!(builder.config.worker_batch_size(), 1250);
}

#[test]
fn build_rejects_a_worker_count_mismatch() {
    let mut builder = ParallelBatchPoloptBuilder::new();
    builder.set_n_parallel(2);
    let workers = vec![Worker {
        sampler: ScriptedSampler::new(vec![vec![vec![1.0]]]),
        policy: FixedPolicy::new(false),
        baseline: CountingBaseline::default(),
        optimizer: RecordingOptimizer::default(),
    }];
    let (logger, _rx) = RecordingLogger::new();
    assert!(builder.build(workers, logger).is_err());
}
