use polopt_core::distributions::categorical::CategoricalDistribution;
use polopt_core::distributions::diag_gaussian::DiagGaussianDistribution;
use polopt_core::distributions::{Distribution, DistributionKind};
use polopt_core::path::AgentInfo;
use std::f64::consts::PI;

#[test]
fn uniform_categorical_entropy_is_log_k() {
    let dist = CategoricalDistribution;
    let infos = vec![
        AgentInfo::Categorical {
            probs: vec![0.5, 0.5],
        },
        AgentInfo::Categorical {
            probs: vec![0.25; 4],
        },
    ];
    let entropy = dist.entropy(&infos).unwrap();
    assert!((entropy[0] - 2f64.ln()).abs() < 1e-12);
    assert!((entropy[1] - 4f64.ln()).abs() < 1e-12);
}

#[test]
fn degenerate_categorical_entropy_is_zero() {
    let dist = CategoricalDistribution;
    let entropy = dist.entropy(&[AgentInfo::Categorical {
        probs: vec![1.0, 0.0, 0.0],
    }]);
    assert_eq!(entropy.unwrap(), vec![0.0]);
}

#[test]
fn gaussian_entropy_depends_only_on_log_std() {
    let dist = DiagGaussianDistribution;
    let entropy = dist.entropy(&[AgentInfo::DiagGaussian {
        mean: vec![3.0, -1.0],
        log_std: vec![0.0, 0.0],
    }])
    .unwrap();
    let expected = 2.0 * 0.5 * (1.0 + (2.0 * PI).ln());
    assert!((entropy[0] - expected).abs() < 1e-12);
}

#[test]
fn enum_dispatch_routes_to_the_right_distribution() {
    let kind = DistributionKind::Categorical(CategoricalDistribution);
    let entropy = kind
        .entropy(&[AgentInfo::Categorical {
            probs: vec![0.5, 0.5],
        }])
        .unwrap();
    assert!((entropy[0] - 2f64.ln()).abs() < 1e-12);
}

#[test]
fn mismatched_agent_info_is_an_error() {
    let categorical = CategoricalDistribution;
    assert!(
        categorical
            .entropy(&[AgentInfo::DiagGaussian {
                mean: vec![0.0],
                log_std: vec![0.0],
            }])
            .is_err()
    );
    let gaussian = DiagGaussianDistribution;
    assert!(
        gaussian
            .entropy(&[AgentInfo::Categorical { probs: vec![1.0] }])
            .is_err()
    );
}
