use kira_powersim::SimError;
use kira_powersim::sampler::{DiscreteSampler, NormalDensity, OutcomeSupport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn support_bounds() {
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    assert_eq!(support.len(), 100);
    assert!(support.contains(1));
    assert!(support.contains(100));
    assert!(!support.contains(0));
    assert!(!support.contains(101));
}

#[test]
fn inverted_support_rejected() {
    let err = OutcomeSupport::from_bounds(10, 1).unwrap_err();
    assert!(matches!(err, SimError::InvalidDistribution(_)));
}

#[test]
fn normal_samples_stay_in_support() {
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let density = NormalDensity::new(50.0, 10.0).unwrap();
    let sampler = DiscreteSampler::from_density(&support, &density).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let values = sampler.sample_n(&mut rng, 1000);
    assert_eq!(values.len(), 1000);
    assert!(values.iter().all(|v| support.contains(*v)));
}

#[test]
fn zero_weights_rejected() {
    let support = OutcomeSupport::from_bounds(1, 5).unwrap();
    let err = DiscreteSampler::new(&support, &[0.0; 5]).unwrap_err();
    assert!(matches!(err, SimError::InvalidDistribution(_)));
}

#[test]
fn malformed_weights_rejected() {
    let support = OutcomeSupport::from_bounds(1, 3).unwrap();
    for weights in [
        vec![1.0, -0.5, 1.0],
        vec![1.0, f64::NAN, 1.0],
        vec![1.0, f64::INFINITY, 1.0],
        vec![1.0, 1.0],
    ] {
        let err = DiscreteSampler::new(&support, &weights).unwrap_err();
        assert!(matches!(err, SimError::InvalidDistribution(_)), "{:?}", weights);
    }
}

#[test]
fn unnormalized_point_mass() {
    let support = OutcomeSupport::from_bounds(1, 4).unwrap();
    let sampler = DiscreteSampler::new(&support, &[0.0, 0.0, 7.0, 0.0]).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(sampler.sample_n(&mut rng, 200).iter().all(|v| *v == 3));
}

#[test]
fn closure_density() {
    let support = OutcomeSupport::from_bounds(1, 10).unwrap();
    let low = |x: f64| if x <= 2.0 { 1.0 } else { 0.0 };
    let sampler = DiscreteSampler::from_density(&support, &low).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let values = sampler.sample_n(&mut rng, 500);
    assert!(values.iter().all(|v| *v == 1 || *v == 2));
    assert!(values.contains(&1));
    assert!(values.contains(&2));
}

#[test]
fn underflowing_density_rejected() {
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let density = NormalDensity::new(10_000.0, 1.0).unwrap();
    let err = DiscreteSampler::from_density(&support, &density).unwrap_err();
    assert!(matches!(err, SimError::InvalidDistribution(_)));
}

#[test]
fn reproducible_with_seed() {
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let density = NormalDensity::new(40.0, 15.0).unwrap();
    let sampler = DiscreteSampler::from_density(&support, &density).unwrap();
    let a = sampler.sample_n(&mut ChaCha8Rng::seed_from_u64(99), 64);
    let b = sampler.sample_n(&mut ChaCha8Rng::seed_from_u64(99), 64);
    let c = sampler.sample_n(&mut ChaCha8Rng::seed_from_u64(100), 64);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
