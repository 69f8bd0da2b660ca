use kira_powersim::design::{DatasetAssembler, Observation, SimulatedDataset};
use kira_powersim::model::{
    BalancedReml, FitFailure, InteractionTest, MixedModelFitter, ModelSpec, Term,
};
use kira_powersim::sampler::OutcomeSupport;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Two groups, two time points; `subjects[g]` holds (t1, t2) per subject.
fn dataset_2x2(subjects: [&[(i32, i32)]; 2]) -> SimulatedDataset {
    let groups = labels(&["control", "treatment"]);
    let mut observations = Vec::new();
    for (g, rows) in subjects.iter().enumerate() {
        for (i, (pre, post)) in rows.iter().enumerate() {
            let id = format!("{}_{}", groups[g], i + 1);
            for (time, value) in [(1, *pre), (2, *post)] {
                observations.push(Observation {
                    subject_id: id.clone(),
                    group: g,
                    time,
                    value,
                });
            }
        }
    }
    SimulatedDataset::new(groups, 2, observations)
}

fn reference_data() -> SimulatedDataset {
    dataset_2x2([
        &[(10, 12), (12, 13), (14, 17)],
        &[(10, 16), (13, 18), (15, 23)],
    ])
}

#[test]
fn treatment_coded_estimates() {
    let fit = BalancedReml::new()
        .fit(&reference_data(), &ModelSpec::group_by_time())
        .unwrap();
    assert!(!fit.singular);
    assert_eq!(fit.n_subjects, 6);
    assert_eq!(fit.n_obs, 12);
    assert_eq!(fit.terms.len(), 4);

    let intercept = fit.term(Term::Intercept).unwrap();
    assert!((intercept.estimate - 12.0).abs() < 1e-9);
    let time = fit.term(Term::Time { level: 1 }).unwrap();
    assert!((time.estimate - 2.0).abs() < 1e-9);
    let group = fit.term(Term::Group { level: 1 }).unwrap();
    assert!((group.estimate - 2.0 / 3.0).abs() < 1e-9);
    let interaction = fit.term(Term::Interaction { group: 1, time: 1 }).unwrap();
    assert!((interaction.estimate - 13.0 / 3.0).abs() < 1e-9);
}

#[test]
fn variance_components_and_tests() {
    let fit = BalancedReml::new()
        .fit(&reference_data(), &ModelSpec::group_by_time())
        .unwrap();
    assert!((fit.residual_variance - 5.0 / 6.0).abs() < 1e-9);
    assert!((fit.subject_variance - 6.75).abs() < 1e-9);

    let interaction = fit.term(Term::Interaction { group: 1, time: 1 }).unwrap();
    assert!((interaction.std_error - (10.0f64 / 9.0).sqrt()).abs() < 1e-9);
    assert!((interaction.df - 4.0).abs() < 1e-9);
    assert!((interaction.p_value - 0.01472).abs() < 1e-3);

    // Group contrast mixes both strata.
    let group = fit.term(Term::Group { level: 1 }).unwrap();
    assert!((group.std_error * group.std_error - 91.0 / 18.0).abs() < 1e-9);
    assert!((group.df - 4.463549386875).abs() < 1e-9);
}

#[test]
fn omnibus_matches_coefficient_in_2x2() {
    let fit = BalancedReml::new()
        .fit(&reference_data(), &ModelSpec::group_by_time())
        .unwrap();
    let coef = InteractionTest::Coefficient { group: 1, time: 1 }
        .select(&fit)
        .unwrap();
    let omnibus = InteractionTest::Omnibus.select(&fit).unwrap();
    assert!((omnibus.statistic - coef.statistic * coef.statistic).abs() < 1e-9);
    assert!((omnibus.p_value - coef.p_value).abs() < 1e-9);
    assert_eq!(omnibus.estimate, None);
    assert!((coef.estimate.unwrap() - 13.0 / 3.0).abs() < 1e-9);
}

#[test]
fn boundary_fit_pools_variance() {
    let data = dataset_2x2([
        &[(10, 14), (14, 10), (12, 12)],
        &[(20, 24), (24, 20), (22, 22)],
    ]);
    let fit = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap();
    assert!(fit.singular);
    assert_eq!(fit.subject_variance, 0.0);
    assert!((fit.residual_variance - 4.0).abs() < 1e-9);
    let interaction = fit.term(Term::Interaction { group: 1, time: 1 }).unwrap();
    assert!(interaction.estimate.abs() < 1e-9);
    assert!((interaction.df - 8.0).abs() < 1e-9);
    assert!((interaction.p_value - 1.0).abs() < 1e-9);
}

#[test]
fn constant_outcome_is_singular() {
    let data = dataset_2x2([&[(5, 5), (5, 5)], &[(5, 5), (5, 5)]]);
    let err = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap_err();
    assert!(matches!(err, FitFailure::Singular(_)));
}

#[test]
fn missing_measure_is_unbalanced() {
    let data = reference_data();
    let mut observations = data.observations().to_vec();
    observations.pop();
    let data = SimulatedDataset::new(data.groups().to_vec(), 2, observations);
    let err = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap_err();
    assert!(matches!(err, FitFailure::Unbalanced(_)));
}

#[test]
fn unequal_groups_are_unbalanced() {
    let data = dataset_2x2([&[(10, 12), (12, 13), (14, 17)], &[(10, 16), (13, 18)]]);
    let err = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap_err();
    assert!(matches!(err, FitFailure::Unbalanced(_)));
}

#[test]
fn single_subject_per_group_not_estimable() {
    let data = dataset_2x2([&[(10, 12)], &[(10, 16)]]);
    let err = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap_err();
    assert!(matches!(err, FitFailure::NotEstimable(_)));
}

#[test]
fn other_models_unsupported() {
    let mut spec = ModelSpec::group_by_time();
    spec.random_intercept = "site".to_string();
    let err = BalancedReml::new().fit(&reference_data(), &spec).unwrap_err();
    assert!(matches!(err, FitFailure::UnsupportedModel(_)));
}

#[test]
fn reference_level_has_no_interaction_term() {
    let fit = BalancedReml::new()
        .fit(&reference_data(), &ModelSpec::group_by_time())
        .unwrap();
    assert!(fit.term(Term::Interaction { group: 0, time: 1 }).is_none());
    let err = InteractionTest::Coefficient { group: 0, time: 1 }
        .select(&fit)
        .unwrap_err();
    assert!(matches!(err, FitFailure::NotEstimable(_)));
}

#[test]
fn three_by_three_design() {
    let groups = labels(&["a", "b", "c"]);
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let assembler = DatasetAssembler::new(&groups, 3, &[50.0; 9], &[10.0; 9], &support).unwrap();
    let data = assembler
        .assemble(20, &mut ChaCha8Rng::seed_from_u64(8))
        .unwrap();
    let fit = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap();
    assert_eq!(fit.terms.len(), 9);
    assert_eq!(fit.interaction.numer_df, 4.0);
    assert!(fit.interaction.p_value >= 0.0 && fit.interaction.p_value <= 1.0);
    for g in 1..3 {
        for t in 1..3 {
            assert!(fit.term(Term::Interaction { group: g, time: t }).is_some());
        }
    }
}

#[test]
fn large_interaction_detected() {
    let groups = labels(&["control", "treatment"]);
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let assembler = DatasetAssembler::new(
        &groups,
        2,
        &[50.0, 50.0, 50.0, 20.0],
        &[5.0; 4],
        &support,
    )
    .unwrap();
    let data = assembler
        .assemble(50, &mut ChaCha8Rng::seed_from_u64(9))
        .unwrap();
    let fit = BalancedReml::new()
        .fit(&data, &ModelSpec::group_by_time())
        .unwrap();
    let result = InteractionTest::last_cell(2, 2).select(&fit).unwrap();
    assert!(result.p_value < 1e-6);
    assert!((result.estimate.unwrap() + 30.0).abs() < 5.0);
}
