use approx::assert_relative_eq;
use ml4scm_rs::bayes::{bayes_resample, BayesConfig, BayesResampler, ResamplerState};
use ml4scm_rs::estimators::likelihood;
use ml4scm_rs::simulation::FnSimulator;
use ml4scm_rs::{Ml4ScmError, Result};
use ndarray::{Array1, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::{array_approx_eq, linear_measurements, linear_problem, linear_simulator};

#[test]
fn test_history_shapes() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let history = bayes_resample(
        &linear_simulator(),
        &problem,
        linear_measurements(1.0, 0.5),
        BayesConfig::new(5, 30),
        &mut rng,
    )
    .unwrap();

    assert_eq!(history.len(), 5);
    assert_eq!(history.parameters().unwrap().dim(), (5, 30, 2));
    assert_eq!(history.concentrations().unwrap().dim(), (5, 30, 4));
    assert_eq!(history.weights().unwrap().dim(), (5, 30));
}

#[test]
fn test_same_seed_same_history() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let run = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        bayes_resample(
            &linear_simulator(),
            &problem,
            linear_measurements(1.0, 0.5),
            BayesConfig::new(4, 20),
            &mut rng,
        )
        .unwrap()
    };

    assert_eq!(run(7), run(7));
    assert_ne!(
        run(7).parameters().unwrap(),
        run(8).parameters().unwrap()
    );
}

#[test]
fn test_members_stay_in_bounds_and_in_the_first_generation() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let history = bayes_resample(
        &linear_simulator(),
        &problem,
        linear_measurements(1.2, 0.3),
        BayesConfig::new(6, 40).with_pool_size(25),
        &mut rng,
    )
    .unwrap();

    let first = history.first().unwrap();
    for generation in history.generations() {
        assert_relative_eq!(generation.weights.sum(), 1.0, epsilon = 1e-9);
        for row in generation.parameters.rows() {
            for (v, bound) in row.iter().zip(problem.bounds()) {
                assert!(bound.contains(*v));
            }
            assert!(first.parameters.rows().into_iter().any(|r| r == row));
        }
    }
}

#[test]
fn test_ensemble_moves_towards_the_truth() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let measured = linear_measurements(1.0, 0.5);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let history = bayes_resample(
        &linear_simulator(),
        &problem,
        measured.clone(),
        BayesConfig::new(6, 100),
        &mut rng,
    )
    .unwrap();

    let mean_score = |concentrations: &ndarray::Array2<f64>| {
        concentrations
            .rows()
            .into_iter()
            .map(|row| likelihood(row, measured.view()).unwrap())
            .sum::<f64>()
            / concentrations.nrows() as f64
    };
    let first = mean_score(&history.first().unwrap().concentrations);
    let last = mean_score(&history.last().unwrap().concentrations);
    assert!(last > first, "mean likelihood {} -> {}", first, last);
}

#[test]
fn test_weights_follow_likelihood_within_a_generation() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let measured = linear_measurements(1.0, 0.5);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let history = bayes_resample(
        &linear_simulator(),
        &problem,
        measured.clone(),
        BayesConfig::new(1, 10),
        &mut rng,
    )
    .unwrap();

    let generation = history.first().unwrap();
    let scores: Array1<f64> = generation
        .concentrations
        .rows()
        .into_iter()
        .map(|row| likelihood(row, measured.view()).unwrap())
        .collect();
    let expected = &scores / scores.sum();
    assert!(array_approx_eq(&generation.weights, &expected, 1e-12));
}

#[test]
fn test_simulator_failure_stops_the_run() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let sim = FnSimulator::new(|_: ArrayView1<f64>, _: &[String]| -> Result<Array1<f64>> {
        Err(Ml4ScmError::SimulatorFailed {
            status: "exit status: 1".to_string(),
            stderr: "ERROR: unknown species".to_string(),
        })
    });
    let mut resampler = BayesResampler::new(
        &sim,
        &problem,
        linear_measurements(1.0, 0.5),
        BayesConfig::new(3, 5),
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert!(matches!(
        resampler.step(&mut rng),
        Err(Ml4ScmError::SimulatorFailed { .. })
    ));
    assert_eq!(resampler.state(), ResamplerState::Init);
    assert!(resampler.history().is_empty());
}

#[test]
fn test_empty_measurements_rejected() {
    let problem = linear_problem((0.5, 1.5), (0.0, 1.0));
    let sim = linear_simulator();
    let result = BayesResampler::new(&sim, &problem, Array1::zeros(0), BayesConfig::default());
    assert!(matches!(result, Err(Ml4ScmError::InvalidInput(_))));
}
