use approx::assert_relative_eq;
use ml4scm_rs::parameters::{get_random_values, init_params, Bound, Problem};
use ml4scm_rs::Ml4ScmError;
use ndarray::arr2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn abc_bounds() -> Vec<Bound> {
    [(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]
        .iter()
        .map(|&(lo, hi)| Bound::new(lo, hi).unwrap())
        .collect()
}

#[test]
fn test_problem_from_json() {
    let problem = Problem::from_json(
        r#"{
            "input_filename": "input.file",
            "output_filename": "output.file",
            "db_template_filename": "db_template.file",
            "bounds": [[1, 2], [3, 4], [5, 6]],
            "names": ["a", "b", "c"],
            "num_vars": 3
        }"#,
    )
    .unwrap();

    assert_eq!(problem.names(), ["a", "b", "c"]);
    assert_eq!(problem.bounds(), abc_bounds().as_slice());
    assert_eq!(problem.num_vars(), 3);
}

#[test]
fn test_problem_new() {
    let problem = Problem::new(
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        abc_bounds(),
        3,
        "input.file",
        "output.file",
        "db_template.file",
    )
    .unwrap();

    assert_eq!(problem.names(), ["a", "b", "c"]);
    assert_eq!(problem.bounds(), abc_bounds().as_slice());
    assert_eq!(problem.num_vars(), 3);
    assert_eq!(problem.lower(), vec![1.0, 3.0, 5.0]);
    assert_eq!(problem.upper(), vec![2.0, 4.0, 6.0]);
}

#[test]
fn test_problem_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("problem.json");
    std::fs::write(
        &path,
        r#"{"names": ["k"], "bounds": [[0.0, 1.0]], "num_vars": 1,
            "input_filename": "in", "output_filename": "out",
            "db_template_filename": "db"}"#,
    )
    .unwrap();

    let problem = Problem::from_json_file(&path).unwrap();
    assert_eq!(problem.num_vars(), 1);
    assert_eq!(problem.db_template_filename(), std::path::Path::new("db"));
}

#[test]
fn test_problem_rejects_inconsistent_descriptions() {
    // num_vars disagrees with the names
    let result = Problem::from_json(
        r#"{"names": ["a", "b"], "bounds": [[0, 1], [0, 1]], "num_vars": 3,
            "input_filename": "i", "output_filename": "o", "db_template_filename": "d"}"#,
    );
    assert!(result.is_err());

    // inverted bound
    let result = Problem::from_json(
        r#"{"names": ["a"], "bounds": [[2, 1]], "num_vars": 1,
            "input_filename": "i", "output_filename": "o", "db_template_filename": "d"}"#,
    );
    assert!(result.is_err());

    // duplicate names
    let result = Problem::new(
        vec!["a".to_string(), "a".to_string()],
        vec![Bound::new(0.0, 1.0).unwrap(), Bound::new(0.0, 1.0).unwrap()],
        2,
        "i",
        "o",
        "d",
    );
    assert!(matches!(result, Err(Ml4ScmError::InvalidProblem(_))));
}

#[test]
fn test_get_random_values_seeded() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let values = get_random_values(&abc_bounds(), 2, &mut rng);

    let expected = arr2(&[
        [1.6818961923066715, 3.9502754076724838, 5.4275164028565195],
        [1.6273605211973403, 3.2885938791411826, 5.149958870290325],
    ]);
    assert_eq!(values.dim(), (2, 3));
    for (v, e) in values.iter().zip(expected.iter()) {
        assert_relative_eq!(*v, *e, epsilon = 1e-12);
    }
}

#[test]
fn test_draws_stay_within_bounds() {
    let bounds = abc_bounds();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let continuous = get_random_values(&bounds, 200, &mut rng);
    let discrete = init_params(200, &bounds, 100, &mut rng).unwrap();

    for values in [continuous, discrete] {
        for row in values.rows() {
            for (v, bound) in row.iter().zip(&bounds) {
                assert!(bound.contains(*v), "{} outside {:?}", v, bound);
            }
        }
    }
}

#[test]
fn test_init_params_uses_the_pool() {
    let bounds = vec![Bound::new(0.0, 1.0).unwrap()];
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let params = init_params(50, &bounds, 5, &mut rng).unwrap();

    let pool = [0.0, 0.25, 0.5, 0.75, 1.0];
    for v in params.iter() {
        assert!(pool.contains(v), "{} is not a pool value", v);
    }
}
