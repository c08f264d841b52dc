//! End-to-end behavior of the boosting ensemble.

use gboost_rs::evaluation::mean_squared_error;
use gboost_rs::{GBoostError, GradientBoostingTree, Loss};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The reference scenario: a 100×7 uniform matrix, a noisy linear target
/// normalized by its standard deviation.
fn reference_data() -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(42);
    let x = Array2::random_using((100, 7), Uniform::new(0.0, 1.0), &mut rng);
    let coefficients = Array1::random_using(7, Uniform::new(0.0, 1.0), &mut rng);
    let noise = Array1::random_using(100, Normal::new(0.0, 0.1).unwrap(), &mut rng);

    let y = x.dot(&coefficients) + &noise;
    let sd = y.std(0.0);
    (x, y.mapv(|v| v / sd))
}

#[test]
fn test_reference_scenario_beats_constant_mean() {
    let (x, y) = reference_data();

    let mut model = GradientBoostingTree::with_options(50, 0.1, 3, Loss::SquaredError);
    model.fit(&x, &y).unwrap();

    let predictions = model.predict(&x).unwrap();
    let training_mse = mean_squared_error(&y, &predictions);

    let y_mean = y.sum() / y.len() as f64;
    let baseline = Array1::from_elem(y.len(), y_mean);
    let baseline_mse = mean_squared_error(&y, &baseline);

    println!("training MSE {:.6} vs constant-mean MSE {:.6}", training_mse, baseline_mse);
    assert!(training_mse < baseline_mse);
}

#[test]
fn test_reference_scenario_improves_over_first_ten_rounds() {
    let (x, y) = reference_data();

    let mut model = GradientBoostingTree::with_options(50, 0.1, 3, Loss::SquaredError);
    model.fit(&x, &y).unwrap();

    let staged_mse: Vec<f64> = model
        .staged_predict(&x)
        .unwrap()
        .map(|predictions| mean_squared_error(&y, &predictions))
        .collect();
    assert_eq!(staged_mse.len(), 50);

    for round in 0..10 {
        assert!(
            staged_mse[round + 1] < staged_mse[round],
            "training MSE rose from {:.6} to {:.6} at round {}",
            staged_mse[round],
            staged_mse[round + 1],
            round + 1
        );
    }
}

#[test]
fn test_staged_predict_ends_at_full_prediction() {
    let (x, y) = reference_data();

    let mut model = GradientBoostingTree::new(20, 0.1);
    model.fit(&x, &y).unwrap();

    let last = model.staged_predict(&x).unwrap().last().unwrap();
    assert_eq!(last.to_vec(), model.predict(&x).unwrap().to_vec());
}

#[test]
fn test_noiseless_linear_target_never_regresses() {
    // Noiseless single-feature ramp: with a small learning rate each
    // round's gamma step can only shrink the training error.
    let n = 40;
    let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
    let y = Array1::from_shape_fn(n, |i| i as f64);

    let mut model = GradientBoostingTree::with_options(30, 0.05, 2, Loss::SquaredError);
    model.fit(&x, &y).unwrap();

    let staged_mse: Vec<f64> = model
        .staged_predict(&x)
        .unwrap()
        .map(|predictions| mean_squared_error(&y, &predictions))
        .collect();

    for round in 1..staged_mse.len() {
        assert!(staged_mse[round] <= staged_mse[round - 1] + 1e-12);
    }
}

#[test]
fn test_fit_is_bit_identical_across_runs() {
    let (x, y) = reference_data();

    let mut first = GradientBoostingTree::with_options(25, 0.1, 3, Loss::SquaredError);
    first.fit(&x, &y).unwrap();
    let mut second = GradientBoostingTree::with_options(25, 0.1, 3, Loss::SquaredError);
    second.fit(&x, &y).unwrap();

    assert_eq!(
        first.predict(&x).unwrap().to_vec(),
        second.predict(&x).unwrap().to_vec()
    );
}

#[test]
fn test_predict_is_idempotent() {
    let (x, y) = reference_data();

    let mut model = GradientBoostingTree::new(15, 0.1);
    model.fit(&x, &y).unwrap();

    let first = model.predict(&x).unwrap();
    let second = model.predict(&x).unwrap();
    assert_eq!(first.to_vec(), second.to_vec());
}

#[test]
fn test_refit_fully_replaces_trained_state() {
    let (x1, y1) = reference_data();
    let mut rng = StdRng::seed_from_u64(7);
    let x2 = Array2::random_using((60, 7), Uniform::new(0.0, 1.0), &mut rng);
    let y2 = x2.column(0).to_owned() * 3.0;

    let mut refitted = GradientBoostingTree::with_options(20, 0.1, 3, Loss::SquaredError);
    refitted.fit(&x1, &y1).unwrap();
    refitted.fit(&x2, &y2).unwrap();

    let mut fresh = GradientBoostingTree::with_options(20, 0.1, 3, Loss::SquaredError);
    fresh.fit(&x2, &y2).unwrap();

    assert_eq!(refitted.trees().len(), 20);
    assert_eq!(
        refitted.predict(&x2).unwrap().to_vec(),
        fresh.predict(&x2).unwrap().to_vec()
    );
}

#[test]
fn test_predict_handles_new_rows() {
    let (x, y) = reference_data();

    let mut model = GradientBoostingTree::new(10, 0.1);
    model.fit(&x, &y).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    let fresh = Array2::random_using((17, 7), Uniform::new(0.0, 1.0), &mut rng);
    assert_eq!(model.predict(&fresh).unwrap().len(), 17);
}

#[test]
fn test_loss_selector_failures_surface_before_training() {
    assert!("squared_error".parse::<Loss>().is_ok());
    assert!(matches!(
        "huber".parse::<Loss>(),
        Err(GBoostError::UnsupportedLoss(_))
    ));
}

#[test]
fn test_invalid_shapes_are_rejected() {
    let x = Array2::<f64>::zeros((5, 2));
    let y = Array1::<f64>::zeros(4);

    let mut model = GradientBoostingTree::new(5, 0.1);
    assert!(matches!(
        model.fit(&x, &y),
        Err(GBoostError::InvalidInput(_))
    ));

    let empty_x = Array2::<f64>::zeros((0, 2));
    let empty_y = Array1::<f64>::zeros(0);
    assert!(matches!(
        model.fit(&empty_x, &empty_y),
        Err(GBoostError::InvalidInput(_))
    ));
}
