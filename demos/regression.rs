//! Basic regression example for the gradient boosting ensemble.
//!
//! This example demonstrates:
//! - Creating synthetic regression data
//! - Training a GradientBoostingTree and evaluating train/test error
//! - Estimating generalization error with seeded k-fold cross-validation

use gboost_rs::evaluation::{mean_squared_error, root_mean_squared_error};
use gboost_rs::model_selection::k_fold_cross_validation;
use gboost_rs::{GradientBoostingTree, Loss};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn main() {
    env_logger::init();

    println!("Gradient Boosting Regression Example");
    println!("====================================\n");

    // Generate synthetic data
    let n_train = 500;
    let n_test = 100;
    let n_features = 5;

    // True coefficients
    let true_coef = Array1::from(vec![1.5, -2.3, 0.4, 3.1, -1.1]);

    // Training data
    let x_train = Array2::random((n_train, n_features), Uniform::new(0., 1.));
    let noise_train = Array1::random(n_train, Uniform::new(-0.5, 0.5));
    let y_train = x_train.dot(&true_coef) + &noise_train;

    // Test data
    let x_test = Array2::random((n_test, n_features), Uniform::new(0., 1.));
    let noise_test = Array1::random(n_test, Uniform::new(-0.5, 0.5));
    let y_test = x_test.dot(&true_coef) + &noise_test;

    println!("Training samples: {}", n_train);
    println!("Test samples: {}", n_test);
    println!("Features: {}", n_features);
    println!();

    // Create and train the model
    let n_estimators = 100;
    let learning_rate = 0.1;

    println!("Training with {} estimators...", n_estimators);

    let mut model = GradientBoostingTree::with_options(
        n_estimators,
        learning_rate,
        3,
        Loss::SquaredError,
    );
    model.fit(&x_train, &y_train).expect("Failed to fit model");

    println!("Training complete!\n");

    // Make predictions
    let y_pred_train = model.predict(&x_train).expect("Failed to predict");
    let y_pred_test = model.predict(&x_test).expect("Failed to predict");

    println!("Results:");
    println!("--------");
    println!(
        "Training RMSE: {:.4}",
        root_mean_squared_error(&y_train, &y_pred_train)
    );
    println!(
        "Test RMSE:     {:.4}",
        root_mean_squared_error(&y_test, &y_pred_test)
    );
    println!();

    // Seeded 5-fold cross-validation on the training set
    let mut cv_model =
        GradientBoostingTree::with_options(n_estimators, learning_rate, 3, Loss::SquaredError);
    let cv_mse = k_fold_cross_validation(
        &mut cv_model,
        &x_train,
        &y_train,
        5,
        42,
        mean_squared_error,
    )
    .expect("Cross-validation failed");
    println!("5-fold CV MSE (seed 42): {:.4}", cv_mse);
    println!();

    println!("Predictions (first 5 test samples):");
    println!("{:<10} {:<10}", "y_true", "y_pred");
    for i in 0..5 {
        println!("{:<10.4} {:<10.4}", y_test[i], y_pred_test[i]);
    }
}
