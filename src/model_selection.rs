//! Resampling-based error estimation for regression models.
//!
//! Both harnesses repeatedly refit the model on one subset of rows and
//! score its predictions on the held-out rows, so they work with any
//! [`Regressor`] whose `fit` fully replaces prior trained state. All
//! shuffling and resampling is driven by an explicit seed; there is no
//! process-wide random state.

use log::debug;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{GBoostError, Result};
use crate::learners::Regressor;

/// Average metric over `k` disjoint held-out folds.
///
/// Rows are shuffled once with a `StdRng` seeded from `seed`, then carved
/// into `k` folds of `n / k` rows each (any remainder stays in every
/// training set). For each fold the model is refitted on the complement
/// and `metric(actual, predicted)` is evaluated on the fold; the mean over
/// folds is returned.
pub fn k_fold_cross_validation<M, F>(
    model: &mut M,
    x: &Array2<f64>,
    y: &Array1<f64>,
    k: usize,
    seed: u64,
    metric: F,
) -> Result<f64>
where
    M: Regressor,
    F: Fn(&Array1<f64>, &Array1<f64>) -> f64,
{
    let n = y.len();
    if k < 2 || k > n {
        return Err(GBoostError::InvalidInput(format!(
            "k must lie in 2..={} for {} samples, got {}",
            n, n, k
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fold_size = n / k;
    let mut losses = Vec::with_capacity(k);

    for fold in 0..k {
        let test = &indices[fold * fold_size..(fold + 1) * fold_size];
        let train: Vec<usize> = indices[..fold * fold_size]
            .iter()
            .chain(&indices[(fold + 1) * fold_size..])
            .copied()
            .collect();

        model.fit(&x.select(Axis(0), &train), &y.select(Axis(0), &train))?;
        let predicted = model.predict(&x.select(Axis(0), test))?;
        losses.push(metric(&y.select(Axis(0), test), &predicted));
    }

    debug!("k-fold (k={}, seed={}): per-fold losses {:?}", k, seed, losses);
    Ok(losses.iter().sum::<f64>() / losses.len() as f64)
}

/// Average out-of-bag metric over `rounds` bootstrap resamples.
///
/// Each round draws `n` rows with replacement from a `StdRng` seeded from
/// `seed`, refits the model on the draw, and evaluates on the rows the
/// draw missed. Rounds where every row was drawn leave nothing to score
/// and are skipped.
pub fn bootstrap<M, F>(
    model: &mut M,
    x: &Array2<f64>,
    y: &Array1<f64>,
    rounds: usize,
    seed: u64,
    metric: F,
) -> Result<f64>
where
    M: Regressor,
    F: Fn(&Array1<f64>, &Array1<f64>) -> f64,
{
    let n = y.len();
    if n == 0 {
        return Err(GBoostError::InvalidInput(
            "target vector is empty".to_string(),
        ));
    }
    if rounds == 0 {
        return Err(GBoostError::InvalidInput(
            "bootstrap requires at least one round".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut losses = Vec::with_capacity(rounds);

    for _ in 0..rounds {
        let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        let mut in_bag = vec![false; n];
        for &i in &sample {
            in_bag[i] = true;
        }
        let out_of_bag: Vec<usize> = (0..n).filter(|&i| !in_bag[i]).collect();
        if out_of_bag.is_empty() {
            continue;
        }

        model.fit(&x.select(Axis(0), &sample), &y.select(Axis(0), &sample))?;
        let predicted = model.predict(&x.select(Axis(0), &out_of_bag))?;
        losses.push(metric(&y.select(Axis(0), &out_of_bag), &predicted));
    }

    if losses.is_empty() {
        return Err(GBoostError::InvalidInput(
            "no bootstrap round produced out-of-bag rows".to_string(),
        ));
    }

    debug!(
        "bootstrap (rounds={}, seed={}): {} scored rounds",
        rounds,
        seed,
        losses.len()
    );
    Ok(losses.iter().sum::<f64>() / losses.len() as f64)
}
