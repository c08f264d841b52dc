//! Gradient boosting ensemble over regression trees.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, trace};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{GBoostError, Result};
use crate::learners::{mean, validate_input, DecisionTreeRegressor, FittedTree, Regressor};
use crate::loss::Loss;

/// Stage-wise additive ensemble of regression trees.
///
/// Each boosting round fits a fresh tree to the pseudo-residuals of the
/// loss, then takes the loss-optimal constant step (gamma) per leaf
/// region, scaled by the learning rate. Rounds are strictly sequential:
/// round k corrects the running prediction left by round k − 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingTree {
    // Hyperparameters, fixed at construction
    pub n_estimators: u32,
    pub learning_rate: f64,
    pub max_depth: usize,
    loss: Loss,

    // State, populated by `fit`
    trees: Vec<FittedTree>,
    init_prediction: Option<f64>,
}

impl GradientBoostingTree {
    /// Squared-error ensemble with the reference depth of 3.
    pub fn new(n_estimators: u32, learning_rate: f64) -> Self {
        Self::with_options(n_estimators, learning_rate, 3, Loss::SquaredError)
    }

    pub fn with_options(
        n_estimators: u32,
        learning_rate: f64,
        max_depth: usize,
        loss: Loss,
    ) -> Self {
        GradientBoostingTree {
            n_estimators,
            learning_rate,
            max_depth,
            loss,
            trees: Vec::new(),
            init_prediction: None,
        }
    }

    /// Trees grown so far, in training order. Order matters: later trees
    /// correct the residuals left by earlier ones.
    pub fn trees(&self) -> &[FittedTree] {
        &self.trees
    }

    /// Global target mean captured by the last `fit`, if any.
    pub fn init_prediction(&self) -> Option<f64> {
        self.init_prediction
    }

    /// The configured training loss.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Trains `n_estimators` trees sequentially, replacing any previously
    /// trained state.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_input(x, y)?;

        self.trees = Vec::with_capacity(self.n_estimators as usize);
        let init = mean(y);
        self.init_prediction = Some(init);

        let n = y.len();
        let mut running = Array1::from_elem(n, init);

        debug!(
            "fitting {} estimators (learning_rate={}, max_depth={}, loss={}) on {}x{} input",
            self.n_estimators,
            self.learning_rate,
            self.max_depth,
            self.loss,
            n,
            x.ncols()
        );

        let builder = DecisionTreeRegressor::new(self.max_depth);
        for round in 0..self.n_estimators {
            let residual = self.loss.gradient(y, &running);
            let tree = builder.fit_tree(x, &residual)?;

            // Rows sharing a leaf form one region; each region takes the
            // loss-optimal constant step, scaled by the learning rate.
            let leaves = tree.apply(x);
            let mut regions: HashMap<usize, Vec<usize>> = HashMap::new();
            for (row, leaf) in leaves.iter().enumerate() {
                regions.entry(*leaf).or_default().push(row);
            }
            for rows in regions.values() {
                let gamma = self.loss.leaf_step(&residual.select(Axis(0), rows));
                for &row in rows {
                    running[row] += self.learning_rate * gamma;
                }
            }

            trace!(
                "round {}: {} leaf regions, residual mse {:.6}",
                round,
                regions.len(),
                residual.mapv(|r| r * r).sum() / n as f64
            );
            self.trees.push(tree);
        }

        Ok(())
    }

    /// Predicts `init_prediction + learning_rate · Σ tree(x)` elementwise.
    /// Read-only; callable any number of times after one `fit`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let init = self.init_prediction.ok_or(GBoostError::NotFitted)?;
        let mut predictions = Array1::from_elem(x.nrows(), init);
        for tree in &self.trees {
            predictions.scaled_add(self.learning_rate, &tree.predict(x));
        }
        Ok(predictions)
    }

    /// Cumulative predictions after each boosting round.
    ///
    /// Yields one vector per trained tree; the k-th equals what `predict`
    /// would return for an ensemble truncated to the first k + 1 trees.
    pub fn staged_predict<'a>(
        &'a self,
        x: &'a Array2<f64>,
    ) -> Result<impl Iterator<Item = Array1<f64>> + 'a> {
        let init = self.init_prediction.ok_or(GBoostError::NotFitted)?;
        let mut running = Array1::from_elem(x.nrows(), init);
        Ok(self.trees.iter().map(move |tree| {
            running.scaled_add(self.learning_rate, &tree.predict(x));
            running.clone()
        }))
    }

    /// Writes the fitted ensemble to `path` as JSON.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.init_prediction.is_none() {
            return Err(GBoostError::NotFitted);
        }
        let encoded = serde_json::to_string(self)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Reads an ensemble previously written by [`save_model`](Self::save_model).
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let encoded = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&encoded)?)
    }
}

impl Regressor for GradientBoostingTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        GradientBoostingTree::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        GradientBoostingTree::predict(self, x)
    }
}
