use crate::math::matrix::Matrix;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Gradients of a [`RecurrentLayer`]'s parameters for one sample, produced by
/// backpropagation through time.
#[derive(Debug, Clone)]
pub struct RecurrentGrads {
    pub w_ih: Matrix,
    pub w_hh: Matrix,
    pub b_h: Matrix,
}

/// A single tanh recurrent layer.
///
/// Processes one sample as an ordered sequence of input rows, carrying a
/// hidden state forward:
///
///   h_t = tanh(x_t · w_ih + h_{t-1} · w_hh + b_h)
///
/// The hidden state starts at zero for every sequence. `forward()` caches the
/// inputs, pre-activations and hidden states it saw so that `backward()` can
/// run backpropagation through time over the same sequence.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecurrentLayer {
    pub input_size: usize,
    pub hidden_size: usize,
    /// Input-to-hidden weights, shape (input_size, hidden_size).
    pub w_ih: Matrix,
    /// Hidden-to-hidden weights, shape (hidden_size, hidden_size).
    pub w_hh: Matrix,
    /// Hidden bias, shape (1, hidden_size).
    pub b_h: Matrix,
    // Per-step caches from the most recent forward pass.
    #[serde(skip)]
    inputs: Vec<Matrix>,
    #[serde(skip)]
    pre_activations: Vec<Matrix>,
    #[serde(skip)]
    hiddens: Vec<Matrix>,
}

impl RecurrentLayer {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut StdRng) -> RecurrentLayer {
        RecurrentLayer {
            input_size,
            hidden_size,
            w_ih: Matrix::xavier(input_size, hidden_size, rng),
            w_hh: Matrix::xavier(hidden_size, hidden_size, rng),
            b_h: Matrix::zeros(1, hidden_size),
            inputs: Vec::new(),
            pre_activations: Vec::new(),
            hiddens: Vec::new(),
        }
    }

    /// Runs the recurrence over `steps` input rows and returns the final
    /// hidden state as a 1×hidden_size matrix (final-step-only pooling).
    ///
    /// Panics if any step row is not `input_size` long.
    pub fn forward(&mut self, steps: &[&[f64]]) -> Matrix {
        let t = steps.len();
        self.inputs.clear();
        self.pre_activations.clear();
        self.hiddens.clear();
        self.inputs.reserve(t);
        self.pre_activations.reserve(t);
        self.hiddens.reserve(t + 1);

        // h_0 = 0: sequences are independent.
        self.hiddens.push(Matrix::zeros(1, self.hidden_size));

        for step in steps {
            assert_eq!(
                step.len(),
                self.input_size,
                "recurrent step length {} does not match input_size {}",
                step.len(),
                self.input_size
            );
            let x = Matrix::from_row(step);
            let h_prev = self.hiddens.last().unwrap();

            let z = &(&(&x * &self.w_ih) + &(h_prev * &self.w_hh)) + &self.b_h;
            let h = z.map(f64::tanh);

            self.inputs.push(x);
            self.pre_activations.push(z);
            self.hiddens.push(h);
        }

        self.hiddens.last().unwrap().clone()
    }

    /// Backpropagation through time.
    ///
    /// `d_hidden` is ∂L/∂h_T for the final hidden state returned by the last
    /// `forward()` call. Only the final step receives an external gradient;
    /// earlier steps get theirs through the recurrence.
    pub fn backward(&self, d_hidden: &Matrix) -> RecurrentGrads {
        assert!(
            !self.pre_activations.is_empty(),
            "backward() called before forward()"
        );

        let mut w_ih_grad = Matrix::zeros(self.input_size, self.hidden_size);
        let mut w_hh_grad = Matrix::zeros(self.hidden_size, self.hidden_size);
        let mut b_h_grad = Matrix::zeros(1, self.hidden_size);

        let mut d_h = d_hidden.clone();

        for t in (0..self.pre_activations.len()).rev() {
            // δ_t = ∂L/∂z_t = ∂L/∂h_t ⊙ tanh'(z_t)
            let tanh_derivative = self.pre_activations[t].map(|z| {
                let th = z.tanh();
                1.0 - th * th
            });
            let delta = d_h.hadamard(&tanh_derivative);

            w_ih_grad.accumulate(&(&self.inputs[t].transpose() * &delta));
            // hiddens[t] is h_{t-1}: the cache holds h_0 at index 0.
            w_hh_grad.accumulate(&(&self.hiddens[t].transpose() * &delta));
            b_h_grad.accumulate(&delta);

            // ∂L/∂h_{t-1} flows back through the recurrent weights.
            d_h = &delta * &self.w_hh.transpose();
        }

        RecurrentGrads {
            w_ih: w_ih_grad,
            w_hh: w_hh_grad,
            b_h: b_h_grad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn sum(m: &Matrix) -> f64 {
        m.as_slice().iter().sum()
    }

    #[test]
    fn forward_output_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = RecurrentLayer::new(3, 5, &mut rng);
        let steps: Vec<Vec<f64>> = vec![vec![0.1, 0.2, 0.3]; 4];
        let rows: Vec<&[f64]> = steps.iter().map(|s| s.as_slice()).collect();
        let h = layer.forward(&rows);
        assert_eq!(h.rows, 1);
        assert_eq!(h.cols, 5);
    }

    #[test]
    fn hidden_state_starts_at_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut layer = RecurrentLayer::new(2, 4, &mut rng);
        // With a zero input the first step reduces to tanh(b_h) = tanh(0) = 0,
        // so only the recurrence contributes — and there is nothing to carry.
        let zero = [0.0, 0.0];
        let h = layer.forward(&[&zero]);
        assert!(h.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn repeated_forward_resets_sequence_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = RecurrentLayer::new(2, 4, &mut rng);
        let a = [0.5, -0.25];
        let first = layer.forward(&[&a]);
        let second = layer.forward(&[&a]);
        // Identical sequences must produce identical outputs: no hidden
        // state leaks across forward() calls.
        assert_eq!(first, second);
    }

    /// Central-difference check of one parameter matrix against the analytic
    /// gradient of f = sum(h_T).
    fn check_param(
        layer: &mut RecurrentLayer,
        steps: &[&[f64]],
        grad: &Matrix,
        param: fn(&mut RecurrentLayer) -> &mut Matrix,
        name: &str,
    ) {
        let eps = 1e-6;
        let (r, c) = {
            let p = param(layer);
            (p.rows, p.cols)
        };
        for i in 0..r {
            for j in 0..c {
                let original = param(layer)[(i, j)];

                param(layer)[(i, j)] = original + eps;
                let plus = sum(&layer.forward(steps));
                param(layer)[(i, j)] = original - eps;
                let minus = sum(&layer.forward(steps));
                param(layer)[(i, j)] = original;

                let numeric = (plus - minus) / (2.0 * eps);
                let analytic = grad[(i, j)];
                assert!(
                    (numeric - analytic).abs() < 1e-6,
                    "{} grad mismatch at ({}, {}): numeric {} vs analytic {}",
                    name,
                    i,
                    j,
                    numeric,
                    analytic
                );
            }
        }
    }

    #[test]
    fn bptt_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut layer = RecurrentLayer::new(3, 4, &mut rng);
        let steps: Vec<Vec<f64>> = vec![
            vec![0.4, -0.2, 0.7],
            vec![-0.1, 0.3, 0.5],
            vec![0.9, 0.0, -0.6],
        ];
        let rows: Vec<&[f64]> = steps.iter().map(|s| s.as_slice()).collect();

        // Scalar objective: f = sum(h_T), so ∂f/∂h_T = 1 everywhere.
        layer.forward(&rows);
        let grads = layer.backward(&Matrix::from_vec(1, 4, vec![1.0; 4]));

        check_param(&mut layer, &rows, &grads.w_ih, |l| &mut l.w_ih, "w_ih");
        check_param(&mut layer, &rows, &grads.w_hh, |l| &mut l.w_hh, "w_hh");
        check_param(&mut layer, &rows, &grads.b_h, |l| &mut l.b_h, "b_h");
    }
}
