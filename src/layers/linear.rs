use crate::math::matrix::Matrix;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Fully-connected output head projecting a hidden state to class logits.
///
/// No activation of its own: the logits feed the combined softmax +
/// cross-entropy gradient, so `backward()` passes deltas straight through.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinearLayer {
    pub input_size: usize,
    pub output_size: usize,
    /// Weights, shape (input_size, output_size).
    pub weights: Matrix,
    /// Bias, shape (1, output_size).
    pub bias: Matrix,
    // Input cached by the most recent forward pass.
    #[serde(skip)]
    input: Option<Matrix>,
}

impl LinearLayer {
    pub fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> LinearLayer {
        LinearLayer {
            input_size,
            output_size,
            weights: Matrix::xavier(input_size, output_size, rng),
            bias: Matrix::zeros(1, output_size),
            input: None,
        }
    }

    /// Projects a 1×input_size row to 1×output_size logits; caches the input
    /// for `backward()`.
    pub fn forward(&mut self, input: &Matrix) -> Matrix {
        let out = &(input * &self.weights) + &self.bias;
        self.input = Some(input.clone());
        out
    }

    /// Takes ∂L/∂logits and returns (weight grad, bias grad, ∂L/∂input).
    pub fn backward(&self, delta: &Matrix) -> (Matrix, Matrix, Matrix) {
        let input = self
            .input
            .as_ref()
            .expect("backward() called before forward()");
        let w_grad = &input.transpose() * delta;
        let b_grad = delta.clone();
        let d_input = delta * &self.weights.transpose();
        (w_grad, b_grad, d_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn forward_output_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = LinearLayer::new(8, 10, &mut rng);
        let out = layer.forward(&Matrix::zeros(1, 8));
        assert_eq!(out.rows, 1);
        assert_eq!(out.cols, 10);
        // Zero input with zero bias gives zero logits.
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut layer = LinearLayer::new(4, 3, &mut rng);
        let input = Matrix::from_vec(1, 4, vec![0.3, -0.7, 0.2, 0.9]);

        // Scalar objective: f = sum(logits), so ∂f/∂logits = 1 everywhere.
        layer.forward(&input);
        let ones = Matrix::from_vec(1, 3, vec![1.0; 3]);
        let (w_grad, b_grad, d_input) = layer.backward(&ones);

        let eps = 1e-6;
        for i in 0..4 {
            for j in 0..3 {
                let original = layer.weights[(i, j)];
                layer.weights[(i, j)] = original + eps;
                let plus: f64 = layer.forward(&input).as_slice().iter().sum();
                layer.weights[(i, j)] = original - eps;
                let minus: f64 = layer.forward(&input).as_slice().iter().sum();
                layer.weights[(i, j)] = original;

                let numeric = (plus - minus) / (2.0 * eps);
                assert!((numeric - w_grad[(i, j)]).abs() < 1e-7);
            }
        }

        // Bias gradient equals the delta; input gradient is delta · W^T.
        assert_eq!(b_grad.as_slice(), &[1.0, 1.0, 1.0]);
        for i in 0..4 {
            let expected: f64 = (0..3).map(|j| layer.weights[(i, j)]).sum();
            assert!((d_input[(0, i)] - expected).abs() < 1e-12);
        }
    }
}
