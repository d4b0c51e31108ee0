/// Softmax cross-entropy computed directly from raw logits.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Softmax probabilities for a logit vector, stabilized by subtracting
    /// the maximum logit before exponentiation.
    pub fn softmax(logits: &[f64]) -> Vec<f64> {
        let max = logits
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    /// Scalar cross-entropy of `logits` against the integer class `target`:
    ///   L = log(sum_j exp(z_j)) - z_target
    ///
    /// Computed with the log-sum-exp trick so the result is finite for any
    /// finite logits.
    pub fn loss(logits: &[f64], target: usize) -> f64 {
        let max = logits
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let log_sum_exp: f64 = logits
            .iter()
            .map(|&z| (z - max).exp())
            .sum::<f64>()
            .ln()
            + max;
        log_sum_exp - logits[target]
    }

    /// Gradient of the combined softmax + cross-entropy w.r.t. the logits:
    ///   ∂L/∂z_i = softmax(z)_i - one_hot(target)_i
    ///
    /// This is the initial delta handed to the backward pass; the output
    /// layer applies no activation of its own, so the combined gradient is
    /// not double-applied.
    pub fn derivative(logits: &[f64], target: usize) -> Vec<f64> {
        let mut grad = Self::softmax(logits);
        grad[target] -= 1.0;
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_logits_cost_is_ln_n() {
        let logits = vec![0.0; 10];
        let loss = CrossEntropyLoss::loss(&logits, 3);
        assert!((loss - (10.0f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn loss_is_finite_and_non_negative() {
        let cases = [
            vec![1000.0, -1000.0, 0.0],
            vec![-50.0, -50.0, -50.0],
            vec![0.0, 0.0, 700.0],
        ];
        for logits in &cases {
            for target in 0..logits.len() {
                let loss = CrossEntropyLoss::loss(logits, target);
                assert!(loss.is_finite(), "loss not finite for {:?}", logits);
                assert!(loss >= 0.0, "loss negative for {:?}", logits);
            }
        }
    }

    #[test]
    fn derivative_sums_to_zero() {
        let logits = vec![2.0, -1.0, 0.5, 3.0];
        let grad = CrossEntropyLoss::derivative(&logits, 2);
        let sum: f64 = grad.iter().sum();
        assert!(sum.abs() < 1e-12);
        // Target component is shifted down by exactly one.
        assert!(grad[2] < 0.0);
    }

    #[test]
    fn confident_correct_prediction_has_small_loss() {
        let logits = vec![0.0, 20.0, 0.0];
        assert!(CrossEntropyLoss::loss(&logits, 1) < 1e-6);
    }
}
