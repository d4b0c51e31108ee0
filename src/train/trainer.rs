use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::mnist::MnistSplit;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::model::classifier::{Gradients, RnnClassifier};
use crate::optim::adam::Adam;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Runs one full epoch of mini-batch training over `data` and returns the
/// epoch's statistics.
///
/// Sample order is reshuffled from `rng`. For every mini-batch the per-sample
/// gradients are accumulated, averaged by the actual batch size (the final
/// batch may be short), and applied with one optimizer step per parameter.
/// The `correct`/`total` running counters cover the whole epoch so the
/// printed accuracy is the running training accuracy, as in the original
/// experiment's progress line.
///
/// # Panics
/// Panics if `data` is empty or `config.batch_size == 0`.
pub fn train_epoch(
    model: &mut RnnClassifier,
    data: &MnistSplit,
    optimizer: &mut Adam,
    config: &TrainConfig,
    epoch: usize,
    rng: &mut StdRng,
) -> EpochStats {
    assert!(!data.is_empty(), "training data must not be empty");
    assert!(config.batch_size > 0, "batch_size must be at least 1");

    let t_start = Instant::now();
    let n = data.len();

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let mut total_loss = 0.0;
    let mut correct = 0usize;
    let mut total = 0usize;

    for (step, batch) in indices.chunks(config.batch_size).enumerate() {
        let mut acc_grads = Gradients::zeros_like(model);
        let mut batch_loss = 0.0;

        // Accumulate gradients over the mini-batch.
        for &idx in batch {
            let image = &data.images[idx];
            let target = data.labels[idx] as usize;

            let logits = model.forward(image);
            batch_loss += CrossEntropyLoss::loss(&logits, target);

            // Combined softmax + CE gradient: predicted - one_hot(target).
            let delta = CrossEntropyLoss::derivative(&logits, target);
            acc_grads.accumulate(&model.backward(&delta));

            total += 1;
            if argmax(&logits) == target {
                correct += 1;
            }
        }

        // Average and apply.
        let avg_grads = acc_grads.scale(1.0 / batch.len() as f64);
        model.apply_gradients(&avg_grads, optimizer);

        total_loss += batch_loss;

        if config.log_every > 0 && step % config.log_every == 0 {
            println!(
                "Epoch/Step: {}/{} | train loss: {:.4} | accuracy: {:.2} %",
                epoch,
                step,
                batch_loss / batch.len() as f64,
                100.0 * correct as f64 / total as f64
            );
        }
    }

    EpochStats {
        epoch,
        total_epochs: config.epochs,
        train_loss: total_loss / n as f64,
        train_accuracy: 100.0 * correct as f64 / total as f64,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    }
}

/// Forward-only accuracy counters from an evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct EvalStats {
    pub correct: usize,
    pub total: usize,
}

impl EvalStats {
    /// Accuracy as a percentage in [0, 100].
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.correct as f64 / self.total as f64
    }
}

/// Evaluates `model` over a split without touching any parameter: forward
/// pass and argmax comparison only.
pub fn evaluate(model: &mut RnnClassifier, data: &MnistSplit) -> EvalStats {
    let mut correct = 0usize;
    let mut total = 0usize;

    for (image, &label) in data.images.iter().zip(data.labels.iter()) {
        let logits = model.forward(image);
        total += 1;
        if argmax(&logits) == label as usize {
            correct += 1;
        }
    }

    EvalStats { correct, total }
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
