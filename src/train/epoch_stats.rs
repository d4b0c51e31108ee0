/// Per-epoch training statistics returned by `train_epoch`.
#[derive(Debug, Clone)]
pub struct EpochStats {
    /// Epoch number as counted by the caller (the experiment counts from 0).
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss over all samples in this epoch.
    pub train_loss: f64,
    /// Running training accuracy over the epoch, as a percentage in [0, 100].
    pub train_accuracy: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
