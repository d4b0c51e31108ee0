/// Configuration for a training run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — samples per mini-batch; use `1` for online updates
/// - `learning_rate` — Adam step size
/// - `log_every`     — a progress line is printed every `log_every` batches;
///                     `0` disables progress output
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub log_every: usize,
}

impl Default for TrainConfig {
    /// The original experiment's hyperparameters: one epoch, batch 64,
    /// Adam at 0.01, a progress line every 10 batches.
    fn default() -> Self {
        TrainConfig {
            epochs: 1,
            batch_size: 64,
            learning_rate: 0.01,
            log_every: 10,
        }
    }
}
