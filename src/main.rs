/// MNIST digit classification with a one-layer recurrent network.
///
/// Each 28×28 image is treated as a 28-step sequence of 28-pixel rows; the
/// final hidden state is projected to 10 class logits.
///
/// Architecture: 28 inputs → 64 tanh recurrent units → 10 logits
/// Loss:         softmax cross-entropy (combined gradient: predicted - expected)
/// Optimizer:    Adam, lr = 0.01
/// Batch size:   64
/// Epochs:       1
///
/// Dataset files are cached under ./mnist-data/ and downloaded on first run.
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rnn_mnist::data::mnist::{self, Split};
use rnn_mnist::{evaluate, train_epoch, Adam, RnnClassifier, TrainConfig};

// Hyperparameters of the experiment, fixed as literal constants.
const TIME_STEPS: usize = 28; // time steps per sample / image height
const INPUT_SIZE: usize = 28; // inputs per time step / image width
const HIDDEN_SIZE: usize = 64; // recurrent units
const N_CLASSES: usize = 10;
const SEED: u64 = 1; // reproducible

const CACHE_DIR: &str = "mnist-data";
const MODEL_PATH: &str = "mnist-data/rnn-mnist.json";

fn main() {
    let config = TrainConfig::default();

    // --- Load data (downloads into the cache on first run) ---
    println!("Loading MNIST data...");
    let train_data = mnist::load_split(Path::new(CACHE_DIR), Split::Train)
        .unwrap_or_else(|e| panic!("Failed to load training split: {}", e));
    let test_data = mnist::load_split(Path::new(CACHE_DIR), Split::Test)
        .unwrap_or_else(|e| panic!("Failed to load test split: {}", e));

    println!(
        "  Training set: {} images, {} labels",
        train_data.len(),
        train_data.labels.len()
    );
    println!(
        "  Test set:     {} images, {} labels",
        test_data.len(),
        test_data.labels.len()
    );

    // --- Build model ---
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut model = RnnClassifier::new(INPUT_SIZE, HIDDEN_SIZE, TIME_STEPS, N_CLASSES, &mut rng);

    println!("\nModel architecture:");
    println!(
        "  Recurrent: {} inputs x {} steps -> {} tanh units (Xavier init)",
        INPUT_SIZE, TIME_STEPS, HIDDEN_SIZE
    );
    println!("  Output:    {} -> {} logits", HIDDEN_SIZE, N_CLASSES);
    println!("  Loss:      softmax cross-entropy");
    println!(
        "  Optimizer: Adam, lr = {}, batch_size = {}\n",
        config.learning_rate, config.batch_size
    );

    // --- Train ---
    let mut optimizer = Adam::new(config.learning_rate);
    for epoch in 0..config.epochs {
        let stats = train_epoch(
            &mut model,
            &train_data,
            &mut optimizer,
            &config,
            epoch,
            &mut rng,
        );
        println!(
            "Epoch {} done in {:.1} s | mean loss: {:.4} | accuracy: {:.2} %",
            stats.epoch,
            stats.elapsed_ms as f64 / 1000.0,
            stats.train_loss,
            stats.train_accuracy
        );
    }

    // --- Save model weights ---
    model
        .save_json(MODEL_PATH)
        .unwrap_or_else(|e| panic!("Failed to save model to '{}': {}", MODEL_PATH, e));
    println!("\nModel saved to {}", MODEL_PATH);

    // --- Evaluate on test set ---
    println!("\nEvaluating on test set ({} images)...", test_data.len());
    let eval = evaluate(&mut model, &test_data);
    println!("  Correct: {}/{}", eval.correct, eval.total);
    println!("Test accuracy: {:.2} %", eval.accuracy());
}
