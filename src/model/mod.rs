pub mod classifier;

pub use classifier::{Gradients, RnnClassifier};
