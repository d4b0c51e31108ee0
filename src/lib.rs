pub mod math;
pub mod layers;
pub mod model;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use layers::recurrent::RecurrentLayer;
pub use layers::linear::LinearLayer;
pub use model::classifier::RnnClassifier;
pub use loss::cross_entropy::CrossEntropyLoss;
pub use optim::adam::Adam;
pub use train::trainer::{evaluate, train_epoch};
pub use train::train_config::TrainConfig;
