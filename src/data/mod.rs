pub mod idx;
pub mod mnist;

pub use mnist::{MnistSplit, Split};
