use crate::layers::linear::LinearLayer;
use crate::layers::recurrent::RecurrentLayer;
use crate::math::matrix::Matrix;
use crate::optim::adam::Adam;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Gradients of every classifier parameter for one sample (or, after
/// accumulation and averaging, one mini-batch).
#[derive(Debug, Clone)]
pub struct Gradients {
    pub w_ih: Matrix,
    pub w_hh: Matrix,
    pub b_h: Matrix,
    pub fc_weights: Matrix,
    pub fc_bias: Matrix,
}

impl Gradients {
    /// Zero gradients shaped like `model`'s parameters, for accumulation.
    pub fn zeros_like(model: &RnnClassifier) -> Gradients {
        Gradients {
            w_ih: Matrix::zeros(model.rnn.w_ih.rows, model.rnn.w_ih.cols),
            w_hh: Matrix::zeros(model.rnn.w_hh.rows, model.rnn.w_hh.cols),
            b_h: Matrix::zeros(model.rnn.b_h.rows, model.rnn.b_h.cols),
            fc_weights: Matrix::zeros(model.fc.weights.rows, model.fc.weights.cols),
            fc_bias: Matrix::zeros(model.fc.bias.rows, model.fc.bias.cols),
        }
    }

    pub fn accumulate(&mut self, other: &Gradients) {
        self.w_ih.accumulate(&other.w_ih);
        self.w_hh.accumulate(&other.w_hh);
        self.b_h.accumulate(&other.b_h);
        self.fc_weights.accumulate(&other.fc_weights);
        self.fc_bias.accumulate(&other.fc_bias);
    }

    pub fn scale(&self, factor: f64) -> Gradients {
        Gradients {
            w_ih: self.w_ih.scale(factor),
            w_hh: self.w_hh.scale(factor),
            b_h: self.b_h.scale(factor),
            fc_weights: self.fc_weights.scale(factor),
            fc_bias: self.fc_bias.scale(factor),
        }
    }
}

/// One-layer recurrent classifier: a tanh recurrence over the image rows,
/// final-hidden-state pooling, and a linear projection to class logits.
#[derive(Serialize, Deserialize)]
pub struct RnnClassifier {
    pub time_steps: usize,
    pub rnn: RecurrentLayer,
    pub fc: LinearLayer,
}

impl RnnClassifier {
    /// `input_size` values per time step, `time_steps` steps per sample,
    /// projecting `hidden_size` down to `n_classes` logits.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        time_steps: usize,
        n_classes: usize,
        rng: &mut StdRng,
    ) -> RnnClassifier {
        RnnClassifier {
            time_steps,
            rnn: RecurrentLayer::new(input_size, hidden_size, rng),
            fc: LinearLayer::new(hidden_size, n_classes, rng),
        }
    }

    /// Forward pass over one flat sample (e.g. 784 pixels viewed as 28 rows
    /// of 28). Returns the class logits.
    ///
    /// Panics if the sample length is not `time_steps * input_size`.
    pub fn forward(&mut self, sample: &[f64]) -> Vec<f64> {
        assert_eq!(
            sample.len(),
            self.time_steps * self.rnn.input_size,
            "sample length {} does not view as {} steps of {}",
            sample.len(),
            self.time_steps,
            self.rnn.input_size
        );
        // Each image row becomes one time step.
        let steps: Vec<&[f64]> = sample.chunks_exact(self.rnn.input_size).collect();
        let h_last = self.rnn.forward(&steps);
        let logits = self.fc.forward(&h_last);
        logits.row(0).to_vec()
    }

    /// Backward pass from the combined softmax + cross-entropy delta
    /// (`softmax(logits) - one_hot(target)`) for the most recent `forward()`.
    pub fn backward(&self, logits_delta: &[f64]) -> Gradients {
        let delta = Matrix::from_row(logits_delta);
        let (fc_weights, fc_bias, d_hidden) = self.fc.backward(&delta);
        let rnn_grads = self.rnn.backward(&d_hidden);
        Gradients {
            w_ih: rnn_grads.w_ih,
            w_hh: rnn_grads.w_hh,
            b_h: rnn_grads.b_h,
            fc_weights,
            fc_bias,
        }
    }

    /// Hands every (parameter, gradient) pair to the optimizer under a
    /// stable slot index.
    pub fn apply_gradients(&mut self, grads: &Gradients, optimizer: &mut Adam) {
        optimizer.step(0, &mut self.rnn.w_ih, &grads.w_ih);
        optimizer.step(1, &mut self.rnn.w_hh, &grads.w_hh);
        optimizer.step(2, &mut self.rnn.b_h, &grads.b_h);
        optimizer.step(3, &mut self.fc.weights, &grads.fc_weights);
        optimizer.step(4, &mut self.fc.bias, &grads.fc_bias);
    }

    /// Serializes the model weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a model from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<RnnClassifier> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
