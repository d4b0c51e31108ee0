use crate::math::matrix::Matrix;

/// Bias-corrected first/second moment estimates for one parameter slot.
struct AdamSlot {
    m: Matrix,
    v: Matrix,
    t: usize,
}

/// Adam optimizer (Kingma & Ba, 2015).
///
/// Keeps one moment pair per parameter slot; slots are stable indices the
/// model assigns to its parameters, and state is allocated lazily on the
/// first step for each slot.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    slots: Vec<Option<AdamSlot>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            slots: Vec::new(),
        }
    }

    /// Applies one Adam update to `param` given its averaged `grad`.
    ///
    /// Panics if the gradient shape does not match the parameter, or if a
    /// slot is reused with a different parameter shape.
    pub fn step(&mut self, slot: usize, param: &mut Matrix, grad: &Matrix) {
        assert_eq!(param.rows, grad.rows, "adam: gradient row count mismatch");
        assert_eq!(param.cols, grad.cols, "adam: gradient col count mismatch");

        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        let state = self.slots[slot].get_or_insert_with(|| AdamSlot {
            m: Matrix::zeros(param.rows, param.cols),
            v: Matrix::zeros(param.rows, param.cols),
            t: 0,
        });
        assert_eq!(state.m.rows, param.rows, "adam: slot reused with new shape");
        assert_eq!(state.m.cols, param.cols, "adam: slot reused with new shape");

        state.t += 1;
        let bc1 = 1.0 - self.beta1.powi(state.t as i32);
        let bc2 = 1.0 - self.beta2.powi(state.t as i32);

        for i in 0..param.rows {
            for j in 0..param.cols {
                let g = grad[(i, j)];
                state.m[(i, j)] = self.beta1 * state.m[(i, j)] + (1.0 - self.beta1) * g;
                state.v[(i, j)] = self.beta2 * state.v[(i, j)] + (1.0 - self.beta2) * g * g;
                let m_hat = state.m[(i, j)] / bc1;
                let v_hat = state.v[(i, j)] / bc2;
                param[(i, j)] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
            }
        }
    }
}
