#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationConfig {
    /// Scale from pointer displacement along the axis to prismatic offset.
    pub prismatic_sensitivity: f32,
    /// Minimum change from the last applied value before a new value is applied.
    pub value_epsilon: f32,
    /// Rays with `|direction·normal|` at or below this are treated as parallel.
    pub parallel_epsilon: f32,
    /// Projected pivot vectors shorter than this are treated as degenerate.
    pub degenerate_epsilon: f32,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            prismatic_sensitivity: 0.01,
            value_epsilon: 1e-4,
            parallel_epsilon: 1e-3,
            degenerate_epsilon: 1e-3,
        }
    }
}

impl ManipulationConfig {
    pub fn new(prismatic_sensitivity: f32) -> Self {
        Self {
            prismatic_sensitivity,
            ..Default::default()
        }
    }

    pub fn with_value_epsilon(mut self, epsilon: f32) -> Self {
        self.value_epsilon = epsilon;
        self
    }

    pub fn with_parallel_epsilon(mut self, epsilon: f32) -> Self {
        self.parallel_epsilon = epsilon;
        self
    }

    pub fn with_degenerate_epsilon(mut self, epsilon: f32) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }
}
