/// First-order lag element.
///
/// Discrete update `y' = y + (1 - e^(-dt/tc)) * (u - y)`, the exact
/// exponential-decay discretization, stable for any `dt > 0`. With a zero
/// time constant the output snaps to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lag {
    time_constant: f64,
    value: f64,
}

impl Default for Lag {
    fn default() -> Self {
        Self {
            time_constant: 0.0,
            value: 0.0,
        }
    }
}

impl Lag {
    pub fn new(time_constant: f64) -> Self {
        let mut lag = Self::default();
        lag.set_time_constant(time_constant);
        lag
    }

    pub fn with_value(time_constant: f64, value: f64) -> Self {
        let mut lag = Self::new(time_constant);
        lag.value = value;
        lag
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    /// Non-positive time constants are rejected and the parameter is left
    /// unchanged.
    pub fn set_time_constant(&mut self, time_constant: f64) {
        if time_constant > 0.0 {
            self.time_constant = time_constant;
        }
    }

    pub fn update(&mut self, input: f64, dt: f64) -> f64 {
        self.value = Self::calculate(input, self.value, dt, self.time_constant);
        self.value
    }

    /// Pure static variant of the first-order lag update.
    pub fn calculate(u: f64, y: f64, dt: f64, tc: f64) -> f64 {
        if dt <= 0.0 {
            return y;
        }
        if tc > 0.0 {
            y + (1.0 - (-dt / tc).exp()) * (u - y)
        } else {
            u
        }
    }
}

/// Second-order lag: two cascaded independent first-order stages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lag2 {
    stage_1: Lag,
    stage_2: Lag,
}

impl Lag2 {
    pub fn new(tc_1: f64, tc_2: f64) -> Self {
        Self {
            stage_1: Lag::new(tc_1),
            stage_2: Lag::new(tc_2),
        }
    }

    /// Output of the second stage.
    pub fn value(&self) -> f64 {
        self.stage_2.value()
    }

    /// Seeds both stages, so a constant input equal to `value` is a fixed point.
    pub fn set_value(&mut self, value: f64) {
        self.stage_1.set_value(value);
        self.stage_2.set_value(value);
    }

    pub fn update(&mut self, input: f64, dt: f64) -> f64 {
        let intermediate = self.stage_1.update(input, dt);
        self.stage_2.update(intermediate, dt)
    }
}
