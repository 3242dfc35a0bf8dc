/// Second-order lead-lag filter.
///
/// Continuous transfer function
/// `(c1 s^2 + c2 s + c3) / (c4 s^2 + c5 s + c6)`, discretized each step with
/// the bilinear substitution so variable timesteps stay consistent. Covers
/// general lead-lag and notch-like behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadLag {
    c1: f64,
    c2: f64,
    c3: f64,
    c4: f64,
    c5: f64,
    c6: f64,
    u1: f64,
    u2: f64,
    y1: f64,
    y2: f64,
    value: f64,
}

impl LeadLag {
    #[allow(clippy::too_many_arguments)]
    pub fn new(c1: f64, c2: f64, c3: f64, c4: f64, c5: f64, c6: f64) -> Self {
        Self {
            c1,
            c2,
            c3,
            c4,
            c5,
            c6,
            u1: 0.0,
            u2: 0.0,
            y1: 0.0,
            y2: 0.0,
            value: 0.0,
        }
    }

    /// First-order lead-lag `(tc_lead s + 1) / (tc_lag s + 1)`.
    pub fn lead_lag(tc_lead: f64, tc_lag: f64) -> Self {
        Self::new(0.0, tc_lead, 1.0, 0.0, tc_lag, 1.0)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Seeds the whole signal history, so a constant input equal to `value`
    /// produces a constant output.
    pub fn set_value(&mut self, value: f64) {
        self.u1 = value;
        self.u2 = value;
        self.y1 = value;
        self.y2 = value;
        self.value = value;
    }

    pub fn update(&mut self, input: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return self.value;
        }

        // Bilinear substitution s = 2/dt * (z - 1)/(z + 1), multiplied
        // through by dt^2 (z + 1)^2.
        let t2 = dt * dt;
        let b0 = 4.0 * self.c1 + 2.0 * dt * self.c2 + t2 * self.c3;
        let b1 = -8.0 * self.c1 + 2.0 * t2 * self.c3;
        let b2 = 4.0 * self.c1 - 2.0 * dt * self.c2 + t2 * self.c3;
        let a0 = 4.0 * self.c4 + 2.0 * dt * self.c5 + t2 * self.c6;
        let a1 = -8.0 * self.c4 + 2.0 * t2 * self.c6;
        let a2 = 4.0 * self.c4 - 2.0 * dt * self.c5 + t2 * self.c6;

        if a0.abs() < f64::EPSILON {
            return self.value;
        }

        self.value =
            (b0 * input + b1 * self.u1 + b2 * self.u2 - a1 * self.y1 - a2 * self.y2) / a0;

        self.u2 = self.u1;
        self.u1 = input;
        self.y2 = self.y1;
        self.y1 = self.value;

        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::control::Lag;

    #[test]
    fn test_unity_transfer_is_passthrough() {
        let mut filter = LeadLag::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(filter.update(2.0, 0.01), 2.0);
        assert_relative_eq!(filter.update(-1.0, 0.01), -1.0);
    }

    #[test]
    fn test_dc_gain() {
        // At steady state only c3/c6 survives
        let mut filter = LeadLag::new(0.0, 0.2, 3.0, 0.0, 0.5, 1.5);
        for _ in 0..5000 {
            filter.update(1.0, 0.01);
        }
        assert_relative_eq!(filter.value(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pure_lag_matches_first_order_element() {
        // 1 / (tc s + 1) should track the exponential Lag closely
        let tc = 0.4;
        let dt = 0.001;
        let mut filter = LeadLag::new(0.0, 0.0, 1.0, 0.0, tc, 1.0);
        let mut lag = Lag::new(tc);

        for _ in 0..4000 {
            filter.update(1.0, dt);
            lag.update(1.0, dt);
        }
        assert_relative_eq!(filter.value(), lag.value(), epsilon = 1e-4);
    }

    #[test]
    fn test_set_value_holds_steady_state() {
        let mut filter = LeadLag::new(0.0, 0.2, 1.0, 0.0, 0.5, 1.0);
        filter.set_value(0.7);
        for _ in 0..100 {
            filter.update(0.7, 0.01);
        }
        assert_relative_eq!(filter.value(), 0.7, epsilon = 1e-9);
    }
}
