use crate::config::EstimatorConfig;

/// Scalar Kalman filter for smoothing a tracked measurement.
///
/// The state is never reset between updates, create a new estimator to forget
/// previous measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator {
    // Process noise variance
    q: f64,
    // Measurement noise variance
    r: f64,
    // Error covariance
    p: f64,
    // Current estimate
    x: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Estimator::new(EstimatorConfig::default())
    }
}

impl Estimator {
    pub fn new(conf: EstimatorConfig) -> Self {
        Estimator {
            q: conf.process_noise,
            r: conf.measurement_noise,
            p: 1.0,
            x: 0.0,
        }
    }

    /// Blend a measurement into the estimate and return the new estimate
    pub fn update(&mut self, measurement: f64) -> f64 {
        let k = (self.p + self.q) / (self.p + self.q + self.r);
        self.p = self.r * (self.p + self.q) / (self.r + self.p + self.q);
        self.x += (measurement - self.x) * k;
        self.x
    }

    pub fn estimate(&self) -> f64 {
        self.x
    }

    pub fn error_covariance(&self) -> f64 {
        self.p
    }

    pub fn config(&self) -> EstimatorConfig {
        EstimatorConfig {
            process_noise: self.q,
            measurement_noise: self.r,
        }
    }
}
