//! Band-pass biquad with Web Audio `BiquadFilterNode` coefficients
//! (Audio EQ Cookbook, constant 0 dB peak gain).

use std::f64::consts::PI;

/// Web Audio's default Q for a band-pass node.
pub const DEFAULT_Q: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct BandPass {
    b0: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    // Direct Form II Transposed state
    z1: f64,
    z2: f64,
}

impl BandPass {
    pub fn new(center_hz: f64, q: f64, sample_rate: f64) -> Self {
        // keep the centre strictly inside (0, nyquist) so the coefficients stay finite
        let nyquist = sample_rate * 0.5;
        let freq = center_hz.clamp(1.0, nyquist * 0.999);
        let w0 = 2.0 * PI * freq / sample_rate;
        let alpha = w0.sin() / (2.0 * q.max(1e-4));
        let a0 = 1.0 + alpha;
        Self {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        // b1 is zero for a band-pass
        let output = self.b0 * input + self.z1;
        self.z1 = -self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}
