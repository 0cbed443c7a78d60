//! Simulated sensor that speaks the serial line protocol.
//!
//! Useful for running the monitor without a microcontroller attached. The
//! generator is a seeded, mean-reverting random walk, so a given seed always
//! produces the same stream. A small fraction of lines is deliberately
//! garbled to exercise the decoder's skip path.

use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::{AppError, EXIT_IO};

const TEMPERATURE_MEAN_C: f64 = 24.0;
const TEMPERATURE_STEP_C: f64 = 0.35;
const LIGHT_MEAN: f64 = 180.0;
const LIGHT_STEP: f64 = 18.0;
/// Pull back towards the mean per step.
const REVERSION: f64 = 0.06;
const GARBLE_PROB: f64 = 0.02;

/// An endless `io::Read` of `"<temperature>,<light>\n"` records.
pub struct SimulatedSensor {
    rng: StdRng,
    noise: Normal<f64>,
    temperature: f64,
    light: f64,
    interval: Duration,
    pending: Vec<u8>,
    pos: usize,
}

impl SimulatedSensor {
    pub fn new(seed: u64, interval: Duration) -> Result<Self, AppError> {
        let noise = Normal::new(0.0, 1.0)
            .map_err(|e| AppError::new(EXIT_IO, format!("Noise distribution error: {e}")))?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            noise,
            temperature: TEMPERATURE_MEAN_C,
            light: LIGHT_MEAN,
            interval,
            pending: Vec::new(),
            pos: 0,
        })
    }

    /// Advance the walk and return the next protocol line (newline included).
    pub fn next_line(&mut self) -> String {
        let dt = self.noise.sample(&mut self.rng) * TEMPERATURE_STEP_C;
        self.temperature += dt + REVERSION * (TEMPERATURE_MEAN_C - self.temperature);

        let dl = self.noise.sample(&mut self.rng) * LIGHT_STEP;
        self.light = (self.light + dl + REVERSION * (LIGHT_MEAN - self.light)).max(0.0);

        if self.rng.gen_bool(GARBLE_PROB) {
            return match self.rng.gen_range(0..3) {
                0 => "\n".to_string(),
                1 => format!("{:.1}\n", self.temperature),
                _ => "ERR,sensor\n".to_string(),
            };
        }
        format!("{:.1},{:.0}\n", self.temperature, self.light)
    }
}

impl Read for SimulatedSensor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.pending.len() {
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
            self.pending = self.next_line().into_bytes();
            self.pos = 0;
        }
        let n = (self.pending.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::decode::decode_line;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimulatedSensor::new(7, Duration::ZERO).unwrap();
        let mut b = SimulatedSensor::new(7, Duration::ZERO).unwrap();
        for _ in 0..50 {
            assert_eq!(a.next_line(), b.next_line());
        }
    }

    #[test]
    fn most_lines_decode_to_plausible_values() {
        let mut sim = SimulatedSensor::new(42, Duration::ZERO).unwrap();
        let mut good = 0;
        for _ in 0..500 {
            let line = sim.next_line();
            assert!(line.ends_with('\n'));
            if let Ok(sample) = decode_line(&line) {
                good += 1;
                assert!(sample.light >= 0.0);
                assert!((0.0..50.0).contains(&sample.temperature), "temp {}", sample.temperature);
            }
        }
        assert!(good > 450, "only {good} good lines");
    }

    #[test]
    fn read_splits_lines_across_small_buffers() {
        let mut sim = SimulatedSensor::new(1, Duration::ZERO).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        while out.iter().filter(|&&b| b == b'\n').count() < 5 {
            let n = sim.read(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
    }
}
