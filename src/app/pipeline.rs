//! Shared "reading pipeline" used by the reader worker and both front-ends.
//!
//! raw line -> decode -> score -> `Reading`
//!
//! The TUI and the headless monitor can then focus on presentation (widgets
//! vs printing).

use chrono::{DateTime, Local};

use crate::domain::{Reading, Sample};
use crate::growth;
use crate::io::decode::{DecodeError, decode_line};

/// Turn one raw line into a scored reading stamped with `received_at`.
pub fn process_line(line: &str, received_at: DateTime<Local>) -> Result<Reading, DecodeError> {
    let sample = decode_line(line)?;
    Ok(score_sample(sample, received_at))
}

/// Score an already-decoded sample.
pub fn score_sample(sample: Sample, received_at: DateTime<Local>) -> Reading {
    Reading {
        sample,
        growth: growth::score(sample.temperature, sample.light),
        received_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_line_becomes_reading() {
        let now = Local::now();
        let reading = process_line("24.5,600\n", now).unwrap();
        assert_eq!(reading.sample, Sample::new(24.5, 600.0));
        assert!((reading.growth - 97.5).abs() < 1e-9);
        assert_eq!(reading.received_at, now);
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(process_line("abc,600", Local::now()).is_err());
        assert!(process_line("", Local::now()).is_err());
    }
}
