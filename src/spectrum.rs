use std::f64::consts::PI;
use std::io::{self, Write};

use log::debug;

use crate::error::{Error, Result};

/// Logic level voltage used when a trace is measured.
pub(crate) const DEFAULT_VOLTS: f64 = 5.0;

pub(crate) fn logic_levels(bits: &[bool], volts: f64) -> Vec<f64> {
    bits.iter().map(|&b| if b { volts } else { 0.0 }).collect()
}

pub(crate) fn mean_estimate(x: &[f64]) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    Some(x.iter().sum::<f64>() / x.len() as f64)
}

pub(crate) fn variance_estimate(x: &[f64]) -> Option<f64> {
    let mean = mean_estimate(x)?;
    let squares: Vec<f64> = x.iter().map(|v| (v - mean).powi(2)).collect();
    mean_estimate(&squares)
}

/// One sided periodogram density estimate with the mean removed and no
/// window applied. Returns `(frequency, density)` for bins `0..=n/2`.
pub(crate) fn periodogram(samples: &[f64], sample_rate: f64) -> Result<Vec<(f64, f64)>> {
    if sample_rate.is_nan() || sample_rate <= 0.0 || sample_rate.is_infinite() {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    let n = samples.len();
    let Some(mean) = mean_estimate(samples) else {
        return Ok(Vec::new());
    };
    let centered: Vec<f64> = samples.iter().map(|x| x - mean).collect();

    // e^{-2πi m/n} for m in 0..n; the exponent k*j is reduced mod n.
    let twiddles: Vec<(f64, f64)> = (0..n)
        .map(|m| {
            let angle = -2.0 * PI * m as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .collect();

    let scale = 1.0 / (sample_rate * n as f64);
    let bins = n / 2 + 1;
    debug!("periodogram of {} samples, {} bins", n, bins);

    let rows = (0..bins)
        .map(|k| {
            let (mut re, mut im) = (0.0, 0.0);
            for (j, x) in centered.iter().enumerate() {
                let (c, s) = twiddles[(k * j) % n];
                re += x * c;
                im += x * s;
            }

            let mut density = (re * re + im * im) * scale;
            let nyquist = n % 2 == 0 && k == n / 2;
            if k != 0 && !nyquist {
                density *= 2.0;
            }
            (k as f64 * sample_rate / n as f64, density)
        })
        .collect();
    Ok(rows)
}

pub(crate) fn write_psd<W: Write>(rows: &[(f64, f64)], out: &mut W) -> io::Result<()> {
    writeln!(out, "frequency,density")?;
    for (frequency, density) in rows {
        writeln!(out, "{},{}", frequency, density)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn statistics() {
        let x = logic_levels(&[true, false, true, true], DEFAULT_VOLTS);
        assert_eq!(x, vec![5.0, 0.0, 5.0, 5.0]);
        assert!((mean_estimate(&x).unwrap() - 3.75).abs() < EPS);
        // mean of squared deviations: (1.25^2 * 3 + 3.75^2) / 4
        assert!((variance_estimate(&x).unwrap() - 4.6875).abs() < EPS);

        assert_eq!(mean_estimate(&[]), None);
        assert_eq!(variance_estimate(&[]), None);
    }

    #[test]
    fn constant_signal_has_no_power() {
        let rows = periodogram(&[5.0; 8], 1.0).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|(_, d)| d.abs() < EPS));
    }

    #[test]
    fn alternating_signal_peaks_at_nyquist() {
        let x = logic_levels(&[false, true, false, true, false, true, false, true], 5.0);
        let rows = periodogram(&x, 1.0).unwrap();

        assert_eq!(rows.len(), 5);
        let (frequency, density) = rows[4];
        assert!((frequency - 0.5).abs() < EPS);
        // |X_4| = 8 * 2.5, not doubled at Nyquist
        assert!((density - 50.0).abs() < 1e-6);
        assert!(rows[..4].iter().all(|(_, d)| d.abs() < 1e-6));
    }

    #[test]
    fn odd_length_doubles_every_bin_but_dc() {
        // cos(2π k0 j / n) with n = 5, k0 = 1
        let n = 5;
        let x: Vec<f64> = (0..n)
            .map(|j| (2.0 * PI * j as f64 / n as f64).cos())
            .collect();
        let rows = periodogram(&x, 10.0).unwrap();

        assert_eq!(rows.len(), 3);
        assert!((rows[1].0 - 2.0).abs() < EPS);
        // |X_1| = n / 2, density = 2 * (n/2)^2 / (fs * n)
        assert!((rows[1].1 - 2.0 * 6.25 / 50.0).abs() < 1e-9);
        assert!(rows[2].1.abs() < 1e-9);
    }

    #[test]
    fn sample_rate_must_be_positive() {
        assert!(matches!(
            periodogram(&[1.0], 0.0),
            Err(Error::InvalidSampleRate(_))
        ));
        assert!(periodogram(&[1.0], -1.0).is_err());
        assert!(periodogram(&[1.0], f64::NAN).is_err());
        assert!(periodogram(&[1.0], f64::INFINITY).is_err());
        assert!(periodogram(&[], 1.0).unwrap().is_empty());
    }

    #[test]
    fn csv() {
        let mut out = Vec::new();
        write_psd(&[(0.0, 0.0), (0.5, 50.0)], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "frequency,density\n0,0\n0.5,50\n"
        );
    }
}
