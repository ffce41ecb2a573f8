//! Mel-frequency cepstral coefficients.
//!
//! Pipeline per signal:
//!
//! 1. Centre-pad by `N_FFT / 2` zeros on both sides and cut frames of
//!    [`N_FFT`] samples every [`HOP_LENGTH`] samples.
//! 2. Periodic Hann window, FFT, power spectrum.
//! 3. [`N_MELS`] Slaney-style triangular mel filters from 0 Hz to Nyquist,
//!    area-normalised.
//! 4. Power to decibels, floored at 80 dB below the loudest bin of the
//!    whole signal.
//! 5. Orthonormal DCT-II, keeping the first [`N_MFCC`] coefficients.
//!
//! The DCT is linear, so the mean of the per-frame coefficients equals the
//! DCT of the mean log-mel frame; [`MfccExtractor::mean_mfcc`] uses that.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Coefficients kept per frame.
pub const N_MFCC: usize = 13;
/// FFT window length.
pub const N_FFT: usize = 2048;
/// Samples between frame starts.
pub const HOP_LENGTH: usize = 512;
/// Mel filters.
pub const N_MELS: usize = 128;

const N_BINS: usize = N_FFT / 2 + 1;
const TOP_DB: f32 = 80.0;
const AMIN: f32 = 1e-10;

/// MFCC extractor for one sample rate.
pub struct MfccExtractor {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    mel_basis: Vec<Vec<f32>>,
    dct_basis: Vec<Vec<f32>>,
}

impl MfccExtractor {
    /// Build the window, filterbank and DCT matrix for `sample_rate`.
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(N_FFT);
        Self {
            fft,
            window: hann_window(N_FFT),
            mel_basis: mel_filterbank(sample_rate as f32, N_FFT, N_MELS),
            dct_basis: dct_ortho_basis(N_MFCC, N_MELS),
        }
    }

    /// Number of frames produced for a signal of `len` samples.
    #[must_use]
    pub fn frame_count(len: usize) -> usize {
        if len == 0 {
            0
        } else {
            1 + len / HOP_LENGTH
        }
    }

    /// Mel power spectrogram, one `N_MELS` row per frame.
    #[must_use]
    pub fn mel_spectrogram(&self, signal: &[f32]) -> Vec<Vec<f32>> {
        let pad = N_FFT / 2;
        let frames = Self::frame_count(signal.len());
        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let mut power = vec![0.0f32; N_BINS];
        let mut out = Vec::with_capacity(frames);

        for frame in 0..frames {
            let start = frame * HOP_LENGTH;
            for (i, slot) in buffer.iter_mut().enumerate() {
                // Index into the virtually zero-padded signal
                let sample = (start + i)
                    .checked_sub(pad)
                    .and_then(|idx| signal.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);

            for (p, c) in power.iter_mut().zip(buffer.iter()) {
                *p = c.norm_sqr();
            }

            let mel: Vec<f32> = self
                .mel_basis
                .iter()
                .map(|filter| filter.iter().zip(&power).map(|(w, p)| w * p).sum())
                .collect();
            out.push(mel);
        }

        out
    }

    /// MFCCs per frame.
    #[must_use]
    pub fn mfcc(&self, signal: &[f32]) -> Vec<[f32; N_MFCC]> {
        let log_mel = power_to_db(self.mel_spectrogram(signal));
        log_mel.iter().map(|frame| self.dct(frame)).collect()
    }

    /// Mean MFCC vector over all frames, or `None` for an empty signal.
    #[must_use]
    pub fn mean_mfcc(&self, signal: &[f32]) -> Option<[f32; N_MFCC]> {
        let log_mel = power_to_db(self.mel_spectrogram(signal));
        if log_mel.is_empty() {
            return None;
        }

        let mut mean = vec![0.0f64; N_MELS];
        for frame in &log_mel {
            for (m, v) in mean.iter_mut().zip(frame) {
                *m += f64::from(*v);
            }
        }
        let n = log_mel.len() as f64;
        let mean: Vec<f32> = mean.into_iter().map(|m| (m / n) as f32).collect();

        Some(self.dct(&mean))
    }

    fn dct(&self, frame: &[f32]) -> [f32; N_MFCC] {
        let mut coeffs = [0.0f32; N_MFCC];
        for (c, row) in coeffs.iter_mut().zip(&self.dct_basis) {
            *c = row.iter().zip(frame).map(|(b, x)| b * x).sum();
        }
        coeffs
    }
}

/// Convert a power spectrogram to decibels with a global `TOP_DB` floor.
fn power_to_db(mut spec: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
    let mut max_db = f32::NEG_INFINITY;
    for frame in &mut spec {
        for v in frame.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10();
            max_db = max_db.max(*v);
        }
    }
    let floor = max_db - TOP_DB;
    for frame in &mut spec {
        for v in frame.iter_mut() {
            *v = v.max(floor);
        }
    }
    spec
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / len as f32).cos())
        .collect()
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above.
fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (logstep * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

fn mel_filterbank(sample_rate: f32, n_fft: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let n_bins = n_fft / 2 + 1;
    let nyquist = sample_rate / 2.0;
    let fft_freqs: Vec<f32> = (0..n_bins)
        .map(|i| i as f32 * nyquist / (n_bins - 1) as f32)
        .collect();

    let max_mel = hz_to_mel(nyquist);
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(max_mel * i as f32 / (n_mels + 1) as f32))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (right - left);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - left) / (center - left);
                    let upper = (right - f) / (right - center);
                    lower.min(upper).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

fn dct_ortho_basis(n_out: usize, n_in: usize) -> Vec<Vec<f32>> {
    let n = n_in as f32;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            (0..n_in)
                .map(|i| scale * (PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}
