//! Spectral subtraction over a short-time Fourier transform.
//!
//! The noise magnitude profile is estimated per frequency bin as a low
//! percentile across frames: speech is intermittent while background noise is
//! continuous, so the quiet tail of each bin's distribution approximates the
//! noise spectrum.

use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

use crate::core::audio::{AudioError, dsp};

/// Percentile of per-bin magnitudes treated as the noise profile.
const NOISE_PROFILE_PERCENTILE: f32 = 20.0;

/// Residual gain floor; keeps bins from collapsing to zero, which sounds
/// worse (musical noise) than leaving a faint residue.
const SPECTRAL_FLOOR: f32 = 0.02;

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (size as f32 - 1.0)).cos())
        .collect()
}

/// Subtract `reduction` times the estimated noise magnitude from every STFT
/// bin and reconstruct by weighted overlap-add. Output length matches input.
pub(crate) fn subtract_noise(
    samples: &[f32],
    frame_len: usize,
    hop_len: usize,
    reduction: f32,
) -> Result<Vec<f32>, AudioError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if samples.len() < frame_len {
        // Too short for even one full frame; attenuating a single partial
        // frame would distort more than it cleans.
        return Ok(samples.to_vec());
    }

    // Zero-pad by half a frame on each side so every real sample gets full
    // window-overlap coverage; without this the overlap-add weights vanish
    // toward the signal edges and the division below amplifies them.
    let pad = frame_len / 2;
    let mut padded = vec![0.0f32; pad];
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + pad, 0.0);

    let window = hann_window(frame_len);
    let bins = frame_len / 2 + 1;

    let mut planner = RealFftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(frame_len);
    let inverse = planner.plan_fft_inverse(frame_len);

    // Analysis pass: windowed frames to complex spectra.
    let mut spectra: Vec<Vec<Complex<f32>>> = Vec::new();
    let mut input = forward.make_input_vec();
    let mut scratch = forward.make_scratch_vec();

    let mut start = 0;
    while start < padded.len() {
        let end = (start + frame_len).min(padded.len());
        input.fill(0.0);
        for (i, &sample) in padded[start..end].iter().enumerate() {
            input[i] = sample * window[i];
        }

        let mut spectrum = forward.make_output_vec();
        forward
            .process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            .map_err(|e| AudioError::Decode(format!("forward FFT: {e}")))?;
        spectra.push(spectrum);

        start += hop_len;
    }

    // Per-bin noise profile.
    let mut noise_profile = vec![0.0f32; bins];
    let mut magnitudes = vec![0.0f32; spectra.len()];
    for (bin, noise) in noise_profile.iter_mut().enumerate() {
        for (frame, spectrum) in spectra.iter().enumerate() {
            magnitudes[frame] = spectrum[bin].norm();
        }
        *noise = dsp::percentile(&magnitudes, NOISE_PROFILE_PERCENTILE);
    }

    // Subtraction: scale each bin toward the floor, keeping phase.
    for spectrum in &mut spectra {
        for (bin, value) in spectrum.iter_mut().enumerate() {
            let magnitude = value.norm();
            if magnitude > 0.0 {
                let cleaned = (magnitude - reduction * noise_profile[bin])
                    .max(SPECTRAL_FLOOR * magnitude);
                *value *= cleaned / magnitude;
            }
        }
    }

    // Synthesis pass: weighted overlap-add with the same window, then crop
    // the padding back off.
    let mut output = vec![0.0f32; padded.len()];
    let mut weight = vec![0.0f32; padded.len()];
    let mut frame_out = inverse.make_output_vec();
    let mut inv_scratch = inverse.make_scratch_vec();
    let scale = 1.0 / frame_len as f32;

    for (frame, spectrum) in spectra.iter_mut().enumerate() {
        // The inverse transform requires purely real DC and Nyquist bins.
        spectrum[0].im = 0.0;
        spectrum[bins - 1].im = 0.0;

        inverse
            .process_with_scratch(spectrum, &mut frame_out, &mut inv_scratch)
            .map_err(|e| AudioError::Decode(format!("inverse FFT: {e}")))?;

        let start = frame * hop_len;
        for i in 0..frame_len {
            let index = start + i;
            if index >= output.len() {
                break;
            }
            output[index] += frame_out[i] * scale * window[i];
            weight[index] += window[i] * window[i];
        }
    }

    for (sample, w) in output.iter_mut().zip(weight.iter()) {
        if *w > 1e-3 {
            *sample /= *w;
        } else {
            *sample = 0.0;
        }
    }

    Ok(output[pad..pad + samples.len()].to_vec())
}
