//! Waveform math: channel downmix, sinc resampling, and short-time energy.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::AudioError;

/// Downmix interleaved samples to mono by averaging the channels.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample a mono waveform with a windowed-sinc interpolator.
///
/// Returns the input untouched when the rates already match.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024usize;
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);
    let mut position = 0;

    while position + chunk_size <= samples.len() {
        let chunk: [&[f32]; 1] = [&samples[position..position + chunk_size]];
        let frames = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
        position += chunk_size;
    }

    if position < samples.len() {
        let rest: [&[f32]; 1] = [&samples[position..]];
        let frames = resampler
            .process_partial(Some(&rest[..]), None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    // Drain the interpolator's internal delay line.
    let tail = resampler
        .process_partial(Option::<&[&[f32]]>::None, None)
        .map_err(|e| AudioError::Resample(e.to_string()))?;
    output.extend_from_slice(&tail[0]);

    Ok(output)
}

/// Peak absolute amplitude of a waveform; 0.0 for empty input.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// RMS energy of a waveform; 0.0 for empty input.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Short-time RMS energy over sliding frames.
///
/// The final partial frame is included so short signals still produce at
/// least one value.
pub fn frame_rms(samples: &[f32], frame_len: usize, hop_len: usize) -> Vec<f32> {
    if samples.is_empty() || frame_len == 0 || hop_len == 0 {
        return Vec::new();
    }

    let mut energies = Vec::with_capacity(samples.len() / hop_len + 1);
    let mut start = 0;
    while start < samples.len() {
        let end = (start + frame_len).min(samples.len());
        energies.push(rms(&samples[start..end]));
        if end == samples.len() {
            break;
        }
        start += hop_len;
    }
    energies
}

/// Percentile of a set of values via nearest-rank on the sorted copy.
///
/// `pct` is expressed in [0.0, 100.0]. Returns 0.0 for empty input.
pub fn percentile(values: &[f32], pct: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f32).round() as usize;
    sorted[rank]
}
