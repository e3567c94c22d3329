//! Statistical helpers shared by the trimmer, pitch tracker and corpus statistics

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation (divides by N)
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let var = data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    var.sqrt()
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// RMS of frames centred on multiples of `hop_length`.
///
/// Frames reaching past either end only see the samples that exist.
pub fn frame_rms(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f32> {
    if samples.is_empty() || frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    let half = frame_length / 2;
    let n_frames = samples.len() / hop_length + 1;

    (0..n_frames)
        .map(|i| {
            let center = i * hop_length;
            let start = center.saturating_sub(half);
            let end = (center + half).min(samples.len());
            if start >= end {
                return 0.0;
            }
            // Normalize by the full frame length, as zero padding would
            let sum_sq: f32 = samples[start..end].iter().map(|s| s * s).sum();
            (sum_sq / frame_length as f32).sqrt()
        })
        .collect()
}

/// Convert amplitude to dB (relative to 1.0)
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude > 1e-10 {
        20.0 * amplitude.log10()
    } else {
        -200.0
    }
}
