// src/core/decoder.rs
//
// Audio loading: Symphonia decoding, mono mix-down and Rubato resampling
// to the analysis sample rate.

use std::fs::File;
use std::path::Path;

use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{MetawaveError, Result};

/// Frames fed to the resampler per call
const RESAMPLE_CHUNK: usize = 1024;

/// Decoded interleaved audio as stored in the file
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

/// Mono samples at a known rate
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> MetawaveError {
    MetawaveError::AudioDecode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Load an audio file as mono at `target_rate`, resampling if needed
pub fn load_audio(path: &Path, target_rate: u32) -> Result<AudioBuffer> {
    let audio = decode_audio(path)?;
    let mono = AudioBuffer::new(extract_mono(&audio), audio.sample_rate);
    if mono.sample_rate != target_rate {
        debug!(
            "Resampling {} from {} Hz to {} Hz",
            path.display(),
            mono.sample_rate,
            target_rate
        );
    }
    resample(&mono, target_rate).map_err(|e| decode_error(path, e))
}

/// Decode audio file to floating-point samples
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let file = File::open(path).map_err(|e| MetawaveError::io_error(path, e))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| decode_error(path, format!("unsupported or corrupted file: {}", e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error(path, "no supported audio track found"))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_error(path, "file does not specify a sample rate"))?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    if channels == 0 {
        return Err(decode_error(path, "file reports 0 audio channels"));
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(path, format!("no decoder for codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(decode_error(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(decode_error(path, e)),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;
            sample_buf = Some(SampleBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Average all channels into one
pub fn extract_mono(audio: &AudioData) -> Vec<f32> {
    if audio.channels == 1 {
        return audio.samples.clone();
    }

    audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| frame.iter().sum::<f32>() / audio.channels as f32)
        .collect()
}

/// Sinc-resample mono audio to `target_rate`
pub fn resample(audio: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if audio.sample_rate == target_rate || audio.samples.is_empty() {
        return Ok(AudioBuffer::new(audio.samples.clone(), target_rate));
    }

    let resample_error = |reason: String| MetawaveError::Resample {
        from: audio.sample_rate,
        to: target_rate,
        reason,
    };
    if target_rate == 0 || audio.sample_rate == 0 {
        return Err(resample_error("sample rates must be positive".to_string()));
    }

    let ratio = target_rate as f64 / audio.sample_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| resample_error(format!("failed to create resampler: {}", e)))?;

    let input = &audio.samples;
    let expected = (input.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK);

    let mut pos = 0;
    while pos + RESAMPLE_CHUNK <= input.len() {
        let wave_in: [&[f32]; 1] = [&input[pos..pos + RESAMPLE_CHUNK]];
        let chunk = resampler
            .process(&wave_in[..], None)
            .map_err(|e| resample_error(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
        pos += RESAMPLE_CHUNK;
    }

    if pos < input.len() {
        let wave_in: [&[f32]; 1] = [&input[pos..]];
        let chunk = resampler
            .process_partial(Some(&wave_in[..]), None)
            .map_err(|e| resample_error(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter delay
    while output.len() < expected + delay {
        let chunk = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| resample_error(e.to_string()))?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    let start = delay.min(output.len());
    let mut samples = output.split_off(start);
    samples.truncate(expected);

    Ok(AudioBuffer::new(samples, target_rate))
}
