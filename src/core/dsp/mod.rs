//! Digital Signal Processing utilities

pub mod fft;
pub mod stats;

pub use fft::Autocorrelator;
pub use stats::{amplitude_to_db, frame_rms, mean, rms, std_dev};
