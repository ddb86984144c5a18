//! Audio buffers, decoding, WAV output and post-processing

pub mod buffer;
pub mod decoder;
pub mod enhance;
pub mod resample;
pub mod writer;

pub use buffer::AudioBuffer;
pub use decoder::{decode_file, probe_duration_secs};
pub use enhance::{enhance, PostProcessed, CLIP_LEVEL};
pub use writer::{write_wav_f32, write_wav_pcm16};
