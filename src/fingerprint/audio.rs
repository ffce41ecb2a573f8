//! Audio fingerprinting.
//!
//! Files are decoded with symphonia at their native sample rate and
//! downmixed to mono. The fingerprint is the mean MFCC vector (see
//! [`super::mfcc`]) serialised as the hex of its little-endian `f32`
//! values. Two tracks group only when those 13 values are bit-identical.

use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::mfcc::{MfccExtractor, N_MFCC};
use super::{FingerprintError, FingerprintStrategy};

/// Decoded mono signal.
#[derive(Debug, Clone)]
pub struct MonoSignal {
    /// Samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    /// Native sample rate in Hz
    pub sample_rate: u32,
}

/// Decode an audio file to a mono `f32` signal.
///
/// Packets that fail to decode are skipped; any other decoder error
/// fails the file.
///
/// # Errors
///
/// Returns `FingerprintError::Io` if the file cannot be opened and
/// `FingerprintError::Decode` if no audio track can be decoded.
pub fn decode_mono(path: &Path) -> Result<MonoSignal, FingerprintError> {
    let file = File::open(path).map_err(|e| FingerprintError::io(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| FingerprintError::decode(path, format!("unrecognised audio format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| FingerprintError::decode(path, "no audio track found"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| FingerprintError::decode(path, format!("unsupported codec: {e}")))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(FingerprintError::decode(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping bad packet in {}: {}", path.display(), msg);
                continue;
            }
            Err(e) => return Err(FingerprintError::decode(path, e)),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        let channels = spec.channels.count().max(1);

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    let sample_rate = sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| FingerprintError::decode(path, "unknown sample rate"))?;
    if samples.is_empty() {
        return Err(FingerprintError::decode(path, "no audio samples"));
    }

    Ok(MonoSignal {
        samples,
        sample_rate,
    })
}

/// Serialise an MFCC vector as hex of its little-endian `f32` bytes.
#[must_use]
pub fn encode_features(features: &[f32; N_MFCC]) -> String {
    let bytes: Vec<u8> = features.iter().flat_map(|v| v.to_le_bytes()).collect();
    hex::encode(bytes)
}

/// Mean-MFCC audio fingerprint strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioFingerprinter;

impl AudioFingerprinter {
    /// Create a new audio fingerprinter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decode a file and compute its mean MFCC vector.
    ///
    /// # Errors
    ///
    /// Propagates decode failures from [`decode_mono`].
    pub fn features(&self, path: &Path) -> Result<[f32; N_MFCC], FingerprintError> {
        let signal = decode_mono(path)?;
        log::trace!(
            "Decoded {} samples at {} Hz from {}",
            signal.samples.len(),
            signal.sample_rate,
            path.display()
        );
        MfccExtractor::new(signal.sample_rate)
            .mean_mfcc(&signal.samples)
            .ok_or_else(|| FingerprintError::decode(path, "no audio frames"))
    }
}

impl FingerprintStrategy for AudioFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let features = self.features(path)?;
        Ok(encode_features(&features))
    }
}
