//! AAC-in-M4A/MP4 decoder, the path taken by enterprise-chat recordings.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{AudioDecoder, DecodeOutcome, absorb, canonical_path};
use crate::core::audio::{AudioError, CANONICAL_SAMPLE_RATE, dsp, wav};
use crate::core::format::DecodeFormat;

fn decode_to_canonical(source: &Path) -> Result<PathBuf, AudioError> {
    let file = File::open(source)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no decodable audio track".into()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut interleaved = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut channels = 1usize;
    let mut source_rate = CANONICAL_SAMPLE_RATE;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream surfaces as an I/O error from the demuxer.
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count().max(1);
                source_rate = spec.rate;

                let buf = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                });
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            // A malformed packet is skippable; the rest of the track may
            // still decode.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        }
    }

    if interleaved.is_empty() {
        return Err(AudioError::Decode("track contained no audio frames".into()));
    }

    let mono = dsp::downmix(&interleaved, channels);
    let samples = dsp::resample(&mono, source_rate, CANONICAL_SAMPLE_RATE)?;

    let out = canonical_path(source);
    wav::write_mono(&out, &samples, CANONICAL_SAMPLE_RATE)?;
    Ok(out)
}

/// Decoder for `.m4a`/`.aac`/`.mp4` recordings.
pub struct M4aAacDecoder;

impl AudioDecoder for M4aAacDecoder {
    fn format(&self) -> DecodeFormat {
        DecodeFormat::M4aAac
    }

    fn decode(&self, source: &Path) -> DecodeOutcome {
        absorb(self.format(), source, decode_to_canonical(source))
    }
}
