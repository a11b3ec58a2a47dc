//! Opus-in-Ogg decoder, the path taken by messaging-app voice notes.
//!
//! libopus resamples internally to any of its supported rates, so packets are
//! decoded straight to 16 kHz; no separate resampling pass is needed.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ogg::PacketReader;
use opus::Channels;

use super::{AudioDecoder, DecodeOutcome, absorb, canonical_path};
use crate::core::audio::{AudioError, CANONICAL_SAMPLE_RATE, dsp, wav};
use crate::core::format::DecodeFormat;

/// Maximum Opus frame length is 120 ms; at 16 kHz that is 1920 samples per
/// channel. Sized for stereo with headroom.
const MAX_FRAME_SAMPLES: usize = 1920 * 2;

/// Fields of the OpusHead identification header this decoder needs.
struct OpusHead {
    channels: u8,
    /// Samples to drop from the start of the decoded stream, in 48 kHz units.
    pre_skip: u16,
}

fn parse_opus_head(packet: &[u8]) -> Result<OpusHead, AudioError> {
    if packet.len() < 12 || &packet[..8] != b"OpusHead" {
        return Err(AudioError::Decode(
            "missing OpusHead identification header".into(),
        ));
    }

    let channels = packet[9];
    if channels == 0 || channels > 2 {
        return Err(AudioError::UnsupportedLayout(format!(
            "unsupported Opus channel count {channels}"
        )));
    }

    Ok(OpusHead {
        channels,
        pre_skip: u16::from_le_bytes([packet[10], packet[11]]),
    })
}

fn decode_to_canonical(source: &Path) -> Result<PathBuf, AudioError> {
    let file = BufReader::new(File::open(source)?);
    let mut packets = PacketReader::new(file);

    let head_packet = packets
        .read_packet()
        .map_err(|e| AudioError::Decode(e.to_string()))?
        .ok_or_else(|| AudioError::Decode("empty Ogg stream".into()))?;
    let head = parse_opus_head(&head_packet.data)?;

    // The second header packet (OpusTags) carries no audio.
    packets
        .read_packet()
        .map_err(|e| AudioError::Decode(e.to_string()))?
        .ok_or_else(|| AudioError::Decode("truncated Ogg stream".into()))?;

    let channels = head.channels as usize;
    let mut decoder = opus::Decoder::new(
        CANONICAL_SAMPLE_RATE,
        if channels == 2 {
            Channels::Stereo
        } else {
            Channels::Mono
        },
    )
    .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut interleaved = Vec::new();
    let mut frame = vec![0.0f32; MAX_FRAME_SAMPLES];

    while let Some(packet) = packets
        .read_packet()
        .map_err(|e| AudioError::Decode(e.to_string()))?
    {
        let decoded = decoder
            .decode_float(&packet.data, &mut frame, false)
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        interleaved.extend_from_slice(&frame[..decoded * channels]);
    }

    let mut samples = dsp::downmix(&interleaved, channels);

    // Pre-skip is declared at 48 kHz; scale it to the decode rate.
    let pre_skip = head.pre_skip as usize * CANONICAL_SAMPLE_RATE as usize / 48_000;
    if pre_skip < samples.len() {
        samples.drain(..pre_skip);
    } else {
        samples.clear();
    }

    if samples.is_empty() {
        return Err(AudioError::Decode("Ogg stream contained no audio".into()));
    }

    let out = canonical_path(source);
    wav::write_mono(&out, &samples, CANONICAL_SAMPLE_RATE)?;
    Ok(out)
}

/// Decoder for `.ogg`/`.opus` voice notes.
pub struct OggOpusDecoder;

impl AudioDecoder for OggOpusDecoder {
    fn format(&self) -> DecodeFormat {
        DecodeFormat::OggOpus
    }

    fn decode(&self, source: &Path) -> DecodeOutcome {
        absorb(self.format(), source, decode_to_canonical(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opus_head_parsing() {
        let mut packet = Vec::new();
        packet.extend_from_slice(b"OpusHead");
        packet.push(1); // version
        packet.push(1); // channels
        packet.extend_from_slice(&312u16.to_le_bytes()); // pre-skip
        let head = parse_opus_head(&packet).unwrap();
        assert_eq!(head.channels, 1);
        assert_eq!(head.pre_skip, 312);
    }

    #[test]
    fn test_opus_head_rejects_garbage() {
        assert!(parse_opus_head(b"NotOpus!").is_err());
        assert!(parse_opus_head(b"").is_err());

        let mut packet = Vec::new();
        packet.extend_from_slice(b"OpusHead");
        packet.push(1);
        packet.push(6); // surround layouts are out of scope
        packet.extend_from_slice(&0u16.to_le_bytes());
        assert!(parse_opus_head(&packet).is_err());
    }

    #[test]
    fn test_non_ogg_file_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("note.ogg");
        std::fs::write(&source, vec![0u8; 256]).unwrap();

        let outcome = OggOpusDecoder.decode(&source);
        assert!(!outcome.is_converted());
        assert_eq!(outcome.path, source);
    }
}
