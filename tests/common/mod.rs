//! Common test utilities for AMR depacketizer integration tests.
//!
//! Builds synthetic RFC 3267 payloads bit by bit so tests can state the frames
//! they send and compare the depacketizer's output against the storage-format
//! bytes those frames must produce.

#![allow(dead_code)]

use amrdepay::frame_tables::frame_size;
use amrdepay::{
    AmrDepacketizer, CodecVariant, FramePacking, FrameType, PayloadConfig, PayloadFormat,
};

/// MSB-first bit writer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    /// Pushes the low `count` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u32, count: usize) {
        for shift in (0..count).rev() {
            self.push_bit((value >> shift) & 1 != 0);
        }
    }

    /// Pushes the first `bit_count` bits of `bytes`.
    pub fn push_leading_bits(&mut self, bytes: &[u8], bit_count: usize) {
        for i in 0..bit_count {
            self.push_bit(bytes[i / 8] & (0x80 >> (i % 8)) != 0);
        }
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the bytes written, the last one zero-filled.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// One frame a test sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFrame {
    pub frame_type: u8,
    pub quality: bool,
    /// Speech bits padded to whole octets with zero filler.
    pub speech: Vec<u8>,
}

impl TestFrame {
    /// Creates a frame of `frame_type` filled with a deterministic pattern.
    pub fn new(variant: CodecVariant, frame_type: u8, seed: u8) -> Self {
        let size = frame_size(variant, FrameType::new(frame_type));
        let mut speech: Vec<u8> = (0..size.padded_octets())
            .map(|i| seed.wrapping_mul(31).wrapping_add((i as u8).wrapping_mul(73)) ^ 0x5A)
            .collect();
        if let Some(last) = speech.last_mut() {
            *last &= 0xFFu8 << size.pad_bits;
        }
        Self {
            frame_type,
            quality: true,
            speech,
        }
    }

    pub fn with_quality(mut self, quality: bool) -> Self {
        self.quality = quality;
        self
    }

    /// Storage-format bytes the depacketizer must emit for this frame.
    pub fn storage_bytes(&self) -> Vec<u8> {
        let mut out = vec![(self.frame_type << 3) | if self.quality { 0x04 } else { 0 }];
        out.extend_from_slice(&self.speech);
        out
    }
}

/// Packs `frames` into an RFC 3267 payload, each frame followed by its filler bits.
pub fn build_payload(
    variant: CodecVariant,
    format: PayloadFormat,
    codec_mode_request: u8,
    frames: &[TestFrame],
) -> Vec<u8> {
    build_payload_with_packing(variant, format, FramePacking::Padded, codec_mode_request, frames)
}

/// Packs `frames` into an RFC 3267 payload using `packing` for
/// bandwidth-efficient frames.
pub fn build_payload_with_packing(
    variant: CodecVariant,
    format: PayloadFormat,
    packing: FramePacking,
    codec_mode_request: u8,
    frames: &[TestFrame],
) -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.push_bits(u32::from(codec_mode_request), 4);
    if format == PayloadFormat::OctetAligned {
        writer.push_bits(0, 4);
    }

    for (i, frame) in frames.iter().enumerate() {
        writer.push_bit(i + 1 < frames.len());
        writer.push_bits(u32::from(frame.frame_type), 4);
        writer.push_bit(frame.quality);
        if format == PayloadFormat::OctetAligned {
            writer.push_bits(0, 2);
        }
    }

    for frame in frames {
        let size = frame_size(variant, FrameType::new(frame.frame_type));
        if format.pads_frames_on_wire(packing) {
            writer.push_leading_bits(&frame.speech, frame.speech.len() * 8);
        } else {
            writer.push_leading_bits(&frame.speech, size.payload_bits as usize);
        }
    }
    writer.into_bytes()
}

/// Concatenated storage-format bytes for `frames`.
pub fn expected_storage(frames: &[TestFrame]) -> Vec<u8> {
    frames.iter().flat_map(TestFrame::storage_bytes).collect()
}

/// The 61-byte block emitted for an expanded SID frame.
pub fn expanded_sid_block() -> Vec<u8> {
    let mut block = vec![0u8; 61];
    block[0] = 0x44;
    block
}

/// Depacketizer with default policy for `variant` and `format`.
pub fn depacketizer(variant: CodecVariant, format: PayloadFormat) -> AmrDepacketizer {
    depacketizer_with_packing(variant, format, FramePacking::Padded)
}

/// Depacketizer with default policy reading frames with `packing`.
pub fn depacketizer_with_packing(
    variant: CodecVariant,
    format: PayloadFormat,
    packing: FramePacking,
) -> AmrDepacketizer {
    let config = PayloadConfig::default()
        .with_octet_aligned(format == PayloadFormat::OctetAligned)
        .with_frame_packing(packing);
    AmrDepacketizer::new(variant, config).expect("default configuration is supported")
}
