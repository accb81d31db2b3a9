//! Speech frame re-packing into the byte-aligned storage format.
//!
//! Assembly runs in two passes over a parsed [`TableOfContents`]. The size pass
//! validates every entry against the variant's frame table and computes the
//! exact output length, so the buffer is allocated once and nothing is emitted
//! for a packet that will be rejected. The emission pass then copies each
//! frame's speech bits from the [`BitCursor`] into whole octets behind a
//! reconstructed storage-format header byte.
//!
//! Silence descriptor frames in bandwidth-efficient payloads may be replaced by
//! a fixed block; the [`SilencePolicy`] installed on the assembler decides.

use std::fmt;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::bit_cursor::BitCursor;
use crate::constants::{
    LEGACY_SID_GROWTH_BYTES, SID_EXPANSION_BLOCK_LEN, SID_EXPANSION_MARKER,
};
use crate::error::{AmrError, AmrParsingError};
use crate::frame_tables::{FrameSize, frame_size};
use crate::packet_defs::{CodecVariant, FramePacking, PayloadFormat};
use crate::toc::{TableOfContents, TocEntry};
use crate::types::{CodecModeRequest, FrameType};

const EXPANDED_SID_BLOCK: [u8; SID_EXPANSION_BLOCK_LEN] = {
    let mut block = [0u8; SID_EXPANSION_BLOCK_LEN];
    block[0] = SID_EXPANSION_MARKER;
    block
};

/// Output-side handling of silence descriptor frames.
///
/// Consulted only for bandwidth-efficient payloads. The frame's wire bits are
/// always consumed; a returned block is emitted in place of the storage-format
/// header and speech octets.
pub trait SilencePolicy: fmt::Debug + Send + Sync {
    /// Returns the block replacing `entry`, or `None` to emit the frame as-is.
    fn replacement_block(&self, entry: &TocEntry, variant: CodecVariant) -> Option<&[u8]>;
}

/// Expands every SID frame into `0x44` followed by 60 zero bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandSilenceFrames;

impl SilencePolicy for ExpandSilenceFrames {
    fn replacement_block(&self, entry: &TocEntry, _variant: CodecVariant) -> Option<&[u8]> {
        entry
            .frame_type
            .is_silence_descriptor()
            .then_some(&EXPANDED_SID_BLOCK[..])
    }
}

/// Emits SID frames like any other frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepSilenceFrames;

impl SilencePolicy for KeepSilenceFrames {
    fn replacement_block(&self, _entry: &TocEntry, _variant: CodecVariant) -> Option<&[u8]> {
        None
    }
}

/// Location and provenance of one emitted frame inside the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Frame type announced by the TOC entry.
    pub frame_type: FrameType,
    /// Quality flag announced by the TOC entry.
    pub quality: bool,
    /// Byte offset of the frame in the output.
    pub offset: usize,
    /// Bytes emitted for the frame, header byte included.
    pub len: usize,
    /// Frame was replaced by the silence policy's block.
    pub silence_substituted: bool,
    /// Payload ended before all of the frame's speech bits were read.
    pub truncated: bool,
}

/// Byte-aligned storage-format frames recovered from one RTP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepacketizedPayload {
    codec_mode_request: CodecModeRequest,
    data: Bytes,
    frames: Vec<FrameDescriptor>,
}

impl DepacketizedPayload {
    /// Codec mode request carried in the payload header.
    pub fn codec_mode_request(&self) -> CodecModeRequest {
        self.codec_mode_request
    }

    /// All emitted frames, back to back.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the payload, returning the contiguous frame buffer.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Per-frame descriptors in output order.
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    /// Number of emitted frames; equals the number of TOC entries.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Bytes of the frame at `index`, header byte included.
    pub fn frame_bytes(&self, index: usize) -> Option<&[u8]> {
        let frame = self.frames.get(index)?;
        self.data.get(frame.offset..frame.offset + frame.len)
    }

    /// Iterates over each frame's bytes in output order.
    pub fn iter_frames(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.frames
            .iter()
            .map(|frame| &self.data[frame.offset..frame.offset + frame.len])
    }

    /// Frames cut short by the end of the payload.
    ///
    /// Non-zero means the packet decoded but lost speech bits; callers doing an
    /// integrity check should treat it as a [`crate::ErrorKind::Truncated`] signal.
    pub fn truncated_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.truncated).count()
    }

    /// Frames replaced by the silence policy.
    pub fn silence_substituted_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame.silence_substituted)
            .count()
    }

    /// Total output length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no bytes were emitted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Packs single bits into octets, MSB first.
struct OctetPacker<'a> {
    out: &'a mut Vec<u8>,
    pending: u8,
    filled: u8,
}

impl<'a> OctetPacker<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            out,
            pending: 0,
            filled: 0,
        }
    }

    #[inline]
    fn push_bit(&mut self, bit: bool) {
        self.pending = (self.pending << 1) | u8::from(bit);
        self.filled += 1;
        if self.filled == 8 {
            self.out.push(self.pending);
            self.pending = 0;
            self.filled = 0;
        }
    }

    /// Zero-fills and emits a partially filled octet.
    fn flush(&mut self) {
        if self.filled > 0 {
            self.out.push(self.pending << (8 - self.filled));
            self.pending = 0;
            self.filled = 0;
        }
    }

    fn is_aligned(&self) -> bool {
        self.filled == 0
    }
}

/// Re-packs the frames of one payload behind storage-format header bytes.
#[derive(Debug, Clone, Copy)]
pub struct FrameAssembler<'p> {
    variant: CodecVariant,
    format: PayloadFormat,
    packing: FramePacking,
    silence_policy: &'p dyn SilencePolicy,
}

impl<'p> FrameAssembler<'p> {
    /// Creates an assembler for one stream's variant, layout and silence policy.
    pub fn new(
        variant: CodecVariant,
        format: PayloadFormat,
        silence_policy: &'p dyn SilencePolicy,
    ) -> Self {
        Self {
            variant,
            format,
            packing: FramePacking::Padded,
            silence_policy,
        }
    }

    /// Returns a copy reading bandwidth-efficient frames with `packing`.
    pub fn with_frame_packing(mut self, packing: FramePacking) -> Self {
        self.packing = packing;
        self
    }

    /// Bits a frame occupies on the wire.
    fn wire_bits(&self, size: FrameSize) -> usize {
        if self.format.pads_frames_on_wire(self.packing) {
            size.payload_bits as usize + size.pad_bits as usize
        } else {
            size.payload_bits as usize
        }
    }

    fn replacement_for(&self, entry: &TocEntry) -> Option<&'p [u8]> {
        match self.format {
            PayloadFormat::BandwidthEfficient => {
                self.silence_policy.replacement_block(entry, self.variant)
            }
            PayloadFormat::OctetAligned => None,
        }
    }

    fn supported_size(&self, entry: &TocEntry) -> Result<FrameSize, AmrParsingError> {
        let size = frame_size(self.variant, entry.frame_type);
        if !size.is_supported() {
            return Err(AmrParsingError::InvalidFrameType {
                frame_type: entry.frame_type,
                variant: self.variant,
            });
        }
        Ok(size)
    }

    /// Exact number of bytes [`FrameAssembler::assemble`] emits for `toc` when
    /// no frame is truncated.
    ///
    /// # Errors
    /// - [`AmrParsingError::InvalidFrameType`] - An entry names a frame type with
    ///   no frame size for this variant
    pub fn output_len(&self, toc: &TableOfContents) -> Result<usize, AmrParsingError> {
        toc.entries.iter().try_fold(0usize, |total, entry| {
            let entry_len = match self.replacement_for(entry) {
                Some(block) => block.len(),
                None => 1 + self.supported_size(entry)?.padded_octets(),
            };
            Ok(total + entry_len)
        })
    }

    /// Emits every frame of `toc`, reading speech bits from `cursor`.
    ///
    /// `cursor` must sit on the first speech bit, as left by
    /// [`crate::toc::parse_toc`]. A frame whose bits run past the end of the
    /// payload is emitted short and flagged in its [`FrameDescriptor`].
    ///
    /// # Errors
    /// - [`AmrError::Parsing`] - An entry names an unsupported frame type; nothing
    ///   is emitted
    /// - [`AmrError::OutOfMemory`] - The output buffer could not be reserved
    pub fn assemble(
        &self,
        cursor: &mut BitCursor<'_>,
        toc: &TableOfContents,
    ) -> Result<DepacketizedPayload, AmrError> {
        let output_len = self.output_len(toc)?;
        let mut out = Vec::new();
        out.try_reserve_exact(output_len)
            .map_err(|_| AmrError::OutOfMemory {
                requested: output_len,
            })?;

        let mut frames = Vec::with_capacity(toc.entries.len());
        for entry in &toc.entries {
            let offset = out.len();
            let descriptor = match self.replacement_for(entry) {
                Some(block) => {
                    let size = frame_size(self.variant, entry.frame_type);
                    let skipped = cursor.skip_bits(self.wire_bits(size));
                    out.extend_from_slice(block);
                    FrameDescriptor {
                        frame_type: entry.frame_type,
                        quality: entry.quality,
                        offset,
                        len: block.len(),
                        silence_substituted: true,
                        truncated: skipped < size.payload_bits as usize,
                    }
                }
                None => {
                    let size = self.supported_size(entry)?;
                    let truncated = self.emit_frame(cursor, entry, size, &mut out);
                    FrameDescriptor {
                        frame_type: entry.frame_type,
                        quality: entry.quality,
                        offset,
                        len: out.len() - offset,
                        silence_substituted: false,
                        truncated,
                    }
                }
            };

            if descriptor.truncated {
                warn!(
                    frame_type = entry.frame_type.value(),
                    bit_position = cursor.bit_position(),
                    "AMR frame truncated by end of payload"
                );
            }
            trace!(
                frame_type = entry.frame_type.value(),
                offset = descriptor.offset,
                len = descriptor.len,
                substituted = descriptor.silence_substituted,
                "emitted frame"
            );
            frames.push(descriptor);
        }

        Ok(DepacketizedPayload {
            codec_mode_request: toc.codec_mode_request,
            data: Bytes::from(out),
            frames,
        })
    }

    /// Emits header byte, speech octets and filler for one frame.
    ///
    /// Returns `true` when the payload ran out before all speech bits were read.
    fn emit_frame(
        &self,
        cursor: &mut BitCursor<'_>,
        entry: &TocEntry,
        size: FrameSize,
        out: &mut Vec<u8>,
    ) -> bool {
        out.push(entry.storage_header());
        let mut packer = OctetPacker::new(out);

        for _ in 0..size.payload_bits {
            if cursor.exhausted() {
                packer.flush();
                return true;
            }
            match cursor.read_bit() {
                Ok(bit) => packer.push_bit(bit),
                Err(_) => {
                    packer.flush();
                    return true;
                }
            }
        }

        for _ in 0..size.pad_bits {
            packer.push_bit(false);
        }
        if self.format.pads_frames_on_wire(self.packing) {
            cursor.skip_bits(size.pad_bits as usize);
        }

        debug_assert!(
            packer.is_aligned(),
            "frame type {} does not pad to an octet boundary",
            entry.frame_type
        );
        false
    }
}

/// Output size a caller would reserve using the historical estimate.
///
/// Bandwidth-efficient payloads are estimated at `declared_len + 55` bytes per
/// SID entry, octet-aligned payloads at `declared_len - 1`. The estimate can
/// undershoot the bytes actually emitted; [`FrameAssembler::output_len`] is exact.
pub fn legacy_output_estimate(
    format: PayloadFormat,
    declared_len: usize,
    silence_descriptor_count: usize,
) -> usize {
    match format {
        PayloadFormat::BandwidthEfficient => {
            declared_len + LEGACY_SID_GROWTH_BYTES * silence_descriptor_count
        }
        PayloadFormat::OctetAligned => declared_len.saturating_sub(1),
    }
}
