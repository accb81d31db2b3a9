//! AMR stream and payload format definitions.
//!
//! Defines the codec variant negotiated for a stream and the RFC 3267 wire
//! layout used by its payloads.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Codec variant carried by a stream.
///
/// Selects the frame size table used to walk payloads and the RTP clock
/// parameters of the stream. Fixed once the session is negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecVariant {
    /// AMR narrowband (encoding name `AMR`, 8 kHz).
    NarrowBand,
    /// AMR wideband (encoding name `AMR-WB`, 16 kHz).
    WideBand,
}

impl CodecVariant {
    /// Resolves a variant from an RTP encoding name, case-insensitively.
    ///
    /// # Returns
    /// `None` for any encoding other than `AMR` or `AMR-WB`.
    pub fn from_encoding_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(AMR_NB_ENCODING_NAME) {
            Some(CodecVariant::NarrowBand)
        } else if name.eq_ignore_ascii_case(AMR_WB_ENCODING_NAME) {
            Some(CodecVariant::WideBand)
        } else {
            None
        }
    }

    /// RTP encoding name as it appears in an `rtpmap` attribute.
    pub const fn encoding_name(self) -> &'static str {
        match self {
            CodecVariant::NarrowBand => AMR_NB_ENCODING_NAME,
            CodecVariant::WideBand => AMR_WB_ENCODING_NAME,
        }
    }

    /// RTP timestamp clock rate in Hz.
    pub const fn clock_rate(self) -> u32 {
        match self {
            CodecVariant::NarrowBand => AMR_NB_CLOCK_RATE,
            CodecVariant::WideBand => AMR_WB_CLOCK_RATE,
        }
    }

    /// Samples (RTP timestamp ticks) covered by one 20 ms speech frame.
    pub const fn samples_per_frame(self) -> u32 {
        match self {
            CodecVariant::NarrowBand => AMR_NB_SAMPLES_PER_FRAME,
            CodecVariant::WideBand => AMR_WB_SAMPLES_PER_FRAME,
        }
    }

    /// Magic that opens a storage-format file of this variant.
    pub const fn storage_magic(self) -> &'static [u8] {
        match self {
            CodecVariant::NarrowBand => AMR_NB_FILE_MAGIC,
            CodecVariant::WideBand => AMR_WB_FILE_MAGIC,
        }
    }
}

/// RFC 3267 wire layout of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadFormat {
    /// Header, TOC entries and frames each padded to whole octets.
    OctetAligned,
    /// Header, TOC entries and frames packed back to back at bit granularity.
    BandwidthEfficient,
}

impl PayloadFormat {
    /// Bits of payload header preceding the first TOC entry.
    pub const fn header_bits(self) -> usize {
        match self {
            PayloadFormat::OctetAligned => OCTET_ALIGNED_HEADER_BITS,
            PayloadFormat::BandwidthEfficient => BANDWIDTH_EFFICIENT_HEADER_BITS,
        }
    }

    /// Bits consumed per TOC entry on the wire.
    pub const fn toc_entry_bits(self) -> usize {
        match self {
            PayloadFormat::OctetAligned => OCTET_ALIGNED_TOC_ENTRY_BITS,
            PayloadFormat::BandwidthEfficient => TOC_ENTRY_BITS,
        }
    }

    /// Whether frame padding is present on the wire and must be skipped.
    ///
    /// Octet-aligned frames are always padded. Bandwidth-efficient frames are
    /// padded unless `packing` is [`FramePacking::Contiguous`].
    pub const fn pads_frames_on_wire(self, packing: FramePacking) -> bool {
        match self {
            PayloadFormat::OctetAligned => true,
            PayloadFormat::BandwidthEfficient => matches!(packing, FramePacking::Padded),
        }
    }
}

/// Placement of speech frames after a bandwidth-efficient TOC.
///
/// Has no effect on octet-aligned payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FramePacking {
    /// Each frame's filler bits follow it on the wire and are read past.
    #[default]
    Padded,
    /// Frames follow each other with no filler; the next frame starts on the
    /// bit after the last speech bit.
    Contiguous,
}

impl From<bool> for PayloadFormat {
    /// Maps the negotiated `octet-align` flag onto a wire layout.
    fn from(octet_aligned: bool) -> Self {
        if octet_aligned {
            PayloadFormat::OctetAligned
        } else {
            PayloadFormat::BandwidthEfficient
        }
    }
}
