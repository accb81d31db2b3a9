//! RFC 3267 payload constants and bitmasks.
//!
//! Wire-layout widths for both payload formats, RTP parameters of the two codec
//! variants, and the fixed block used when silence descriptor frames are expanded.

// --- Payload Header (RFC 3267, Sec 4.3.1 / 4.4.1) ---

/// Width of the codec mode request field that opens every payload.
pub const CMR_WIDTH_BITS: usize = 4;
/// Octet-aligned mode pads the CMR field to a full octet.
pub const OCTET_ALIGNED_HEADER_BITS: usize = 8;
/// Bandwidth-efficient mode carries the bare CMR field.
pub const BANDWIDTH_EFFICIENT_HEADER_BITS: usize = CMR_WIDTH_BITS;

// --- Table of Contents (RFC 3267, Sec 4.3.2 / 4.4.2) ---

/// Meaningful TOC bits: F(1) FT(4) Q(1).
pub const TOC_ENTRY_BITS: usize = 6;
/// Octet-aligned TOC entries carry two trailing padding bits.
pub const OCTET_ALIGNED_TOC_ENTRY_BITS: usize = 8;
/// Mask for the follow (F) bit in a 6-bit TOC entry.
pub const TOC_FOLLOW_BIT_MASK: u8 = 0b10_0000;
/// Mask for the frame type (FT) field in a 6-bit TOC entry.
pub const TOC_FRAME_TYPE_MASK: u8 = 0b01_1110;
/// Shift of the frame type field inside a 6-bit TOC entry.
pub const TOC_FRAME_TYPE_SHIFT: u8 = 1;
/// Mask for the quality (Q) bit in a 6-bit TOC entry.
pub const TOC_QUALITY_BIT_MASK: u8 = 0b00_0001;

/// Hard cap on TOC entries per payload; guards against all-F-bit packets.
pub const MAX_TOC_ENTRIES: usize = 255;

/// Number of frame types addressable by the 4-bit FT field.
pub const FRAME_TYPE_COUNT: usize = 16;

// --- Silence Descriptor Expansion ---

/// Header byte of the expanded silence block.
pub const SID_EXPANSION_MARKER: u8 = 0x44;
/// Zero bytes following the marker in the expanded silence block.
pub const SID_EXPANSION_FILL_LEN: usize = 60;
/// Total length of the expanded silence block.
pub const SID_EXPANSION_BLOCK_LEN: usize = 1 + SID_EXPANSION_FILL_LEN;
/// Net growth per SID entry used by the historical allocation estimate.
pub const LEGACY_SID_GROWTH_BYTES: usize = 55;

// --- RTP / Storage Parameters ---

/// RTP clock rate of AMR narrowband.
pub const AMR_NB_CLOCK_RATE: u32 = 8_000;
/// RTP clock rate of AMR wideband.
pub const AMR_WB_CLOCK_RATE: u32 = 16_000;
/// Samples in one 20 ms AMR narrowband frame.
pub const AMR_NB_SAMPLES_PER_FRAME: u32 = 160;
/// Samples in one 20 ms AMR wideband frame.
pub const AMR_WB_SAMPLES_PER_FRAME: u32 = 320;

/// RTP encoding name of AMR narrowband.
pub const AMR_NB_ENCODING_NAME: &str = "AMR";
/// RTP encoding name of AMR wideband.
pub const AMR_WB_ENCODING_NAME: &str = "AMR-WB";

/// Storage-format file magic for AMR narrowband (RFC 4867, Sec 5.1).
pub const AMR_NB_FILE_MAGIC: &[u8] = b"#!AMR\n";
/// Storage-format file magic for AMR wideband (RFC 4867, Sec 5.1).
pub const AMR_WB_FILE_MAGIC: &[u8] = b"#!AMR-WB\n";

// --- Session Description Attributes (RFC 3267, Sec 8.1) ---

/// `fmtp` parameter selecting the octet-aligned payload format.
pub const FMTP_OCTET_ALIGN: &str = "octet-align";
/// `fmtp` parameter enabling frame CRCs.
pub const FMTP_CRC: &str = "crc";
/// `fmtp` parameter enabling frame interleaving.
pub const FMTP_INTERLEAVING: &str = "interleaving";
/// `fmtp` parameter carrying the channel count.
pub const FMTP_CHANNELS: &str = "channels";
