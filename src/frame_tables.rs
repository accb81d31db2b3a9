//! Per-variant speech frame sizes.
//!
//! Each of the 16 frame types maps to the number of speech bits it carries and
//! the number of filler bits that round the frame up to a whole octet in the
//! byte-aligned storage format. A zero bit length marks a frame type that
//! carries no decodable speech for that variant.

use crate::constants::FRAME_TYPE_COUNT;
use crate::packet_defs::CodecVariant;
use crate::types::FrameType;

/// Bit sizes of one frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    /// Speech bits carried on the wire.
    pub payload_bits: u16,
    /// Zero bits appended to reach an octet boundary.
    pub pad_bits: u16,
}

impl FrameSize {
    const fn new(payload_bits: u16, pad_bits: u16) -> Self {
        Self {
            payload_bits,
            pad_bits,
        }
    }

    /// False for reserved and "no data" frame types.
    #[inline]
    pub const fn is_supported(self) -> bool {
        self.payload_bits != 0
    }

    /// Whole octets occupied by the frame once padded.
    #[inline]
    pub const fn padded_octets(self) -> usize {
        (self.payload_bits as usize + self.pad_bits as usize).div_ceil(8)
    }
}

/// Frame sizes indexed by frame type.
pub type FrameSizeTable = [FrameSize; FRAME_TYPE_COUNT];

const UNUSED: FrameSize = FrameSize::new(0, 0);

/// AMR narrowband: modes 4.75 to 12.2 kbit/s, then the 39-bit comfort-noise row.
///
/// Frame type 9 (SID) has no row; it is only ever emitted as an expanded block.
pub static AMR_NB_FRAME_SIZES: FrameSizeTable = [
    FrameSize::new(95, 1),
    FrameSize::new(103, 1),
    FrameSize::new(118, 2),
    FrameSize::new(134, 2),
    FrameSize::new(148, 4),
    FrameSize::new(159, 1),
    FrameSize::new(204, 4),
    FrameSize::new(244, 4),
    FrameSize::new(39, 1),
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
];

/// AMR wideband: modes 6.60 to 23.85 kbit/s, then two 40-bit rows starting with SID.
pub static AMR_WB_FRAME_SIZES: FrameSizeTable = [
    FrameSize::new(132, 4),
    FrameSize::new(177, 7),
    FrameSize::new(253, 3),
    FrameSize::new(285, 3),
    FrameSize::new(317, 3),
    FrameSize::new(365, 3),
    FrameSize::new(397, 3),
    FrameSize::new(461, 3),
    FrameSize::new(477, 3),
    FrameSize::new(40, 0),
    FrameSize::new(40, 0),
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
    UNUSED,
];

/// Table for the given variant.
pub fn frame_size_table(variant: CodecVariant) -> &'static FrameSizeTable {
    match variant {
        CodecVariant::NarrowBand => &AMR_NB_FRAME_SIZES,
        CodecVariant::WideBand => &AMR_WB_FRAME_SIZES,
    }
}

/// Size entry for one frame type of a variant.
pub fn frame_size(variant: CodecVariant, frame_type: FrameType) -> FrameSize {
    frame_size_table(variant)[frame_type.index()]
}
