//! Payload header and table-of-contents parsing.
//!
//! An RFC 3267 payload opens with a 4-bit codec mode request followed by a
//! chain of TOC entries, one per speech frame. Each entry carries a follow bit
//! (F) announcing another entry, the frame type (FT) and a quality flag (Q).
//! The chain ends at the first entry with F cleared.
//!
//! ```text
//!  bandwidth-efficient          octet-aligned
//!  +----+-+----+-+-..           +----+----+ +-+----+-+--+
//!  |CMR |F| FT |Q| ...          |CMR |RRRR| |F| FT |Q|PP| ...
//!  +----+-+----+-+-..           +----+----+ +-+----+-+--+
//! ```

use tracing::trace;

use crate::bit_cursor::BitCursor;
use crate::constants::{
    CMR_WIDTH_BITS, MAX_TOC_ENTRIES, TOC_ENTRY_BITS, TOC_FOLLOW_BIT_MASK, TOC_FRAME_TYPE_MASK,
    TOC_FRAME_TYPE_SHIFT, TOC_QUALITY_BIT_MASK,
};
use crate::error::AmrParsingError;
use crate::packet_defs::PayloadFormat;
use crate::types::{CodecModeRequest, FrameType};

/// One table-of-contents entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocEntry {
    /// Speech mode of the frame.
    pub frame_type: FrameType,
    /// F bit: another entry follows this one.
    pub follows_more: bool,
    /// Q bit: frame is not damaged.
    pub quality: bool,
}

impl TocEntry {
    /// Decodes the 6 meaningful TOC bits `F FT(4) Q` held in the low bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            frame_type: FrameType::from_bits((bits & TOC_FRAME_TYPE_MASK) >> TOC_FRAME_TYPE_SHIFT),
            follows_more: bits & TOC_FOLLOW_BIT_MASK != 0,
            quality: bits & TOC_QUALITY_BIT_MASK != 0,
        }
    }

    /// Storage-format header byte reconstructed from this entry.
    #[inline]
    pub const fn storage_header(&self) -> u8 {
        self.frame_type.storage_header(self.quality)
    }
}

/// Payload header and frame manifest of one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    /// Mode the sender asks the receiver to encode with.
    pub codec_mode_request: CodecModeRequest,
    /// Entries in transmission order, which is also output order.
    pub entries: Vec<TocEntry>,
}

impl TableOfContents {
    /// Number of silence descriptor entries in the manifest.
    pub fn silence_descriptor_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.frame_type.is_silence_descriptor())
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TocState {
    Scanning,
    Terminated,
}

/// Parses the payload header and the TOC chain, leaving `cursor` on the first
/// speech bit.
///
/// # Parameters
/// - `cursor`: Cursor positioned on the first bit of the RTP payload
/// - `format`: Wire layout negotiated for the stream
///
/// # Returns
/// - `Ok(TableOfContents)`: Mode request and at least one entry, the last with F cleared
/// - `Err(AmrParsingError)`: Header or chain runs out of bits, or the chain exceeds
///   [`MAX_TOC_ENTRIES`]
pub fn parse_toc(
    cursor: &mut BitCursor<'_>,
    format: PayloadFormat,
) -> Result<TableOfContents, AmrParsingError> {
    let header_bits = format.header_bits();
    if cursor.bits_remaining() < header_bits {
        return Err(AmrParsingError::IncompleteTocEntry {
            bits_needed: header_bits,
            bits_available: cursor.bits_remaining(),
        });
    }
    // The octet-aligned header pads the CMR with 4 reserved bits.
    let header = cursor.read_bits(header_bits)? >> (header_bits - CMR_WIDTH_BITS);
    let codec_mode_request = CodecModeRequest::from_bits(header as u8);

    let entry_bits = format.toc_entry_bits();
    let mut entries = Vec::new();
    let mut state = TocState::Scanning;

    while state == TocState::Scanning {
        if entries.len() >= MAX_TOC_ENTRIES {
            return Err(AmrParsingError::TocEntryLimitExceeded {
                limit: MAX_TOC_ENTRIES,
            });
        }
        let available = cursor.bits_remaining();
        if available == 0 {
            return Err(AmrParsingError::UnterminatedToc {
                entries: entries.len(),
            });
        }
        if available < entry_bits {
            return Err(AmrParsingError::IncompleteTocEntry {
                bits_needed: entry_bits,
                bits_available: available,
            });
        }

        // Octet-aligned entries carry two trailing padding bits.
        let raw = cursor.read_bits(entry_bits)? >> (entry_bits - TOC_ENTRY_BITS);
        let entry = TocEntry::from_bits(raw as u8);
        trace!(
            index = entries.len(),
            frame_type = entry.frame_type.value(),
            follows_more = entry.follows_more,
            quality = entry.quality,
            "toc entry"
        );
        entries.push(entry);

        if !entry.follows_more {
            state = TocState::Terminated;
        }
    }

    Ok(TableOfContents {
        codec_mode_request,
        entries,
    })
}
