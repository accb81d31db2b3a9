//! AMR depacketizer error types and utilities.
//!
//! This module defines the error types used throughout the crate. It separates
//! packet-level parsing failures from session-level configuration failures,
//! and consolidates both under [`AmrError`]. The `thiserror` crate is used for
//! ergonomic error definitions.

use thiserror::Error;

use crate::packet_defs::CodecVariant;
use crate::types::FrameType;

/// Errors raised while walking a single RTP payload.
///
/// Any of these rejects the whole packet; no partial output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmrParsingError {
    /// Payload carried no bytes at all.
    #[error("Empty AMR payload")]
    EmptyPayload,

    /// Payload ended before the TOC chain was terminated by a cleared F bit.
    #[error("TOC chain not terminated after {entries} entries")]
    UnterminatedToc { entries: usize },

    /// TOC chain exceeded the per-packet entry cap.
    #[error("TOC chain exceeds limit of {limit} entries")]
    TocEntryLimitExceeded { limit: usize },

    /// Payload ended inside a TOC entry or the payload header.
    #[error("Incomplete TOC entry: needed {bits_needed} bits, {bits_available} available")]
    IncompleteTocEntry {
        bits_needed: usize,
        bits_available: usize,
    },

    /// Frame type has no frame size for the stream's codec variant.
    #[error("Invalid frame type {frame_type} for {variant:?}")]
    InvalidFrameType {
        frame_type: FrameType,
        variant: CodecVariant,
    },

    /// Bit read past the end of the payload.
    #[error("Bit read past end of payload at bit {bit_position}")]
    Truncated { bit_position: usize },
}

/// Errors raised while negotiating a stream from its session description.
///
/// Any of these rejects the stream before a single packet is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Session requests CRC, interleaving, or more than one channel.
    #[error(
        "Unsupported RTP/AMR configuration: crc={crc}, interleaving={interleaving}, channels={channels}"
    )]
    UnsupportedConfiguration {
        crc: u32,
        interleaving: u32,
        channels: u32,
    },

    /// Recognized attribute carried a value that is not a decimal integer.
    #[error("Invalid value '{value}' for fmtp attribute '{attribute}'")]
    InvalidAttributeValue { attribute: String, value: String },

    /// Attribute line does not follow the expected `name:<pt> ...` shape.
    #[error("Malformed session attribute line: '{line}'")]
    MalformedLine { line: String },

    /// `rtpmap` names an encoding other than AMR or AMR-WB.
    #[error("Unsupported RTP encoding: '{name}'")]
    UnsupportedEncoding { name: String },

    /// Stream setup finished without an `rtpmap` naming the codec.
    #[error("No rtpmap attribute describes the AMR payload type")]
    MissingRtpMap,
}

/// Coarse classification of every failure the depacketizer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed TOC chain, invalid frame type, or unusable header.
    InvalidData,
    /// Session asks for a feature this depacketizer does not handle.
    UnsupportedConfiguration,
    /// Output buffer could not be allocated.
    OutOfMemory,
    /// A bounded read ran past the end of the payload.
    Truncated,
}

/// Main error type for depacketizer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmrError {
    /// Error while parsing a payload.
    #[error("Parsing error: {0}")]
    Parsing(#[from] AmrParsingError),

    /// Error while negotiating the stream configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Output buffer allocation failed.
    #[error("Out of memory allocating {requested} output bytes")]
    OutOfMemory { requested: usize },
}

impl AmrError {
    /// Classifies this error into one of the four reported kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmrError::Parsing(AmrParsingError::Truncated { .. }) => ErrorKind::Truncated,
            AmrError::Parsing(_) => ErrorKind::InvalidData,
            AmrError::Config(ConfigError::UnsupportedConfiguration { .. })
            | AmrError::Config(ConfigError::UnsupportedEncoding { .. }) => {
                ErrorKind::UnsupportedConfiguration
            }
            AmrError::Config(_) => ErrorKind::InvalidData,
            AmrError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }
}
