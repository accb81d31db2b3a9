//! `amrdepay`: An RFC 3267 AMR / AMR-WB RTP payload depacketizer.
//!
//! This library converts RTP payloads carrying AMR narrowband or AMR-WB speech
//! frames into the byte-aligned storage format expected by decoders and
//! container writers. Both RFC 3267 layouts are supported: octet-aligned and
//! bandwidth-efficient. The primary entry point is the [`AmrDepacketizer`].
//!
//! ## Core Concepts
//!
//! - **[`AmrDepacketizer`]**: Immutable per-stream processor. Built from the codec
//!   variant and the negotiated [`PayloadConfig`], shareable across threads.
//! - **Table of contents**: Each payload opens with a codec mode request and a
//!   chain of TOC entries, one per frame. See [`toc`].
//! - **Storage format**: Every emitted frame is one header byte followed by the
//!   speech bits padded to whole octets. See [`assembler`].
//! - **Silence descriptors**: SID frames in bandwidth-efficient payloads are
//!   expanded into a fixed 61-byte block unless a different [`SilencePolicy`]
//!   is installed.
//!
//! ## Quick Start
//!
//! ```rust
//! use amrdepay::{AmrError, StreamSetup};
//!
//! fn main() -> Result<(), AmrError> {
//!     // Negotiate the stream from its SDP attributes
//!     let depacketizer = StreamSetup::from_lines([
//!         "a=rtpmap:97 AMR/8000",
//!         "a=fmtp:97 octet-align=1",
//!     ])?
//!     .build()?;
//!
//!     // CMR=15, one 4.75 kbit/s frame (FT0, Q=1), 12 speech octets
//!     let mut payload = vec![0xF0, 0x04];
//!     payload.extend_from_slice(&[0x55; 12]);
//!
//!     let output = depacketizer.depacketize(&payload)?;
//!     assert_eq!(output.frame_count(), 1);
//!     assert_eq!(output.frame_bytes(0).map(|frame| frame[0]), Some(0x04));
//!     assert_eq!(output.len(), 13);
//!     Ok(())
//! }
//! ```
//!
//! ## Unsupported Sessions
//!
//! Streams negotiating frame CRCs, interleaving or more than one channel are
//! rejected during setup with [`ErrorKind::UnsupportedConfiguration`].

pub mod assembler;
pub mod bit_cursor;
pub mod config;
pub mod constants;
pub mod depacketizer;
pub mod error;
pub mod frame_tables;
pub mod packet_defs;
pub mod toc;
pub mod types;

pub use assembler::{
    DepacketizedPayload, ExpandSilenceFrames, FrameDescriptor, KeepSilenceFrames, SilencePolicy,
    legacy_output_estimate,
};
pub use config::{PayloadConfig, RtpMap, StreamSetup, parse_fmtp_line, parse_rtpmap_line};
pub use depacketizer::AmrDepacketizer;
pub use error::{AmrError, AmrParsingError, ConfigError, ErrorKind};
pub use packet_defs::{CodecVariant, FramePacking, PayloadFormat};
pub use types::{CodecModeRequest, FrameType, PayloadType};
pub mod fuzz_harnesses;

#[cfg(test)]
mod tidy;
