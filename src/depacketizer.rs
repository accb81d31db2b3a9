//! Per-stream RTP payload depacketizer.
//!
//! [`AmrDepacketizer`] ties together the codec variant, the negotiated payload
//! configuration and the silence policy of one stream. It holds no per-packet
//! state, so a single instance can be shared across threads.

use std::sync::Arc;

use tracing::debug;

use crate::assembler::{DepacketizedPayload, ExpandSilenceFrames, FrameAssembler, SilencePolicy};
use crate::bit_cursor::BitCursor;
use crate::config::PayloadConfig;
use crate::error::{AmrError, AmrParsingError};
use crate::packet_defs::{CodecVariant, PayloadFormat};
use crate::toc::parse_toc;

/// Converts RFC 3267 RTP payloads into byte-aligned storage-format frames.
#[derive(Debug, Clone)]
pub struct AmrDepacketizer {
    variant: CodecVariant,
    config: PayloadConfig,
    silence_policy: Arc<dyn SilencePolicy>,
}

impl AmrDepacketizer {
    /// Creates a depacketizer for a stream, expanding SID frames by default.
    ///
    /// # Parameters
    /// - `variant`: Narrowband or wideband codec of the stream
    /// - `config`: Payload configuration negotiated for the stream
    ///
    /// # Returns
    /// - `Ok(AmrDepacketizer)`: Ready to process packets
    /// - `Err(AmrError::Config)`: `config` requests CRC, interleaving or more than one channel
    pub fn new(variant: CodecVariant, config: PayloadConfig) -> Result<Self, AmrError> {
        config.validate()?;
        Ok(Self {
            variant,
            config,
            silence_policy: Arc::new(ExpandSilenceFrames),
        })
    }

    /// Replaces the policy applied to SID frames in bandwidth-efficient payloads.
    pub fn with_silence_policy<P>(mut self, policy: P) -> Self
    where
        P: SilencePolicy + 'static,
    {
        self.silence_policy = Arc::new(policy);
        self
    }

    /// Codec variant of the stream.
    pub fn variant(&self) -> CodecVariant {
        self.variant
    }

    /// Payload configuration of the stream.
    pub fn config(&self) -> &PayloadConfig {
        &self.config
    }

    /// Wire layout selected by the configuration.
    pub fn format(&self) -> PayloadFormat {
        PayloadFormat::from(self.config.octet_aligned)
    }

    /// Depacketizes one RTP payload (RTP header already stripped).
    ///
    /// # Parameters
    /// - `payload`: RTP payload bytes
    ///
    /// # Returns
    /// - `Ok(DepacketizedPayload)`: One storage-format frame per TOC entry, in order
    /// - `Err(AmrError)`: The packet is rejected as a whole; see [`AmrError::kind`]
    pub fn depacketize(&self, payload: &[u8]) -> Result<DepacketizedPayload, AmrError> {
        if payload.is_empty() {
            return Err(AmrParsingError::EmptyPayload.into());
        }

        let format = self.format();
        debug!(
            variant = ?self.variant,
            format = ?format,
            payload_len = payload.len(),
            "depacketizing AMR payload"
        );

        let mut cursor = BitCursor::new(payload);
        let toc = parse_toc(&mut cursor, format)?;
        let assembler = FrameAssembler::new(self.variant, format, self.silence_policy.as_ref())
            .with_frame_packing(self.config.frame_packing);
        let output = assembler.assemble(&mut cursor, &toc)?;

        debug!(
            entries = toc.entries.len(),
            silence_descriptors = toc.silence_descriptor_count(),
            cmr = toc.codec_mode_request.value(),
            output_len = output.len(),
            truncated = output.truncated_frames(),
            "depacketized AMR payload"
        );
        Ok(output)
    }
}
