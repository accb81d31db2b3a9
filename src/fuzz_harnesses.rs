//! Fuzz testing harnesses for the depacketizer.
//!
//! Each harness takes raw fuzzer input and drives one public entry point. A
//! harness never fails on rejected input; it only panics when an accepted
//! packet produces output that breaks the frame bookkeeping.

use crate::assembler::KeepSilenceFrames;
use crate::config::{PayloadConfig, StreamSetup};
use crate::depacketizer::AmrDepacketizer;
use crate::packet_defs::{CodecVariant, FramePacking};

/// Fuzz tests [`AmrDepacketizer::depacketize`] across both variants and layouts.
///
/// # Setup
/// - The low four bits of the first input byte select the codec variant, the
///   payload layout, whether SID frames are expanded and the frame packing
/// - The remaining bytes are the RTP payload
///
/// # Parameters
/// - `data`: Fuzzer-generated input
pub fn amr_depacketizer_harness(data: &[u8]) {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };

    let variant = if selector & 0x01 != 0 {
        CodecVariant::WideBand
    } else {
        CodecVariant::NarrowBand
    };
    let packing = if selector & 0x08 != 0 {
        FramePacking::Contiguous
    } else {
        FramePacking::Padded
    };
    let config = PayloadConfig::default()
        .with_octet_aligned(selector & 0x02 != 0)
        .with_frame_packing(packing);
    let Ok(mut depacketizer) = AmrDepacketizer::new(variant, config) else {
        return;
    };
    if selector & 0x04 != 0 {
        depacketizer = depacketizer.with_silence_policy(KeepSilenceFrames);
    }

    if let Ok(output) = depacketizer.depacketize(payload) {
        assert!(output.frame_count() > 0, "accepted payload emitted no frames");
        let described: usize = output.frames().iter().map(|frame| frame.len).sum();
        assert_eq!(described, output.len(), "frame descriptors do not cover output");
    }
}

/// Fuzz tests SDP attribute parsing and stream setup.
///
/// # Parameters
/// - `data`: Fuzzer-generated input, split into attribute lines
pub fn amr_stream_setup_harness(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    if let Ok(setup) = StreamSetup::from_lines(text.lines()) {
        let _ = setup.build();
    }
}
