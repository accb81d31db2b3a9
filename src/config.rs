//! Session configuration of an AMR RTP stream.
//!
//! Extracts the payload format parameters from SDP `fmtp` attributes and the
//! codec identity from `rtpmap` attributes, then validates that the stream
//! uses only the features this crate depacketizes: a single channel without
//! frame CRCs or interleaving.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::constants::{FMTP_CHANNELS, FMTP_CRC, FMTP_INTERLEAVING, FMTP_OCTET_ALIGN};
use crate::depacketizer::AmrDepacketizer;
use crate::error::{AmrError, ConfigError};
use crate::packet_defs::{CodecVariant, FramePacking};
use crate::types::PayloadType;

const SDP_ATTRIBUTE_PREFIX: &str = "a=";
const FMTP_PREFIX: &str = "fmtp:";
const RTPMAP_PREFIX: &str = "rtpmap:";

/// Payload format parameters negotiated for one stream.
///
/// Immutable once the stream is set up. Missing fields deserialize to the
/// RFC 3267 defaults: bandwidth-efficient, no CRC, no interleaving, one channel,
/// padded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Payloads use the octet-aligned layout.
    pub octet_aligned: bool,
    /// Frames carry CRCs.
    pub crc_enabled: bool,
    /// Frames are interleaved across packets.
    pub interleaving_enabled: bool,
    /// Number of audio channels.
    pub channel_count: u32,
    /// Frame placement in bandwidth-efficient payloads.
    pub frame_packing: FramePacking,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            octet_aligned: false,
            crc_enabled: false,
            interleaving_enabled: false,
            channel_count: 1,
            frame_packing: FramePacking::Padded,
        }
    }
}

impl PayloadConfig {
    /// Returns a copy with the octet-aligned flag set to `octet_aligned`.
    pub fn with_octet_aligned(mut self, octet_aligned: bool) -> Self {
        self.octet_aligned = octet_aligned;
        self
    }

    /// Returns a copy reading bandwidth-efficient frames with `packing`.
    pub fn with_frame_packing(mut self, packing: FramePacking) -> Self {
        self.frame_packing = packing;
        self
    }

    /// Applies one `fmtp` parameter.
    ///
    /// Names are matched case-insensitively. An empty value counts as `1`.
    /// Parameters other than `octet-align`, `crc`, `interleaving` and
    /// `channels` are ignored.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidAttributeValue`] - A recognized parameter has a
    ///   value that is not a decimal integer
    pub fn apply_fmtp_attribute(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let name = name.trim();
        let mut value = value.trim();
        let recognized = [FMTP_OCTET_ALIGN, FMTP_CRC, FMTP_INTERLEAVING, FMTP_CHANNELS]
            .iter()
            .any(|known| name.eq_ignore_ascii_case(known));
        if !recognized {
            debug!(attribute = name, value, "ignoring fmtp attribute");
            return Ok(());
        }

        if value.is_empty() {
            warn!(attribute = name, "fmtp attribute has no value, assuming 1");
            value = "1";
        }
        let parsed: u32 = value
            .parse()
            .map_err(|_| ConfigError::InvalidAttributeValue {
                attribute: name.to_string(),
                value: value.to_string(),
            })?;

        if name.eq_ignore_ascii_case(FMTP_OCTET_ALIGN) {
            self.octet_aligned = parsed != 0;
        } else if name.eq_ignore_ascii_case(FMTP_CRC) {
            self.crc_enabled = parsed != 0;
        } else if name.eq_ignore_ascii_case(FMTP_INTERLEAVING) {
            self.interleaving_enabled = parsed != 0;
        } else {
            self.channel_count = parsed;
        }
        Ok(())
    }

    /// Checks that the stream can be depacketized.
    ///
    /// # Errors
    /// - [`ConfigError::UnsupportedConfiguration`] - CRC or interleaving is
    ///   enabled, or the channel count is not 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crc_enabled || self.interleaving_enabled || self.channel_count != 1 {
            let err = ConfigError::UnsupportedConfiguration {
                crc: u32::from(self.crc_enabled),
                interleaving: u32::from(self.interleaving_enabled),
                channels: self.channel_count,
            };
            error!(%err, "rejecting AMR stream");
            return Err(err);
        }
        Ok(())
    }
}

/// Strips an optional `a=` prefix and the attribute name, returning the value.
fn attribute_value<'a>(line: &'a str, prefix: &str) -> Result<&'a str, ConfigError> {
    let line = line.trim();
    let line = line.strip_prefix(SDP_ATTRIBUTE_PREFIX).unwrap_or(line);
    line.strip_prefix(prefix)
        .ok_or_else(|| ConfigError::MalformedLine {
            line: line.to_string(),
        })
}

fn parse_payload_type(field: &str, line: &str) -> Result<PayloadType, ConfigError> {
    field
        .parse::<u8>()
        .map(PayloadType::new)
        .map_err(|_| ConfigError::MalformedLine {
            line: line.to_string(),
        })
}

/// Parses the parameter list of an `fmtp` attribute into a configuration.
///
/// Parameters are `;`-separated `name=value` pairs; a bare `name` has an empty
/// value. The result is not validated.
///
/// # Errors
/// - [`ConfigError::InvalidAttributeValue`] - A recognized parameter has a
///   non-numeric value
pub fn parse_fmtp_parameters(parameters: &str) -> Result<PayloadConfig, ConfigError> {
    let mut config = PayloadConfig::default();
    for (name, value) in fmtp_pairs(parameters) {
        config.apply_fmtp_attribute(name, value)?;
    }
    Ok(config)
}

fn fmtp_pairs(parameters: &str) -> impl Iterator<Item = (&str, &str)> {
    parameters
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// One recorded `fmtp` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FmtpAttribute {
    payload_type: PayloadType,
    config: PayloadConfig,
    /// The line named `channels` explicitly.
    declares_channels: bool,
}

fn parse_fmtp_attribute(line: &str) -> Result<FmtpAttribute, ConfigError> {
    let value = attribute_value(line, FMTP_PREFIX)?;
    let (pt_field, parameters) = value
        .trim()
        .split_once(char::is_whitespace)
        .unwrap_or((value.trim(), ""));
    let payload_type = parse_payload_type(pt_field, line)?;
    let config = parse_fmtp_parameters(parameters)?;
    let declares_channels =
        fmtp_pairs(parameters).any(|(name, _)| name.trim().eq_ignore_ascii_case(FMTP_CHANNELS));
    Ok(FmtpAttribute {
        payload_type,
        config,
        declares_channels,
    })
}

/// Parses an `fmtp:<pt> <parameters>` attribute line (the `a=` prefix is optional).
///
/// # Returns
/// - `Ok((PayloadType, PayloadConfig))`: Payload type the line applies to and the
///   unvalidated configuration
/// - `Err(ConfigError)`: Line is not an `fmtp` attribute or a value is invalid
pub fn parse_fmtp_line(line: &str) -> Result<(PayloadType, PayloadConfig), ConfigError> {
    let attribute = parse_fmtp_attribute(line)?;
    Ok((attribute.payload_type, attribute.config))
}

/// Codec identity declared by an `rtpmap` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpMap {
    /// Dynamic RTP payload type.
    pub payload_type: PayloadType,
    /// Codec variant named by the encoding.
    pub variant: CodecVariant,
    /// RTP timestamp clock rate in Hz.
    pub clock_rate: u32,
    /// Channel count, 1 when the attribute omits it.
    pub channels: u32,
}

/// Parses an `rtpmap:<pt> <encoding>/<clock>[/<channels>]` attribute line.
///
/// # Errors
/// - [`ConfigError::MalformedLine`] - Line does not have the expected shape
/// - [`ConfigError::UnsupportedEncoding`] - Encoding is neither AMR nor AMR-WB
pub fn parse_rtpmap_line(line: &str) -> Result<RtpMap, ConfigError> {
    let malformed = || ConfigError::MalformedLine {
        line: line.to_string(),
    };
    let value = attribute_value(line, RTPMAP_PREFIX)?;
    let mut fields = value.split_whitespace();
    let payload_type = parse_payload_type(fields.next().ok_or_else(malformed)?, line)?;
    let encoding = fields.next().ok_or_else(malformed)?;

    let mut parts = encoding.split('/');
    let name = parts.next().ok_or_else(malformed)?;
    let variant = CodecVariant::from_encoding_name(name).ok_or_else(|| {
        ConfigError::UnsupportedEncoding {
            name: name.to_string(),
        }
    })?;
    let clock_rate = parts
        .next()
        .ok_or_else(malformed)?
        .parse::<u32>()
        .map_err(|_| malformed())?;
    let channels = match parts.next() {
        Some(channels) => channels.parse::<u32>().map_err(|_| malformed())?,
        None => 1,
    };

    Ok(RtpMap {
        payload_type,
        variant,
        clock_rate,
        channels,
    })
}

/// Collects the SDP attributes of one audio media section and builds its
/// depacketizer.
///
/// Only `rtpmap` lines naming AMR or AMR-WB and the `fmtp` line for the same
/// payload type take part; every other attribute is ignored.
#[derive(Debug, Clone, Default)]
pub struct StreamSetup {
    rtpmap: Option<RtpMap>,
    fmtp: Vec<FmtpAttribute>,
}

impl StreamSetup {
    /// Creates an empty setup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a setup from a sequence of attribute lines.
    ///
    /// # Errors
    /// Any error returned by [`StreamSetup::add_attribute_line`].
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut setup = Self::new();
        for line in lines {
            setup.add_attribute_line(line)?;
        }
        Ok(setup)
    }

    /// Records one SDP attribute line.
    ///
    /// # Errors
    /// - [`ConfigError::MalformedLine`] - An `rtpmap` or `fmtp` line is malformed
    /// - [`ConfigError::InvalidAttributeValue`] - An `fmtp` parameter is invalid
    pub fn add_attribute_line(&mut self, line: &str) -> Result<(), ConfigError> {
        let trimmed = line.trim();
        let attribute = trimmed
            .strip_prefix(SDP_ATTRIBUTE_PREFIX)
            .unwrap_or(trimmed);

        if attribute.starts_with(RTPMAP_PREFIX) {
            match parse_rtpmap_line(attribute) {
                Ok(rtpmap) => {
                    if self.rtpmap.is_none() {
                        self.rtpmap = Some(rtpmap);
                    } else {
                        debug!(
                            payload_type = rtpmap.payload_type.value(),
                            "ignoring additional AMR rtpmap"
                        );
                    }
                }
                Err(ConfigError::UnsupportedEncoding { name }) => {
                    debug!(encoding = %name, "ignoring non-AMR rtpmap");
                }
                Err(err) => return Err(err),
            }
        } else if attribute.starts_with(FMTP_PREFIX) {
            self.fmtp.push(parse_fmtp_attribute(attribute)?);
        } else {
            debug!(line = trimmed, "ignoring session attribute");
        }
        Ok(())
    }

    /// Codec identity recorded so far.
    pub fn rtpmap(&self) -> Option<&RtpMap> {
        self.rtpmap.as_ref()
    }

    /// Payload configuration for the recorded `rtpmap`, defaults when no
    /// matching `fmtp` line was seen.
    ///
    /// The channel count is taken from the `rtpmap`. An `fmtp` line naming
    /// `channels` must agree with it. The result is not validated.
    ///
    /// # Errors
    /// - [`ConfigError::MissingRtpMap`] - No AMR `rtpmap` was recorded
    /// - [`ConfigError::UnsupportedConfiguration`] - The matching `fmtp` line
    ///   declares a channel count different from the `rtpmap`
    pub fn payload_config(&self) -> Result<PayloadConfig, ConfigError> {
        let rtpmap = self.rtpmap.ok_or(ConfigError::MissingRtpMap)?;
        let mut config = PayloadConfig {
            channel_count: rtpmap.channels,
            ..PayloadConfig::default()
        };
        for fmtp in &self.fmtp {
            if fmtp.payload_type != rtpmap.payload_type {
                debug!(
                    fmtp_payload_type = fmtp.payload_type.value(),
                    rtpmap_payload_type = rtpmap.payload_type.value(),
                    "ignoring fmtp for other payload type"
                );
                continue;
            }
            if fmtp.declares_channels && fmtp.config.channel_count != rtpmap.channels {
                let err = ConfigError::UnsupportedConfiguration {
                    crc: u32::from(fmtp.config.crc_enabled),
                    interleaving: u32::from(fmtp.config.interleaving_enabled),
                    channels: fmtp.config.channel_count,
                };
                error!(
                    %err,
                    rtpmap_channels = rtpmap.channels,
                    "fmtp and rtpmap channel counts differ"
                );
                return Err(err);
            }
            config = PayloadConfig {
                channel_count: rtpmap.channels,
                ..fmtp.config
            };
        }
        Ok(config)
    }

    /// Validates the configuration and creates the stream's depacketizer.
    ///
    /// # Errors
    /// - [`AmrError::Config`] - No AMR `rtpmap`, or the configuration is unsupported
    pub fn build(&self) -> Result<AmrDepacketizer, AmrError> {
        let config = self.payload_config()?;
        let rtpmap = self.rtpmap.ok_or(ConfigError::MissingRtpMap)?;
        AmrDepacketizer::new(rtpmap.variant, config)
    }
}
