//! Core type definitions for RFC 3267 payload fields.
//!
//! Provides zero-cost newtypes so a frame type, a codec mode request and an
//! RTP payload type cannot be mixed up at compile time.
//! All types use `#[repr(transparent)]` for guaranteed zero runtime cost.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Macro to generate payload-field newtype wrappers with common implementations
macro_rules! amr_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
        $(, custom_methods: { $($custom:tt)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            $($($custom)*)?
        }

        // Display with custom prefix
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

amr_newtype!(
    /// 4-bit frame type (FT) index selecting the speech mode of one frame.
    FrameType(u8) => "FT",
    custom_methods: {
        /// Builds a frame type from the low 4 bits of `bits`.
        #[inline]
        pub const fn from_bits(bits: u8) -> Self {
            Self(bits & 0x0F)
        }

        /// Index into a 16-entry frame size table.
        #[inline]
        pub const fn index(self) -> usize {
            (self.0 & 0x0F) as usize
        }

        /// True for the silence descriptor frame type.
        #[inline]
        pub const fn is_silence_descriptor(self) -> bool {
            self.0 == Self::SID.0
        }

        /// Storage-format header byte (`P FT(4) Q P P`) for this frame type.
        #[inline]
        pub const fn storage_header(self, quality: bool) -> u8 {
            ((self.0 & 0x0F) << 3) | if quality { 0x04 } else { 0x00 }
        }
    }
);

amr_newtype!(
    /// 4-bit codec mode request (CMR) heading every RFC 3267 payload.
    CodecModeRequest(u8) => "CMR",
    custom_methods: {
        /// Builds a mode request from the low 4 bits of `bits`.
        #[inline]
        pub const fn from_bits(bits: u8) -> Self {
            Self(bits & 0x0F)
        }

        /// True when the sender expresses no mode preference.
        #[inline]
        pub const fn is_no_request(self) -> bool {
            self.0 == 0x0F
        }
    }
);

amr_newtype!(
    /// Dynamic RTP payload type bound to an AMR stream in the session description.
    PayloadType(u8) => "PT"
);

impl FrameType {
    /// Silence descriptor frame type.
    pub const SID: Self = Self::new(9);
    /// "No data" frame type.
    pub const NO_DATA: Self = Self::new(15);
}
