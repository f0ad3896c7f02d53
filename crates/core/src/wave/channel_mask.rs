use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bit set of the speaker positions present in a multichannel stream.
///
/// Channels in the sample data appear in the order of the bits set here,
/// lowest bit first. Bits that do not correspond to a known speaker are kept
/// as they were read so that saving a loaded mask reproduces it exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMask(u32);

impl ChannelMask {
    pub const EMPTY: Self = Self(0);

    pub const FRONT_LEFT: Self = Self(0x0000_0001);
    pub const FRONT_RIGHT: Self = Self(0x0000_0002);
    pub const FRONT_CENTER: Self = Self(0x0000_0004);
    pub const LOW_FREQUENCY: Self = Self(0x0000_0008);
    pub const BACK_LEFT: Self = Self(0x0000_0010);
    pub const BACK_RIGHT: Self = Self(0x0000_0020);
    pub const FRONT_LEFT_OF_CENTER: Self = Self(0x0000_0040);
    pub const FRONT_RIGHT_OF_CENTER: Self = Self(0x0000_0080);
    pub const BACK_CENTER: Self = Self(0x0000_0100);
    pub const SIDE_LEFT: Self = Self(0x0000_0200);
    pub const SIDE_RIGHT: Self = Self(0x0000_0400);
    pub const TOP_CENTER: Self = Self(0x0000_0800);
    pub const TOP_FRONT_LEFT: Self = Self(0x0000_1000);
    pub const TOP_FRONT_CENTER: Self = Self(0x0000_2000);
    pub const TOP_FRONT_RIGHT: Self = Self(0x0000_4000);
    pub const TOP_BACK_LEFT: Self = Self(0x0000_8000);
    pub const TOP_BACK_CENTER: Self = Self(0x0001_0000);
    pub const TOP_BACK_RIGHT: Self = Self(0x0002_0000);

    pub const MONO: Self = Self::FRONT_CENTER;
    pub const STEREO: Self = Self::FRONT_LEFT.with(Self::FRONT_RIGHT);
    pub const QUAD: Self = Self::STEREO.with(Self::BACK_LEFT).with(Self::BACK_RIGHT);
    pub const SURROUND_5_1: Self = Self::QUAD
        .with(Self::FRONT_CENTER)
        .with(Self::LOW_FREQUENCY);
    pub const SURROUND_7_1: Self = Self::SURROUND_5_1
        .with(Self::SIDE_LEFT)
        .with(Self::SIDE_RIGHT);

    const NAMED: [(&'static str, Self); 18] = [
        ("FL", Self::FRONT_LEFT),
        ("FR", Self::FRONT_RIGHT),
        ("FC", Self::FRONT_CENTER),
        ("LFE", Self::LOW_FREQUENCY),
        ("BL", Self::BACK_LEFT),
        ("BR", Self::BACK_RIGHT),
        ("FLC", Self::FRONT_LEFT_OF_CENTER),
        ("FRC", Self::FRONT_RIGHT_OF_CENTER),
        ("BC", Self::BACK_CENTER),
        ("SL", Self::SIDE_LEFT),
        ("SR", Self::SIDE_RIGHT),
        ("TC", Self::TOP_CENTER),
        ("TFL", Self::TOP_FRONT_LEFT),
        ("TFC", Self::TOP_FRONT_CENTER),
        ("TFR", Self::TOP_FRONT_RIGHT),
        ("TBL", Self::TOP_BACK_LEFT),
        ("TBC", Self::TOP_BACK_CENTER),
        ("TBR", Self::TOP_BACK_RIGHT),
    ];

    /// Wraps raw bits as read from a format chunk.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if all speakers in `other` are present in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of channels described by the mask.
    pub const fn channel_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Picks the conventional speaker layout for a channel count.
    ///
    /// Counts without a well-known layout get the lowest `channels` speaker
    /// positions assigned in order.
    pub fn for_channel_count(channels: u16) -> Self {
        match channels {
            1 => Self::MONO,
            2 => Self::STEREO,
            4 => Self::QUAD,
            6 => Self::SURROUND_5_1,
            8 => Self::SURROUND_7_1,
            n => {
                let n = u32::from(n).min(Self::NAMED.len() as u32);
                Self(((1u64 << n) - 1) as u32)
            }
        }
    }
}

impl BitOr for ChannelMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for ChannelMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl BitAnd for ChannelMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl From<u32> for ChannelMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<ChannelMask> for u32 {
    fn from(mask: ChannelMask) -> Self {
        mask.0
    }
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelMask({:#x} {self})", self.0)
    }
}

impl fmt::Display for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut known = Self::EMPTY;
        let mut first = true;
        for (name, flag) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                known.insert(flag);
                first = false;
            }
        }

        let unknown = self.0 & !known.0;
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{unknown:#x}")?;
        }
        Ok(())
    }
}
