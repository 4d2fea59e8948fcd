//! Bit-reinterpretable packed registers.
//!
//! Each register is a plain integer with lane views layered on top. The
//! views reinterpret the bits in native byte order, so on a little-endian
//! host lane 0 of `as_u8x4()` is the least significant byte.

use bytemuck::{Pod, Zeroable};

/// A 32-bit register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Packed32(pub u32);

/// A 64-bit register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Packed64(pub u64);

/// A 128-bit register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Packed128(pub u128);

macro_rules! lane_views {
    ($reg:ident { $($get:ident / $set:ident => [$lane:ty; $n:literal]),* $(,)? }) => {
        impl $reg {
            $(
                #[doc = concat!("View the register as `[", stringify!($lane), "; ", stringify!($n), "]`.")]
                #[inline]
                pub fn $get(self) -> [$lane; $n] {
                    bytemuck::cast(self.0)
                }

                #[doc = concat!("Build a register from `[", stringify!($lane), "; ", stringify!($n), "]` lanes.")]
                #[inline]
                pub fn $set(lanes: [$lane; $n]) -> Self {
                    Self(bytemuck::cast(lanes))
                }
            )*
        }
    };
}

lane_views!(Packed32 {
    as_u8x4 / from_u8x4 => [u8; 4],
    as_i8x4 / from_i8x4 => [i8; 4],
    as_u16x2 / from_u16x2 => [u16; 2],
    as_i16x2 / from_i16x2 => [i16; 2],
    as_i32x1 / from_i32x1 => [i32; 1],
    as_f32x1 / from_f32x1 => [f32; 1],
});

lane_views!(Packed64 {
    as_u8x8 / from_u8x8 => [u8; 8],
    as_i8x8 / from_i8x8 => [i8; 8],
    as_u16x4 / from_u16x4 => [u16; 4],
    as_i16x4 / from_i16x4 => [i16; 4],
    as_u32x2 / from_u32x2 => [u32; 2],
    as_i32x2 / from_i32x2 => [i32; 2],
    as_f32x2 / from_f32x2 => [f32; 2],
});

lane_views!(Packed128 {
    as_u8x16 / from_u8x16 => [u8; 16],
    as_i8x16 / from_i8x16 => [i8; 16],
    as_u16x8 / from_u16x8 => [u16; 8],
    as_i16x8 / from_i16x8 => [i16; 8],
    as_u32x4 / from_u32x4 => [u32; 4],
    as_i32x4 / from_i32x4 => [i32; 4],
    as_u64x2 / from_u64x2 => [u64; 2],
    as_f32x4 / from_f32x4 => [f32; 4],
});

impl Packed64 {
    /// Split into the low and high 32-bit halves.
    pub fn halves(self) -> (Packed32, Packed32) {
        (Packed32(self.0 as u32), Packed32((self.0 >> 32) as u32))
    }

    /// Join low and high 32-bit halves.
    pub fn from_halves(low: Packed32, high: Packed32) -> Self {
        Self(u64::from(low.0) | (u64::from(high.0) << 32))
    }
}

impl From<u32> for Packed32 {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<u64> for Packed64 {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<u128> for Packed128 {
    fn from(v: u128) -> Self {
        Self(v)
    }
}
