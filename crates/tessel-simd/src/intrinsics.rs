//! Software implementations of packed-lane and bit-manipulation intrinsics.
//!
//! Lane `i` of an 8-bit operation occupies bits `8*i .. 8*i+8` of the
//! register; lane `i` of a 16-bit operation occupies bits `16*i .. 16*i+16`.
//! These are architectural bit positions, independent of host endianness.

use std::fmt;

/// Per-byte "greater or equal" flags.
///
/// Bit `i` corresponds to byte lane `i`. A 16-bit operation sets two
/// adjacent bits per halfword lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeFlags(u8);

impl GeFlags {
    /// All four lanes set.
    pub const ALL: Self = Self(0b1111);

    /// Build from the low four bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// The four flag bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether byte lane `lane` (0..4) is flagged.
    pub fn lane(self, lane: usize) -> bool {
        lane < 4 && self.0 & (1 << lane) != 0
    }
}

impl fmt::Display for GeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GE={:04b}", self.0)
    }
}

/// A packed result together with the GE flags it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Flagged {
    /// The packed arithmetic result.
    pub value: u32,
    /// The lane flags, for a later [`sel`].
    pub ge: GeFlags,
}

// ── lane plumbing ───────────────────────────────────────────────

#[inline]
fn byte(x: u32, lane: u32) -> u8 {
    (x >> (8 * lane)) as u8
}

#[inline]
fn half(x: u32, lane: u32) -> u16 {
    (x >> (16 * lane)) as u16
}

#[inline]
fn map8(a: u32, b: u32, f: impl Fn(u8, u8) -> u8) -> u32 {
    (0..4).fold(0, |acc, lane| {
        acc | (u32::from(f(byte(a, lane), byte(b, lane))) << (8 * lane))
    })
}

#[inline]
fn map16(a: u32, b: u32, f: impl Fn(u16, u16) -> u16) -> u32 {
    (0..2).fold(0, |acc, lane| {
        acc | (u32::from(f(half(a, lane), half(b, lane))) << (16 * lane))
    })
}

#[inline]
fn flagged8(a: u32, b: u32, f: impl Fn(u8, u8) -> (u8, bool)) -> Flagged {
    let mut value = 0;
    let mut ge = 0;
    for lane in 0..4 {
        let (v, flag) = f(byte(a, lane), byte(b, lane));
        value |= u32::from(v) << (8 * lane);
        if flag {
            ge |= 1 << lane;
        }
    }
    Flagged {
        value,
        ge: GeFlags(ge),
    }
}

#[inline]
fn flagged16(a: u32, b: u32, f: impl Fn(u16, u16) -> (u16, bool)) -> Flagged {
    let mut value = 0;
    let mut ge = 0;
    for lane in 0..2 {
        let (v, flag) = f(half(a, lane), half(b, lane));
        value |= u32::from(v) << (16 * lane);
        if flag {
            ge |= 0b11 << (2 * lane);
        }
    }
    Flagged {
        value,
        ge: GeFlags(ge),
    }
}

// ── byte and bit reordering ─────────────────────────────────────

/// Reverse the byte order of a word (`REV`).
#[inline]
pub fn rev(x: u32) -> u32 {
    x.swap_bytes()
}

/// Reverse the byte order within each halfword (`REV16`).
#[inline]
pub fn rev16(x: u32) -> u32 {
    ((x & 0x00FF_00FF) << 8) | ((x >> 8) & 0x00FF_00FF)
}

/// Reverse the bytes of the low halfword and sign-extend (`REVSH`).
#[inline]
pub fn revsh(x: u32) -> i32 {
    i32::from((x as u16).swap_bytes() as i16)
}

/// Reverse the bit order of a word (`RBIT`).
#[inline]
pub fn rbit(x: u32) -> u32 {
    x.reverse_bits()
}

/// Count leading zero bits (`CLZ`). Returns 32 for zero.
#[inline]
pub fn clz(x: u32) -> u32 {
    x.leading_zeros()
}

// ── saturation and multiply-accumulate ──────────────────────────

/// Saturate to a signed `bits`-bit range (`SSAT`), `bits` in `1..=32`.
///
/// `bits` outside that range is clamped into it.
#[inline]
pub fn ssat(value: i32, bits: u32) -> i32 {
    let bits = bits.clamp(1, 32);
    let max = (1i64 << (bits - 1)) - 1;
    let min = -(1i64 << (bits - 1));
    i64::from(value).clamp(min, max) as i32
}

/// Saturate to an unsigned `bits`-bit range (`USAT`), `bits` in `0..=31`.
///
/// `bits` above 31 is clamped to 31.
#[inline]
pub fn usat(value: i32, bits: u32) -> u32 {
    let max = (1i64 << bits.min(31)) - 1;
    i64::from(value).clamp(0, max) as u32
}

/// Dual signed 16-bit multiply with 32-bit accumulate (`SMLAD`).
///
/// Computes `acc + x.lo * y.lo + x.hi * y.hi`, wrapping on overflow.
#[inline]
pub fn smlad(x: u32, y: u32, acc: i32) -> i32 {
    let lo = i32::from(half(x, 0) as i16) * i32::from(half(y, 0) as i16);
    let hi = i32::from(half(x, 1) as i16) * i32::from(half(y, 1) as i16);
    acc.wrapping_add(lo).wrapping_add(hi)
}

// ── wrapping add/subtract with GE flags ─────────────────────────

/// Signed bytewise add (`SADD8`). GE is set where the lane sum is `>= 0`.
pub fn sadd8(a: u32, b: u32) -> Flagged {
    flagged8(a, b, |x, y| {
        let sum = i16::from(x as i8) + i16::from(y as i8);
        (sum as u8, sum >= 0)
    })
}

/// Unsigned bytewise add (`UADD8`). GE is set where the lane carries out.
pub fn uadd8(a: u32, b: u32) -> Flagged {
    flagged8(a, b, |x, y| {
        let sum = u16::from(x) + u16::from(y);
        (sum as u8, sum >= 0x100)
    })
}

/// Signed bytewise subtract (`SSUB8`). GE is set where the difference is `>= 0`.
pub fn ssub8(a: u32, b: u32) -> Flagged {
    flagged8(a, b, |x, y| {
        let diff = i16::from(x as i8) - i16::from(y as i8);
        (diff as u8, diff >= 0)
    })
}

/// Unsigned bytewise subtract (`USUB8`). GE is set where no borrow occurs.
pub fn usub8(a: u32, b: u32) -> Flagged {
    flagged8(a, b, |x, y| (x.wrapping_sub(y), x >= y))
}

/// Signed halfword add (`SADD16`).
pub fn sadd16(a: u32, b: u32) -> Flagged {
    flagged16(a, b, |x, y| {
        let sum = i32::from(x as i16) + i32::from(y as i16);
        (sum as u16, sum >= 0)
    })
}

/// Unsigned halfword add (`UADD16`).
pub fn uadd16(a: u32, b: u32) -> Flagged {
    flagged16(a, b, |x, y| {
        let sum = u32::from(x) + u32::from(y);
        (sum as u16, sum >= 0x1_0000)
    })
}

/// Signed halfword subtract (`SSUB16`).
pub fn ssub16(a: u32, b: u32) -> Flagged {
    flagged16(a, b, |x, y| {
        let diff = i32::from(x as i16) - i32::from(y as i16);
        (diff as u16, diff >= 0)
    })
}

/// Unsigned halfword subtract (`USUB16`).
pub fn usub16(a: u32, b: u32) -> Flagged {
    flagged16(a, b, |x, y| (x.wrapping_sub(y), x >= y))
}

/// Select each byte from `a` where its GE bit is set, else from `b` (`SEL`).
#[inline]
pub fn sel(a: u32, b: u32, ge: GeFlags) -> u32 {
    (0..4).fold(0, |acc, lane| {
        let src = if ge.lane(lane as usize) { a } else { b };
        acc | (u32::from(byte(src, lane)) << (8 * lane))
    })
}

// ── saturating add/subtract ─────────────────────────────────────

/// Signed saturating bytewise add (`QADD8`).
pub fn qadd8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| (x as i8).saturating_add(y as i8) as u8)
}

/// Signed saturating bytewise subtract (`QSUB8`).
pub fn qsub8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| (x as i8).saturating_sub(y as i8) as u8)
}

/// Signed saturating halfword add (`QADD16`).
pub fn qadd16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| (x as i16).saturating_add(y as i16) as u16)
}

/// Signed saturating halfword subtract (`QSUB16`).
pub fn qsub16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| (x as i16).saturating_sub(y as i16) as u16)
}

/// Unsigned saturating bytewise add (`UQADD8`).
pub fn uqadd8(a: u32, b: u32) -> u32 {
    map8(a, b, u8::saturating_add)
}

/// Unsigned saturating bytewise subtract (`UQSUB8`).
pub fn uqsub8(a: u32, b: u32) -> u32 {
    map8(a, b, u8::saturating_sub)
}

/// Unsigned saturating halfword add (`UQADD16`).
pub fn uqadd16(a: u32, b: u32) -> u32 {
    map16(a, b, u16::saturating_add)
}

/// Unsigned saturating halfword subtract (`UQSUB16`).
pub fn uqsub16(a: u32, b: u32) -> u32 {
    map16(a, b, u16::saturating_sub)
}

// ── halving add/subtract ────────────────────────────────────────

/// Signed halving bytewise add (`SHADD8`).
pub fn shadd8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| ((i16::from(x as i8) + i16::from(y as i8)) >> 1) as u8)
}

/// Signed halving bytewise subtract (`SHSUB8`).
pub fn shsub8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| ((i16::from(x as i8) - i16::from(y as i8)) >> 1) as u8)
}

/// Unsigned halving bytewise add (`UHADD8`).
pub fn uhadd8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| ((u16::from(x) + u16::from(y)) >> 1) as u8)
}

/// Unsigned halving bytewise subtract (`UHSUB8`).
pub fn uhsub8(a: u32, b: u32) -> u32 {
    map8(a, b, |x, y| ((i16::from(x) - i16::from(y)) >> 1) as u8)
}

/// Signed halving halfword add (`SHADD16`).
pub fn shadd16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| ((i32::from(x as i16) + i32::from(y as i16)) >> 1) as u16)
}

/// Signed halving halfword subtract (`SHSUB16`).
pub fn shsub16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| ((i32::from(x as i16) - i32::from(y as i16)) >> 1) as u16)
}

/// Unsigned halving halfword add (`UHADD16`).
pub fn uhadd16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| ((u32::from(x) + u32::from(y)) >> 1) as u16)
}

/// Unsigned halving halfword subtract (`UHSUB16`).
pub fn uhsub16(a: u32, b: u32) -> u32 {
    map16(a, b, |x, y| ((i32::from(x) - i32::from(y)) >> 1) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reversal_family() {
        assert_eq!(rev(0x1234_5678), 0x7856_3412);
        assert_eq!(rev16(0x1234_5678), 0x3412_7856);
        assert_eq!(revsh(0x0000_0080), -32768);
        assert_eq!(revsh(0xFFFF_3412), 0x1234);
        assert_eq!(rbit(0x0000_0001), 0x8000_0000);
        assert_eq!(rbit(0xF000_0000), 0x0000_000F);
    }

    #[test]
    fn clz_counts_from_msb() {
        assert_eq!(clz(0), 32);
        assert_eq!(clz(1), 31);
        assert_eq!(clz(0x8000_0000), 0);
        assert_eq!(clz(0x0001_0000), 15);
    }

    #[test]
    fn ssat_and_usat_clamp() {
        assert_eq!(ssat(200, 8), 127);
        assert_eq!(ssat(-200, 8), -128);
        assert_eq!(ssat(5, 8), 5);
        assert_eq!(ssat(i32::MIN, 32), i32::MIN);
        assert_eq!(usat(-5, 8), 0);
        assert_eq!(usat(300, 8), 255);
        assert_eq!(usat(300, 0), 0);
        assert_eq!(usat(40, 8), 40);
    }

    #[test]
    fn smlad_sums_both_products() {
        let x = ((-3i16 as u16 as u32) << 16) | 4;
        let y = (5u32 << 16) | 6;
        assert_eq!(smlad(x, y, 100), 100 + 24 - 15);
    }

    #[test]
    fn uadd8_sets_ge_on_carry() {
        let r = uadd8(0xFF_01_80_10, 0x01_01_80_10);
        assert_eq!(r.value, 0x00_02_00_20);
        assert_eq!(r.ge.bits(), 0b1010);
    }

    #[test]
    fn sadd8_sets_ge_on_non_negative() {
        let r = sadd8(0x7F_80_01_FE, 0x01_80_FF_01);
        // lanes (lsb first): -2+1=-1, 1-1=0, -128-128=-256, 127+1=128
        assert_eq!(r.value, 0x80_00_00_FF);
        assert_eq!(r.ge.bits(), 0b1010);
    }

    #[test]
    fn ssub8_and_usub8_flags() {
        let s = ssub8(0x00_05_80_7F, 0x01_05_01_FF);
        // lsb first: 127-(-1)=128, -128-1=-129, 5-5=0, 0-1=-1
        assert_eq!(s.ge.bits(), 0b0101);
        let u = usub8(0x00_05_80_7F, 0x01_05_01_FF);
        assert_eq!(u.ge.bits(), 0b0110);
        assert_eq!(u.value, 0xFF_00_7F_80);
    }

    #[test]
    fn sixteen_bit_ops_set_paired_flags() {
        let r = uadd16(0xFFFF_0001, 0x0001_0001);
        assert_eq!(r.value, 0x0000_0002);
        assert_eq!(r.ge.bits(), 0b1100);
        let s = ssub16(0x0001_0005, 0x0002_0003);
        assert_eq!(s.value, 0xFFFF_0002);
        assert_eq!(s.ge.bits(), 0b0011);
        let u = usub16(0x0001_0005, 0x0002_0003);
        assert_eq!(u.ge.bits(), 0b0011);
        let a = sadd16(0x8000_7FFF, 0x8000_0001);
        assert_eq!(a.value, 0x0000_8000);
        // low lane 32767 + 1 is non-negative, high lane overflows negative
        assert_eq!(a.ge.bits(), 0b0011);
    }

    #[test]
    fn sel_uses_mask_not_hidden_state() {
        let a = 0xAABB_CCDD;
        let b = 0x1122_3344;
        assert_eq!(sel(a, b, GeFlags::ALL), a);
        assert_eq!(sel(a, b, GeFlags::default()), b);
        assert_eq!(sel(a, b, GeFlags::from_bits(0b0101)), 0x11BB_33DD);
    }

    #[test]
    fn saturating_ops_clamp_each_lane() {
        assert_eq!(qadd8(0x7F_80_01_00, 0x01_FF_01_00), 0x7F_80_02_00);
        assert_eq!(qsub8(0x80_7F_00_00, 0x01_FF_01_00), 0x80_7F_FF_00);
        assert_eq!(uqadd8(0xFF_F0_01_00, 0x01_20_01_00), 0xFF_FF_02_00);
        assert_eq!(uqsub8(0x00_10_05_00, 0x01_20_01_00), 0x00_00_04_00);
        assert_eq!(qadd16(0x7FFF_8000, 0x0001_FFFF), 0x7FFF_8000);
        assert_eq!(qsub16(0x8000_0000, 0x0001_0001), 0x8000_FFFF);
        assert_eq!(uqadd16(0xFFFF_0001, 0x0001_0001), 0xFFFF_0002);
        assert_eq!(uqsub16(0x0000_0005, 0x0001_0001), 0x0000_0004);
    }

    #[test]
    fn halving_ops_shift_full_precision_sum() {
        assert_eq!(uhadd8(0xFF_00_03_FF, 0xFF_00_01_01), 0xFF_00_02_80);
        assert_eq!(uhsub8(0x00_00_00_04, 0x01_00_00_02), 0xFF_00_00_01);
        assert_eq!(shadd8(0x80_00_00_7F, 0x80_00_00_7F), 0x80_00_00_7F);
        assert_eq!(shsub8(0x00_00_00_00, 0x01_00_00_00), 0xFF_00_00_00);
        assert_eq!(uhadd16(0xFFFF_0003, 0xFFFF_0001), 0xFFFF_0002);
        assert_eq!(shadd16(0x8000_0002, 0x8000_0004), 0x8000_0003);
        assert_eq!(shsub16(0x0000_0000, 0x0001_0000), 0xFFFF_0000);
        assert_eq!(uhsub16(0x0000_0004, 0x0001_0002), 0xFFFF_0001);
    }

    proptest! {
        #[test]
        fn sel_after_usub8_is_bytewise_max(a in any::<u32>(), b in any::<u32>()) {
            let r = usub8(a, b);
            let max = sel(a, b, r.ge);
            for lane in 0..4 {
                let expected = byte(a, lane).max(byte(b, lane));
                prop_assert_eq!(byte(max, lane), expected);
            }
        }

        #[test]
        fn uadd8_lanes_wrap(a in any::<u32>(), b in any::<u32>()) {
            let r = uadd8(a, b);
            for lane in 0..4 {
                prop_assert_eq!(byte(r.value, lane), byte(a, lane).wrapping_add(byte(b, lane)));
            }
        }

        #[test]
        fn rev_is_involution(x in any::<u32>()) {
            prop_assert_eq!(rev(rev(x)), x);
            prop_assert_eq!(rev16(rev16(x)), x);
            prop_assert_eq!(rbit(rbit(x)), x);
        }

        #[test]
        fn ssat_stays_in_range(v in any::<i32>(), bits in 1u32..=32) {
            let s = i64::from(ssat(v, bits));
            prop_assert!(s >= -(1i64 << (bits - 1)) && s < (1i64 << (bits - 1)));
        }
    }
}
