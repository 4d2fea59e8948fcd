//! Storable scalar types and numeric conversions between them.
//!
//! [`Element`] is implemented for the fixed-width integers and both float
//! widths. Arithmetic through the trait follows the embedded target's
//! behaviour: integers wrap, integer division by zero yields zero, and
//! [`Element::cast`] narrows and widens with `as` semantics. The
//! saturating forms ([`round`], [`saturate_cast`]) clamp to the
//! destination range instead.

use std::fmt;

use bytemuck::Pod;

/// Tag identifying an [`Element`] type at runtime.
///
/// Used by the serialized container to record which type a payload holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `u8`
    U8,
    /// `i8`
    I8,
    /// `u16`
    U16,
    /// `i16`
    I16,
    /// `u32`
    U32,
    /// `i32`
    I32,
    /// `u64`
    U64,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ElementKind {
    /// Stable one-byte tag for this kind.
    pub fn code(self) -> u8 {
        match self {
            Self::U8 => 1,
            Self::I8 => 2,
            Self::U16 => 3,
            Self::I16 => 4,
            Self::U32 => 5,
            Self::I32 => 6,
            Self::U64 => 7,
            Self::I64 => 8,
            Self::F32 => 9,
            Self::F64 => 10,
        }
    }

    /// Decode a tag written by [`ElementKind::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::U8,
            2 => Self::I8,
            3 => Self::U16,
            4 => Self::I16,
            5 => Self::U32,
            6 => Self::I32,
            7 => Self::U64,
            8 => Self::I64,
            9 => Self::F32,
            10 => Self::F64,
            _ => return None,
        })
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A scalar type that can live in arena-backed arrays.
///
/// The `Pod` bound lets arrays reinterpret aligned arena bytes as `[Self]`
/// without copying.
pub trait Element:
    Pod + PartialOrd + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
    /// Runtime tag for this type.
    const KIND: ElementKind;
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;
    /// Smallest finite value.
    const MIN: Self;
    /// Largest finite value.
    const MAX: Self;
    /// Whether the type is an integer.
    const IS_INTEGER: bool;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;
    /// Widen to `i128`. Floats truncate toward zero.
    fn to_i128(self) -> i128;
    /// Convert with `as` semantics: integers truncate toward zero and
    /// saturate, NaN becomes zero.
    fn from_f64(v: f64) -> Self;
    /// Convert with `as` semantics: integers wrap.
    fn from_i128(v: i128) -> Self;
    /// Round half away from zero, then clamp into range. Floats convert
    /// without rounding.
    fn saturate_from_f64(v: f64) -> Self;
    /// Clamp into range.
    fn saturate_from_i128(v: i128) -> Self;

    /// Addition; integers wrap.
    fn add_wrapping(self, rhs: Self) -> Self;
    /// Subtraction; integers wrap.
    fn sub_wrapping(self, rhs: Self) -> Self;
    /// Multiplication; integers wrap.
    fn mul_wrapping(self, rhs: Self) -> Self;
    /// Division; integer division by zero yields zero.
    fn div_or_zero(self, rhs: Self) -> Self;

    /// Convert to another element type with `as` semantics.
    #[inline]
    fn cast<U: Element>(self) -> U {
        if Self::IS_INTEGER {
            U::from_i128(self.to_i128())
        } else {
            U::from_f64(self.to_f64())
        }
    }
}

macro_rules! impl_integer_element {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const IS_INTEGER: bool = true;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn to_i128(self) -> i128 {
                self as i128
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn from_i128(v: i128) -> Self {
                v as $t
            }
            #[inline]
            fn saturate_from_f64(v: f64) -> Self {
                v.round() as $t
            }
            #[inline]
            fn saturate_from_i128(v: i128) -> Self {
                v.clamp(<$t>::MIN as i128, <$t>::MAX as i128) as $t
            }
            #[inline]
            fn add_wrapping(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            #[inline]
            fn sub_wrapping(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }
            #[inline]
            fn mul_wrapping(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            #[inline]
            fn div_or_zero(self, rhs: Self) -> Self {
                self.checked_div(rhs).unwrap_or(0)
            }
        }
    )*};
}

macro_rules! impl_float_element {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const IS_INTEGER: bool = false;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn to_i128(self) -> i128 {
                self as i128
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn from_i128(v: i128) -> Self {
                v as $t
            }
            #[inline]
            fn saturate_from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn saturate_from_i128(v: i128) -> Self {
                v as $t
            }
            #[inline]
            fn add_wrapping(self, rhs: Self) -> Self {
                self + rhs
            }
            #[inline]
            fn sub_wrapping(self, rhs: Self) -> Self {
                self - rhs
            }
            #[inline]
            fn mul_wrapping(self, rhs: Self) -> Self {
                self * rhs
            }
            #[inline]
            fn div_or_zero(self, rhs: Self) -> Self {
                self / rhs
            }
        }
    )*};
}

impl_integer_element!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
);
impl_float_element!(f32 => F32, f64 => F64);

/// Round half away from zero into `T`, saturating at its limits.
///
/// For float destinations the value is rounded and then narrowed.
#[inline]
pub fn round<T: Element>(v: f64) -> T {
    T::saturate_from_f64(v.round())
}

/// Convert `value` into `T`, clamping to `T`'s range.
///
/// Integer sources clamp exactly. Float sources are rounded half away from
/// zero before clamping when `T` is an integer.
#[inline]
pub fn saturate_cast<T: Element, U: Element>(value: U) -> T {
    if U::IS_INTEGER {
        T::saturate_from_i128(value.to_i128())
    } else {
        T::saturate_from_f64(value.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round::<i32>(-1.6), -2);
        assert_eq!(round::<i32>(-1.1), -1);
        assert_eq!(round::<i32>(0.0), 0);
        assert_eq!(round::<i32>(1.1), 1);
        assert_eq!(round::<i32>(1.6), 2);
        assert_eq!(round::<i32>(2.5), 3);
        assert_eq!(round::<i32>(-2.5), -3);
    }

    #[test]
    fn round_into_unsigned_clamps_negatives() {
        assert_eq!(round::<u32>(-1.6), 0);
        assert_eq!(round::<u64>(-1.1), 0);
        assert_eq!(round::<u64>(1.6), 2);
    }

    #[test]
    fn round_into_float_keeps_type() {
        assert_eq!(round::<f32>(-1.6), -2.0);
        assert_eq!(round::<f64>(1.1), 1.0);
    }

    #[test]
    fn saturate_cast_into_u8() {
        assert_eq!(saturate_cast::<u8, i8>(-128), 0);
        assert_eq!(saturate_cast::<u8, i8>(0x7F), 0x7F);
        assert_eq!(saturate_cast::<u8, u16>(500), 0xFF);
        assert_eq!(saturate_cast::<u8, i16>(-128), 0);
        assert_eq!(saturate_cast::<u8, i64>(500), 0xFF);
        assert_eq!(saturate_cast::<u8, f32>(-128.0), 0);
        assert_eq!(saturate_cast::<u8, f64>(500.0), 0xFF);
    }

    #[test]
    fn saturate_cast_into_i8() {
        assert_eq!(saturate_cast::<i8, u8>(0xFF), 0x7F);
        assert_eq!(saturate_cast::<i8, i16>(-500), -128);
        assert_eq!(saturate_cast::<i8, u64>(500), 0x7F);
        assert_eq!(saturate_cast::<i8, f32>(-500.0), -128);
    }

    #[test]
    fn saturate_cast_into_16_bit() {
        assert_eq!(saturate_cast::<u16, u32>(500_000), 0xFFFF);
        assert_eq!(saturate_cast::<u16, i16>(32767), 32767);
        assert_eq!(saturate_cast::<i16, u16>(0xFFFF), 32767);
        assert_eq!(saturate_cast::<i16, i32>(-500_000), -32768);
        assert_eq!(saturate_cast::<i16, f64>(500_000.0), 32767);
    }

    #[test]
    fn saturate_cast_into_32_bit() {
        assert_eq!(saturate_cast::<u32, u64>(5_000_000_000), 0xFFFF_FFFF);
        assert_eq!(saturate_cast::<u32, i64>(-128), 0);
        assert_eq!(saturate_cast::<u32, f32>(5_000_000_000.0), 0xFFFF_FFFF);
        assert_eq!(saturate_cast::<i32, u64>(5_000_000_000), i32::MAX);
        assert_eq!(saturate_cast::<i32, i64>(-5_000_000_000), i32::MIN);
        assert_eq!(saturate_cast::<i32, f64>(-5_000_000_000.0), i32::MIN);
    }

    #[test]
    fn cast_wraps_like_as() {
        assert_eq!(300i32.cast::<u8>(), 44);
        assert_eq!((-1i16).cast::<u16>(), 0xFFFF);
        assert_eq!(2.9f32.cast::<i32>(), 2);
        assert_eq!((-2.9f64).cast::<i32>(), -2);
        assert_eq!(7u8.cast::<f32>(), 7.0);
    }

    #[test]
    fn integer_division_by_zero_is_zero() {
        assert_eq!(10i32.div_or_zero(0), 0);
        assert_eq!(10u8.div_or_zero(3), 3);
        assert_eq!((-7i32).div_or_zero(2), -3);
    }

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(250u8.add_wrapping(10), 4);
        assert_eq!(0u8.sub_wrapping(1), 255);
        assert_eq!(i16::MAX.mul_wrapping(2), -2);
    }

    #[test]
    fn kind_codes_round_trip_and_sizes_match() {
        for kind in [
            ElementKind::U8,
            ElementKind::I8,
            ElementKind::U16,
            ElementKind::I16,
            ElementKind::U32,
            ElementKind::I32,
            ElementKind::U64,
            ElementKind::I64,
            ElementKind::F32,
            ElementKind::F64,
        ] {
            assert_eq!(ElementKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ElementKind::from_code(0), None);
        assert_eq!(<f64 as Element>::KIND.size(), std::mem::size_of::<f64>());
        assert_eq!(<i16 as Element>::KIND.size(), std::mem::size_of::<i16>());
    }

    proptest! {
        #[test]
        fn saturate_cast_i32_to_u8_matches_clamp(v in any::<i32>()) {
            let expected = v.clamp(0, 255) as u8;
            prop_assert_eq!(saturate_cast::<u8, i32>(v), expected);
        }

        #[test]
        fn saturate_cast_is_identity_within_range(v in any::<i16>()) {
            prop_assert_eq!(saturate_cast::<i32, i16>(v), v as i32);
            prop_assert_eq!(saturate_cast::<i16, i32>(v as i32), v);
        }
    }
}
