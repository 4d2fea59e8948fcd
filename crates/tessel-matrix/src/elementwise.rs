//! Elementwise arithmetic.
//!
//! Each binary operation converts both inputs to the output element type
//! and computes there. Integer arithmetic wraps, and integer division by
//! zero yields zero. Either input may be a scalar. The output may be the
//! same view as an input: every element is read before it is written.

use tessel_arena::MemoryStack;
use tessel_array::{ArraySlice, ConstArraySlice};
use tessel_core::{Element, KernelError};

use crate::operand::Operand;

fn zip_with<A, B, U>(
    a: Operand<A>,
    b: Operand<B>,
    out: ArraySlice<U>,
    ms: &mut MemoryStack<'_>,
    op: impl Fn(U, U) -> U,
) -> Result<(), KernelError>
where
    A: Element,
    B: Element,
    U: Element,
{
    out.check(ms)?;
    let shape = out.shape();
    a.check_against(ms, shape)?;
    b.check_against(ms, shape)?;
    let (h, w) = shape;
    for y in 0..h {
        for x in 0..w {
            let lhs: U = a.get(ms, y, x).cast();
            let rhs: U = b.get(ms, y, x).cast();
            out.set(ms, y, x, op(lhs, rhs));
        }
    }
    Ok(())
}

/// `out = a + b`.
pub fn add<A: Element, B: Element, U: Element>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    zip_with(a.into(), b.into(), out.into(), ms, U::add_wrapping)
}

/// `out = a - b`.
pub fn subtract<A: Element, B: Element, U: Element>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    zip_with(a.into(), b.into(), out.into(), ms, U::sub_wrapping)
}

/// `out = a .* b`, the elementwise product.
pub fn dot_multiply<A: Element, B: Element, U: Element>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    zip_with(a.into(), b.into(), out.into(), ms, U::mul_wrapping)
}

/// `out = a ./ b`, the elementwise quotient.
pub fn dot_divide<A: Element, B: Element, U: Element>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    zip_with(a.into(), b.into(), out.into(), ms, U::div_or_zero)
}

/// `out = |a - b|`.
///
/// The difference is taken in the output type with the larger value
/// first, so unsigned outputs do not wrap.
pub fn abs_diff<A: Element, B: Element, U: Element>(
    a: impl Into<Operand<A>>,
    b: impl Into<Operand<B>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    zip_with(a.into(), b.into(), out.into(), ms, |x, y| {
        if x >= y {
            x.sub_wrapping(y)
        } else {
            y.sub_wrapping(x)
        }
    })
}

fn map_f64<T: Element, U: Element>(
    input: ConstArraySlice<T>,
    out: ArraySlice<U>,
    ms: &mut MemoryStack<'_>,
    op: impl Fn(f64) -> f64,
) -> Result<(), KernelError> {
    out.check(ms)?;
    Operand::Slice(input).check_against(ms, out.shape())?;
    let (h, w) = out.shape();
    for y in 0..h {
        for x in 0..w {
            let v = op(input.get(ms, y, x).to_f64());
            out.set(ms, y, x, U::from_f64(v));
        }
    }
    Ok(())
}

/// `out = e^input`, computed in `f64`.
///
/// The output must be a float type.
pub fn exp<T: Element, U: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    if U::IS_INTEGER {
        return Err(KernelError::InvalidParameter {
            reason: "exp requires a float output",
        });
    }
    map_f64(input.into(), out.into(), ms, f64::exp)
}

/// `out = sqrt(input)`, computed in `f64`.
///
/// An integer output truncates toward zero. Negative inputs give NaN, or
/// zero in an integer output.
pub fn sqrt<T: Element, U: Element>(
    input: impl Into<ConstArraySlice<T>>,
    out: impl Into<ArraySlice<U>>,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    map_f64(input.into(), out.into(), ms, f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_arena::AlignedBuffer;
    use tessel_array::Array;

    fn fixture(ms: &mut MemoryStack<'_>) -> (Array<i32>, Array<i32>, Array<i32>) {
        let in1 = Array::<i32>::new(5, 6, ms).unwrap();
        let in2 = Array::<i32>::new(5, 6, ms).unwrap();
        let out = Array::<i32>::new(5, 6, ms).unwrap();
        let v1: Vec<i32> = (0..30).collect();
        let v2: Vec<i32> = (0..30).map(|i| i * 100 + 1).collect();
        in1.copy_from_slice(ms, &v1);
        in2.copy_from_slice(ms, &v2);
        (in1, in2, out)
    }

    fn assert_each(
        ms: &MemoryStack<'_>,
        out: Array<i32>,
        in1: Array<i32>,
        in2: Array<i32>,
        f: impl Fn(i32, i32) -> i32,
    ) {
        for y in 0..5 {
            for x in 0..6 {
                assert_eq!(
                    out.get(ms, y, x),
                    f(in1.get(ms, y, x), in2.get(ms, y, x)),
                    "at ({y}, {x})"
                );
            }
        }
    }

    #[test]
    fn array_array_operations() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (in1, in2, out) = fixture(&mut ms);

        add(in1, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, b| a + b);
        subtract(in1, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, b| a - b);
        dot_multiply(in1, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, b| a * b);
        dot_divide(in1, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, b| a / b);
    }

    #[test]
    fn scalar_on_either_side() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let (in1, in2, out) = fixture(&mut ms);

        add(in1, 5i32, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, _| a + 5);
        add(-4i32, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |_, b| -4 + b);
        subtract(100i32, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |_, b| 100 - b);
        dot_multiply(-2i32, in2, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |_, b| -2 * b);
        dot_divide(in1, 3i32, out, &mut ms).unwrap();
        assert_each(&ms, out, in1, in2, |a, _| a / 3);
    }

    #[test]
    fn integer_division_by_zero_is_zero() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<u8>::new(1, 3, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[10, 20, 30]);
        dot_divide(a, 0u8, a, &mut ms).unwrap();
        assert_eq!(a.row(&ms, 0), &[0, 0, 0]);
    }

    #[test]
    fn integers_wrap_in_the_output_type() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<i32>::new(1, 2, &mut ms).unwrap();
        let out = Array::<u8>::new(1, 2, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[250, 300]);
        add(a, 10i32, out, &mut ms).unwrap();
        // 250 -> 250u8, 300 -> 44u8, then + 10 in u8.
        assert_eq!(out.row(&ms, 0), &[4, 54]);
    }

    #[test]
    fn output_may_alias_input() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<f32>::new(2, 2, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[1.0, 2.0, 3.0, 4.0]);
        dot_multiply(a, a, a, &mut ms).unwrap();
        assert_eq!(a.row(&ms, 1), &[9.0, 16.0]);
    }

    #[test]
    fn transposed_operand_matches_transposed_shape() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<i16>::new(2, 3, &mut ms).unwrap();
        let out = Array::<i16>::new(3, 2, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[1, 2, 3, 4, 5, 6]);
        let at = a.as_const_slice().transpose();
        add(at, 0i16, out, &mut ms).unwrap();
        assert_eq!(out.row(&ms, 0), &[1, 4]);
        assert_eq!(out.row(&ms, 2), &[3, 6]);
        assert_eq!(
            add(a, 0i16, out, &mut ms),
            Err(KernelError::InvalidSize {
                expected: (3, 2),
                found: (2, 3)
            })
        );
    }

    #[test]
    fn exp_matches_reference_values() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let input = Array::<f32>::new(3, 2, &mut ms).unwrap();
        let out = Array::<f32>::new(3, 2, &mut ms).unwrap();
        input.copy_from_slice(&mut ms, &[0.001, 0.01, 0.1, 1.0, 10.0, 3.14159]);
        exp(input, out, &mut ms).unwrap();
        let expected = [
            1.001_000_500_166_71,
            1.010_050_167_084_17,
            1.105_170_918_075_65,
            std::f64::consts::E,
            22_026.465_794_806_7,
            23.140_631_226_955,
        ];
        let got: Vec<f32> = out.as_const_slice().iter(&ms).collect();
        for (&g, e) in got.iter().zip(expected) {
            assert!((f64::from(g) - e).abs() <= e * 1e-4, "{g} vs {e}");
        }
    }

    #[test]
    fn exp_rejects_integer_output() {
        let mut buf = AlignedBuffer::new(512);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<f32>::new(1, 1, &mut ms).unwrap();
        let out = Array::<i32>::new(1, 1, &mut ms).unwrap();
        assert!(matches!(
            exp(a, out, &mut ms),
            Err(KernelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn abs_diff_of_unsigned_does_not_wrap() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let a = Array::<u8>::new(2, 3, &mut ms).unwrap();
        let b = Array::<u8>::new(2, 3, &mut ms).unwrap();
        let out = Array::<u8>::new(2, 3, &mut ms).unwrap();
        a.copy_from_slice(&mut ms, &[0, 10, 200, 255, 7, 7]);
        b.copy_from_slice(&mut ms, &[5, 3, 100, 0, 7, 250]);
        abs_diff(a, b, out, &mut ms).unwrap();
        assert_eq!(out.row(&ms, 0), &[5, 7, 100]);
        assert_eq!(out.row(&ms, 1), &[255, 0, 243]);

        let wide = Array::<i32>::new(2, 3, &mut ms).unwrap();
        abs_diff(a, 128u8, wide, &mut ms).unwrap();
        assert_eq!(wide.row(&ms, 0), &[128, 118, 72]);
        assert_eq!(wide.row(&ms, 1), &[127, 121, 121]);
    }

    #[test]
    fn sqrt_into_float_and_integer_outputs() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let input = Array::<i32>::new(2, 3, &mut ms).unwrap();
        input.copy_from_slice(&mut ms, &[0, 1, 2, 9, 99, -4]);

        let floats = Array::<f64>::new(2, 3, &mut ms).unwrap();
        sqrt(input, floats, &mut ms).unwrap();
        assert_eq!(floats.row(&ms, 0), &[0.0, 1.0, std::f64::consts::SQRT_2]);
        assert_eq!(floats.get(&ms, 1, 0), 3.0);
        assert!((floats.get(&ms, 1, 1) - 9.949_874_371_066_2).abs() < 1e-12);
        assert!(floats.get(&ms, 1, 2).is_nan());

        let ints = Array::<u16>::new(2, 3, &mut ms).unwrap();
        sqrt(input, ints, &mut ms).unwrap();
        assert_eq!(ints.row(&ms, 0), &[0, 1, 1]);
        assert_eq!(ints.row(&ms, 1), &[3, 9, 0]);
    }
}
