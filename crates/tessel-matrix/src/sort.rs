//! In-place sorting along one axis of an array.
//!
//! [`Axis::Y`] sorts every column down its rows; [`Axis::X`] sorts every
//! row. Only positions inside the (clipped) range move. An optional index
//! array of the same shape receives each element's original position along
//! the sort axis, so `sorted[i] == original[indices[i]]` lane by lane.

use smallvec::SmallVec;
use tessel_arena::MemoryStack;
use tessel_array::Array;
use tessel_core::{Axis, Element, KernelError, SortOrder};

/// Partitions at or below this length are left for the final insertion
/// pass in [`sort`].
pub const DEFAULT_INSERTION_THRESHOLD: usize = 10;

/// One row or column of the array being sorted, with its index lane.
struct Lane<'s, 'm, T: Element> {
    values: Array<T>,
    indices: Option<Array<i32>>,
    axis: Axis,
    fixed: usize,
    order: SortOrder,
    ms: &'s mut MemoryStack<'m>,
}

impl<T: Element> Lane<'_, '_, T> {
    fn position(&self, i: usize) -> (usize, usize) {
        match self.axis {
            Axis::Y => (i, self.fixed),
            Axis::X => (self.fixed, i),
        }
    }

    fn get(&self, i: usize) -> T {
        let (y, x) = self.position(i);
        self.values.get(&*self.ms, y, x)
    }

    /// Whether `a` belongs strictly before `b`.
    fn before(&self, a: T, b: T) -> bool {
        match self.order {
            SortOrder::Ascending => a < b,
            SortOrder::Descending => a > b,
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (pi, pj) = (self.position(i), self.position(j));
        let (vi, vj) = (self.get(i), self.get(j));
        self.values.set(self.ms, pi.0, pi.1, vj);
        self.values.set(self.ms, pj.0, pj.1, vi);
        if let Some(idx) = self.indices {
            let ii = idx.get(&*self.ms, pi.0, pi.1);
            let ij = idx.get(&*self.ms, pj.0, pj.1);
            idx.set(self.ms, pi.0, pi.1, ij);
            idx.set(self.ms, pj.0, pj.1, ii);
        }
    }

    /// Stable insertion sort of `lo..=hi`.
    fn insertion(&mut self, lo: usize, hi: usize) {
        for i in lo + 1..=hi {
            let mut j = i;
            while j > lo && self.before(self.get(j), self.get(j - 1)) {
                self.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    /// Median-of-three quicksort of `lo..=hi` that leaves partitions of at
    /// most `threshold` elements unsorted.
    fn quick(&mut self, lo: usize, hi: usize, threshold: usize) {
        let mut pending: SmallVec<[(usize, usize); 64]> = SmallVec::new();
        pending.push((lo, hi));
        while let Some((lo, hi)) = pending.pop() {
            if hi < lo || hi - lo + 1 <= threshold {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            if self.before(self.get(mid), self.get(lo)) {
                self.swap(mid, lo);
            }
            if self.before(self.get(hi), self.get(lo)) {
                self.swap(hi, lo);
            }
            if self.before(self.get(hi), self.get(mid)) {
                self.swap(hi, mid);
            }
            // Three or fewer elements are now in order.
            if hi - lo < 3 {
                continue;
            }

            let pivot = self.get(mid);
            self.swap(mid, hi - 1);
            let (mut i, mut j) = (lo, hi - 2);
            loop {
                // `lo` holds a value not after the pivot, and `hi - 1` holds
                // the pivot, so neither scan leaves the range.
                while self.before(self.get(i), pivot) {
                    i += 1;
                }
                while self.before(pivot, self.get(j)) {
                    j -= 1;
                }
                if i < j {
                    self.swap(i, j);
                    i += 1;
                    j -= 1;
                } else {
                    break;
                }
            }
            self.swap(i, hi - 1);

            // Smaller side on top keeps the pending stack logarithmic.
            let left = (i > lo).then(|| (lo, i - 1));
            let right = (i + 1, hi);
            if i - lo > hi - i {
                pending.extend(left);
                pending.push(right);
            } else {
                pending.push(right);
                pending.extend(left);
            }
        }
    }
}

/// Validate inputs, clip the range, seed the indices, and run `body` on
/// every lane.
#[allow(clippy::too_many_arguments)]
fn for_each_lane<T: Element>(
    arr: Array<T>,
    indices: Option<Array<i32>>,
    axis: Axis,
    order: SortOrder,
    range_start: usize,
    range_end: usize,
    ms: &mut MemoryStack<'_>,
    mut body: impl FnMut(&mut Lane<'_, '_, T>, usize, usize),
) -> Result<(), KernelError> {
    arr.check(ms)?;
    if let Some(idx) = indices {
        idx.check(ms)?;
        if idx.shape() != arr.shape() {
            return Err(KernelError::InvalidSize {
                expected: arr.shape(),
                found: idx.shape(),
            });
        }
        if idx.shares_storage_with(&arr) {
            return Err(KernelError::AliasedMemory);
        }
        let (h, w) = arr.shape();
        for y in 0..h {
            for x in 0..w {
                let along = match axis {
                    Axis::Y => y,
                    Axis::X => x,
                };
                idx.set(ms, y, x, along as i32);
            }
        }
    }

    let len = arr.size(axis.index());
    let lanes = arr.size(1 - axis.index());
    if len == 0 {
        return Ok(());
    }
    let lo = range_start.min(len - 1);
    let hi = range_end.min(len - 1);
    if lo >= hi {
        return Ok(());
    }
    for fixed in 0..lanes {
        let mut lane = Lane {
            values: arr,
            indices,
            axis,
            fixed,
            order,
            ms: &mut *ms,
        };
        body(&mut lane, lo, hi);
    }
    Ok(())
}

/// Stable insertion sort of positions `range_start..=range_end` along
/// `axis`.
///
/// The range is clipped to the array; pass `0` and `usize::MAX` to sort
/// whole lanes.
pub fn insertion_sort<T: Element>(
    arr: Array<T>,
    indices: Option<Array<i32>>,
    axis: Axis,
    order: SortOrder,
    range_start: usize,
    range_end: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    for_each_lane(arr, indices, axis, order, range_start, range_end, ms, |lane, lo, hi| {
        lane.insertion(lo, hi)
    })
}

/// Quicksort of positions `range_start..=range_end` along `axis`.
///
/// Partitioning uses the median of the first, middle, and last elements
/// and stops at partitions of `insertion_threshold` elements or fewer. A
/// final insertion pass then finishes each lane. The result is not stable.
///
/// A threshold of `0` skips partitioning and runs [`insertion_sort`] on
/// the range, which is stable.
#[allow(clippy::too_many_arguments)]
pub fn quick_sort<T: Element>(
    arr: Array<T>,
    indices: Option<Array<i32>>,
    axis: Axis,
    order: SortOrder,
    range_start: usize,
    range_end: usize,
    insertion_threshold: usize,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    for_each_lane(arr, indices, axis, order, range_start, range_end, ms, |lane, lo, hi| {
        if insertion_threshold > 0 {
            lane.quick(lo, hi, insertion_threshold);
        }
        if insertion_threshold != 1 {
            lane.insertion(lo, hi);
        }
    })
}

/// Sort whole lanes along `axis` with [`quick_sort`] and
/// [`DEFAULT_INSERTION_THRESHOLD`].
pub fn sort<T: Element>(
    arr: Array<T>,
    indices: Option<Array<i32>>,
    axis: Axis,
    order: SortOrder,
    ms: &mut MemoryStack<'_>,
) -> Result<(), KernelError> {
    quick_sort(
        arr,
        indices,
        axis,
        order,
        0,
        usize::MAX,
        DEFAULT_INSERTION_THRESHOLD,
        ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_arena::AlignedBuffer;

    const DATA: [i32; 15] = [81, 10, 16, 91, 28, 97, 13, 55, 96, 91, 96, 49, 63, 96, 80];

    fn flat<T: Element>(ms: &MemoryStack<'_>, a: Array<T>) -> Vec<T> {
        a.as_const_slice().iter(ms).collect()
    }

    fn zero_based(one_based: [i32; 15]) -> Vec<i32> {
        one_based.iter().map(|v| v - 1).collect()
    }

    fn check_case(axis: Axis, order: SortOrder, values: [i32; 15], indices: [i32; 15]) {
        let mut buf = AlignedBuffer::new(2048);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let arr = Array::<i32>::new(5, 3, &mut ms).unwrap();
        let idx = Array::<i32>::new(5, 3, &mut ms).unwrap();

        arr.copy_from_slice(&mut ms, &DATA);
        sort(arr, Some(idx), axis, order, &mut ms).unwrap();
        assert_eq!(flat(&ms, arr), values);
        assert_eq!(flat(&ms, idx), zero_based(indices));

        arr.copy_from_slice(&mut ms, &DATA);
        insertion_sort(arr, None, axis, order, 0, usize::MAX, &mut ms).unwrap();
        assert_eq!(flat(&ms, arr), values);
    }

    #[test]
    fn columns_descending() {
        check_case(
            Axis::Y,
            SortOrder::Descending,
            [91, 96, 97, 91, 96, 96, 81, 55, 80, 63, 28, 49, 13, 10, 16],
            [2, 4, 2, 4, 5, 3, 1, 3, 5, 5, 2, 4, 3, 1, 1],
        );
    }

    #[test]
    fn columns_ascending() {
        check_case(
            Axis::Y,
            SortOrder::Ascending,
            [13, 10, 16, 63, 28, 49, 81, 55, 80, 91, 96, 96, 91, 96, 97],
            [3, 1, 1, 5, 2, 4, 1, 3, 5, 2, 4, 3, 4, 5, 2],
        );
    }

    #[test]
    fn rows_descending() {
        check_case(
            Axis::X,
            SortOrder::Descending,
            [81, 16, 10, 97, 91, 28, 96, 55, 13, 96, 91, 49, 96, 80, 63],
            [1, 3, 2, 3, 1, 2, 3, 2, 1, 2, 1, 3, 2, 3, 1],
        );
    }

    #[test]
    fn rows_ascending() {
        check_case(
            Axis::X,
            SortOrder::Ascending,
            [10, 16, 81, 28, 91, 97, 13, 55, 96, 49, 91, 96, 63, 80, 96],
            [2, 3, 1, 2, 1, 3, 1, 2, 3, 3, 1, 2, 1, 3, 2],
        );
    }

    #[test]
    fn range_leaves_outside_untouched() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let arr = Array::<u8>::new(1, 6, &mut ms).unwrap();
        arr.copy_from_slice(&mut ms, &[9, 8, 7, 6, 5, 4]);
        insertion_sort(arr, None, Axis::X, SortOrder::Ascending, 1, 3, &mut ms).unwrap();
        assert_eq!(arr.row(&ms, 0), &[9, 6, 7, 8, 5, 4]);
        // Clipped: the end is past the last column.
        insertion_sort(arr, None, Axis::X, SortOrder::Ascending, 4, 100, &mut ms).unwrap();
        assert_eq!(arr.row(&ms, 0), &[9, 6, 7, 8, 4, 5]);
    }

    #[test]
    fn quicksort_with_small_threshold_sorts_long_lanes() {
        let mut buf = AlignedBuffer::new(4096);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let arr = Array::<i16>::new(1, 40, &mut ms).unwrap();
        let idx = Array::<i32>::new(1, 40, &mut ms).unwrap();
        let data: Vec<i16> = (0..40).map(|i| ((i * 37) % 41) as i16 - 20).collect();
        arr.copy_from_slice(&mut ms, &data);
        quick_sort(arr, Some(idx), Axis::X, SortOrder::Ascending, 0, 39, 1, &mut ms).unwrap();
        let sorted = flat(&ms, arr);
        let mut expected = data.clone();
        expected.sort();
        assert_eq!(sorted, expected);
        for (i, &src) in flat(&ms, idx).iter().enumerate() {
            assert_eq!(sorted[i], data[src as usize]);
        }
    }

    #[test]
    fn zero_threshold_is_a_stable_insertion_sort() {
        let mut buf = AlignedBuffer::new(2048);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let arr = Array::<i32>::new(5, 3, &mut ms).unwrap();
        let idx = Array::<i32>::new(5, 3, &mut ms).unwrap();
        arr.copy_from_slice(&mut ms, &DATA);
        quick_sort(arr, Some(idx), Axis::Y, SortOrder::Descending, 0, 4, 0, &mut ms).unwrap();
        let values = flat(&ms, arr);
        let order = flat(&ms, idx);

        arr.copy_from_slice(&mut ms, &DATA);
        insertion_sort(arr, Some(idx), Axis::Y, SortOrder::Descending, 0, 4, &mut ms).unwrap();
        assert_eq!(values, flat(&ms, arr));
        assert_eq!(order, flat(&ms, idx));
        assert_eq!(arr.row(&ms, 0), &[91, 96, 97]);
    }

    #[test]
    fn mismatched_indices_are_rejected() {
        let mut buf = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(buf.as_bytes_mut());
        let arr = Array::<f32>::new(2, 3, &mut ms).unwrap();
        let idx = Array::<i32>::new(3, 2, &mut ms).unwrap();
        assert_eq!(
            sort(arr, Some(idx), Axis::X, SortOrder::Ascending, &mut ms),
            Err(KernelError::InvalidSize {
                expected: (2, 3),
                found: (3, 2)
            })
        );
    }
}
