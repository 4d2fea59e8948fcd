//! An append-only container of named, typed segments.
//!
//! Each push is one allocation on an internal [`MemoryStack`], so every
//! segment inherits the arena's length header and footer guard. The arena
//! guard only covers the record bookkeeping; a CRC-32 of the names and
//! payload, stored after the payload, covers the contents:
//!
//! ```text
//! [arena header][type name: 32][object name: 32][payload][crc32 u32][pad][arena footer]
//! ```
//!
//! Names are NUL-padded UTF-8 of at most 31 bytes. Typed payloads start
//! with a 16-byte little-endian descriptor:
//!
//! ```text
//! Basic Type Buffer   [kind u8][0; 3][count u32][element size u32][0; 4][elements]
//! Array               [kind u8][0; 3][height u32][width u32][0; 4][rows, packed]
//! String List         [count u32] then per string [len u32][utf-8 bytes]
//! ```

use tessel_arena::{Allocation, MemoryStack};
use tessel_array::Array;
use tessel_core::{Element, ElementKind, KernelError};

use crate::crc::compute_crc32;
use crate::error::CodecError;

/// Bytes reserved for each of the two names.
pub const NAME_BYTES: usize = 32;
/// Bytes of names in front of every payload.
pub const SEGMENT_HEADER_BYTES: usize = 2 * NAME_BYTES;
/// Bytes of the descriptor in front of typed payloads.
pub const DESCRIPTOR_BYTES: usize = 16;
/// Bytes of the content checksum after every payload.
pub const CHECKSUM_BYTES: usize = 4;

const CHECKSUM_SEED: u32 = 0xFFFF_FFFF;

/// Type name of [`SerializedBuffer::push_raw`] segments.
pub const RAW_BUFFER: &str = "Raw Buffer";
/// Type name of [`SerializedBuffer::push_basic_type`] segments.
pub const BASIC_TYPE_BUFFER: &str = "Basic Type Buffer";
/// Type name of [`SerializedBuffer::push_array`] segments.
pub const ARRAY: &str = "Array";
/// Type name of [`SerializedBuffer::push_strings`] segments.
pub const STRING_LIST: &str = "String List";

// ── Layout helpers ──────────────────────────────────────────────

fn encode_name(name: &str) -> Result<[u8; NAME_BYTES], CodecError> {
    if name.len() >= NAME_BYTES || name.as_bytes().contains(&0) {
        return Err(KernelError::InvalidParameter {
            reason: "segment names must be at most 31 bytes with no NUL",
        }
        .into());
    }
    let mut out = [0u8; NAME_BYTES];
    out[..name.len()].copy_from_slice(name.as_bytes());
    Ok(out)
}

fn decode_name(field: &[u8]) -> Option<&str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).ok()
}

fn to_u32(n: usize) -> Result<u32, CodecError> {
    u32::try_from(n).map_err(|_| {
        CodecError::Kernel(KernelError::InvalidParameter {
            reason: "segment field does not fit in u32",
        })
    })
}

fn descriptor(kind: ElementKind, a: u32, b: u32) -> [u8; DESCRIPTOR_BYTES] {
    let mut out = [0u8; DESCRIPTOR_BYTES];
    out[0] = kind.code();
    out[4..8].copy_from_slice(&a.to_le_bytes());
    out[8..12].copy_from_slice(&b.to_le_bytes());
    out
}

/// Descriptor plus packed rows of a `height x width` array of `T`.
fn array_payload_len<T: Element>(height: usize, width: usize) -> Result<usize, CodecError> {
    width
        .checked_mul(std::mem::size_of::<T>())
        .and_then(|row| row.checked_mul(height))
        .and_then(|rows| rows.checked_add(DESCRIPTOR_BYTES))
        .ok_or(CodecError::Kernel(KernelError::InvalidParameter {
            reason: "array too large to serialize",
        }))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let word = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

// ── Container ───────────────────────────────────────────────────

/// A fixed-capacity, append-only sequence of named segments.
pub struct SerializedBuffer<'a> {
    stack: MemoryStack<'a>,
}

impl<'a> SerializedBuffer<'a> {
    /// An empty container over `buffer`.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            stack: MemoryStack::new(buffer),
        }
    }

    /// Reopen the first `len` bytes of `buffer`, as produced by
    /// [`as_bytes`](Self::as_bytes).
    ///
    /// Segments with a damaged guard are kept so that iteration can report
    /// them individually. A record whose header cannot be walked fails the
    /// whole buffer.
    pub fn from_existing(buffer: &'a mut [u8], len: usize) -> Result<Self, CodecError> {
        Ok(Self {
            stack: MemoryStack::recover(buffer, len)?,
        })
    }

    /// Bytes written so far, records included.
    pub fn len(&self) -> usize {
        self.stack.used()
    }

    /// Whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.stack.used() == 0
    }

    /// Total usable bytes.
    pub fn capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// The written prefix, ready to copy into another buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.stack.as_bytes()
    }

    /// The underlying stack, for validating the handles pushes return.
    pub fn stack(&self) -> &MemoryStack<'a> {
        &self.stack
    }

    fn push_segment(
        &mut self,
        type_name: &str,
        object_name: &str,
        payload_len: usize,
        fill: impl FnOnce(&mut [u8]),
    ) -> Result<Allocation, CodecError> {
        let type_field = encode_name(type_name)?;
        let object_field = encode_name(object_name)?;
        let total = payload_len
            .checked_add(SEGMENT_HEADER_BYTES + CHECKSUM_BYTES)
            .ok_or(CodecError::BufferFull {
                requested: usize::MAX,
                available: self.stack.remaining(),
            })?;
        let alloc = self.stack.allocate(total)?;
        let data = self.stack.data_mut(&alloc);
        let (contents, checksum) = data.split_at_mut(total - CHECKSUM_BYTES);
        let (names, payload) = contents.split_at_mut(SEGMENT_HEADER_BYTES);
        names[..NAME_BYTES].copy_from_slice(&type_field);
        names[NAME_BYTES..].copy_from_slice(&object_field);
        fill(payload);
        checksum.copy_from_slice(&compute_crc32(contents, CHECKSUM_SEED).to_le_bytes());
        Ok(alloc)
    }

    /// Append raw bytes.
    ///
    /// Returns the segment's allocation; its payload starts
    /// [`SEGMENT_HEADER_BYTES`] into the allocation.
    pub fn push_raw(&mut self, name: &str, bytes: &[u8]) -> Result<Allocation, CodecError> {
        self.push_segment(RAW_BUFFER, name, bytes.len(), |p| p.copy_from_slice(bytes))
    }

    /// Append a slice of scalars with an element descriptor.
    pub fn push_basic_type<T: Element>(
        &mut self,
        name: &str,
        values: &[T],
    ) -> Result<Allocation, CodecError> {
        let body: &[u8] = bytemuck::cast_slice(values);
        let head = descriptor(
            T::KIND,
            to_u32(values.len())?,
            to_u32(std::mem::size_of::<T>())?,
        );
        self.push_segment(BASIC_TYPE_BUFFER, name, DESCRIPTOR_BYTES + body.len(), |p| {
            p[..DESCRIPTOR_BYTES].copy_from_slice(&head);
            p[DESCRIPTOR_BYTES..].copy_from_slice(body);
        })
    }

    /// Append an array's shape and packed rows. `ms` is the stack that
    /// holds `array`.
    pub fn push_array<T: Element>(
        &mut self,
        name: &str,
        ms: &MemoryStack<'_>,
        array: &Array<T>,
    ) -> Result<Allocation, CodecError> {
        array.check(ms)?;
        let (h, w) = array.shape();
        let head = descriptor(T::KIND, to_u32(h)?, to_u32(w)?);
        let row_bytes = w * std::mem::size_of::<T>();
        let payload_len = array_payload_len::<T>(h, w)?;
        self.push_segment(ARRAY, name, payload_len, |p| {
            p[..DESCRIPTOR_BYTES].copy_from_slice(&head);
            let rows = &mut p[DESCRIPTOR_BYTES..];
            for y in 0..h {
                let src: &[u8] = bytemuck::cast_slice(array.row(ms, y));
                rows[y * row_bytes..(y + 1) * row_bytes].copy_from_slice(src);
            }
        })
    }

    /// Append a list of strings.
    pub fn push_strings(&mut self, name: &str, strings: &[&str]) -> Result<Allocation, CodecError> {
        let count = to_u32(strings.len())?;
        let mut payload_len = 4;
        for s in strings {
            to_u32(s.len())?;
            payload_len += 4 + s.len();
        }
        self.push_segment(STRING_LIST, name, payload_len, |p| {
            p[..4].copy_from_slice(&count.to_le_bytes());
            let mut at = 4;
            for s in strings {
                p[at..at + 4].copy_from_slice(&(s.len() as u32).to_le_bytes());
                at += 4;
                p[at..at + s.len()].copy_from_slice(s.as_bytes());
                at += s.len();
            }
        })
    }

    /// Iterate over the segments in push order.
    ///
    /// A segment whose arena guard or content checksum fails, or whose
    /// names are not readable, comes back as `None`; iteration continues
    /// with the next one.
    pub fn iter(&self) -> Segments<'_> {
        Segments {
            stack: &self.stack,
            inner: self.stack.iter(),
        }
    }
}

impl<'s> IntoIterator for &'s SerializedBuffer<'_> {
    type Item = Option<SegmentRef<'s>>;
    type IntoIter = Segments<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`SerializedBuffer::iter`].
pub struct Segments<'s> {
    stack: &'s MemoryStack<'s>,
    inner: tessel_arena::Allocations<'s>,
}

impl<'s> Iterator for Segments<'s> {
    type Item = Option<SegmentRef<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        let alloc = self.inner.next()?;
        let stack: &'s MemoryStack<'s> = self.stack;
        if let Err(e) = stack.check(&alloc) {
            log::warn!("skipping damaged segment at offset {}: {e}", alloc.offset());
            return Some(None);
        }
        match SegmentRef::parse(alloc, stack.data(&alloc)) {
            Ok(segment) => Some(Some(segment)),
            Err(reason) => {
                log::warn!("skipping segment at offset {}: {reason}", alloc.offset());
                Some(None)
            }
        }
    }
}

// ── Reading segments ────────────────────────────────────────────

/// A borrowed view of one segment.
#[derive(Clone, Copy, Debug)]
pub struct SegmentRef<'b> {
    allocation: Allocation,
    type_name: &'b str,
    object_name: &'b str,
    payload: &'b [u8],
}

impl<'b> SegmentRef<'b> {
    fn parse(allocation: Allocation, data: &'b [u8]) -> Result<Self, &'static str> {
        let Some(split) = data.len().checked_sub(CHECKSUM_BYTES) else {
            return Err("record too short for a segment");
        };
        if split < SEGMENT_HEADER_BYTES {
            return Err("record too short for a segment");
        }
        let (contents, checksum) = data.split_at(split);
        let stored = read_u32(checksum, 0).ok_or("missing checksum")?;
        if compute_crc32(contents, CHECKSUM_SEED) != stored {
            return Err("content checksum mismatch");
        }
        let (names, payload) = contents.split_at(SEGMENT_HEADER_BYTES);
        Ok(Self {
            allocation,
            type_name: decode_name(&names[..NAME_BYTES]).ok_or("type name is not UTF-8")?,
            object_name: decode_name(&names[NAME_BYTES..]).ok_or("object name is not UTF-8")?,
            payload,
        })
    }

    /// The segment's allocation in the container's stack.
    pub fn allocation(&self) -> Allocation {
        self.allocation
    }

    /// What kind of segment this is, such as [`BASIC_TYPE_BUFFER`].
    pub fn type_name(&self) -> &'b str {
        self.type_name
    }

    /// The name given at push time.
    pub fn object_name(&self) -> &'b str {
        self.object_name
    }

    /// Payload length in bytes, descriptor included.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The payload bytes, descriptor included.
    pub fn payload(&self) -> &'b [u8] {
        self.payload
    }

    fn malformed(&self, reason: &'static str) -> CodecError {
        CodecError::MalformedSegment {
            offset: self.allocation.offset(),
            reason,
        }
    }

    fn expect_type(&self, type_name: &'static str) -> Result<(), CodecError> {
        if self.type_name != type_name {
            return Err(self.malformed("segment has a different type name"));
        }
        Ok(())
    }

    /// Check a typed payload's element kind against `T` and split it into
    /// the two descriptor fields and the body.
    fn typed<T: Element>(&self) -> Result<(u32, u32, &'b [u8]), CodecError> {
        if self.payload.len() < DESCRIPTOR_BYTES {
            return Err(self.malformed("payload shorter than its descriptor"));
        }
        let (head, body) = self.payload.split_at(DESCRIPTOR_BYTES);
        let found =
            ElementKind::from_code(head[0]).ok_or_else(|| self.malformed("unknown element kind"))?;
        if found != T::KIND {
            return Err(CodecError::TypeMismatch {
                expected: T::KIND,
                found,
            });
        }
        let a = read_u32(head, 4).ok_or_else(|| self.malformed("truncated descriptor"))?;
        let b = read_u32(head, 8).ok_or_else(|| self.malformed("truncated descriptor"))?;
        Ok((a, b, body))
    }

    /// The elements of a [`BASIC_TYPE_BUFFER`] segment, borrowed in place.
    pub fn as_basic_type<T: Element>(&self) -> Result<&'b [T], CodecError> {
        self.expect_type(BASIC_TYPE_BUFFER)?;
        let (count, size, body) = self.typed::<T>()?;
        if size as usize != std::mem::size_of::<T>() {
            return Err(self.malformed("element size disagrees with element kind"));
        }
        let actual = body.len() / std::mem::size_of::<T>();
        if count as usize != actual || body.len() % std::mem::size_of::<T>() != 0 {
            return Err(CodecError::LengthMismatch {
                declared: count as usize,
                actual,
            });
        }
        bytemuck::try_cast_slice(body)
            .map_err(|_| self.malformed("payload is not aligned for its element type"))
    }

    /// Rebuild an [`ARRAY`] segment as a new array on `scratch`.
    pub fn reconstruct_array<T: Element>(
        &self,
        scratch: &mut MemoryStack<'_>,
    ) -> Result<Array<T>, CodecError> {
        self.expect_type(ARRAY)?;
        let (h, w, body) = self.typed::<T>()?;
        let (h, w) = (h as usize, w as usize);
        let declared = h.checked_mul(w).ok_or_else(|| self.malformed("shape overflows"))?;
        let elem = std::mem::size_of::<T>();
        if body.len() != declared * elem {
            return Err(CodecError::LengthMismatch {
                declared,
                actual: body.len() / elem,
            });
        }
        let out = Array::<T>::new(h, w, scratch)?;
        if declared > 0 {
            for (y, src) in body.chunks_exact(w * elem).enumerate() {
                let dst: &mut [u8] = bytemuck::cast_slice_mut(out.row_mut(scratch, y));
                dst.copy_from_slice(src);
            }
        }
        Ok(out)
    }

    /// The strings of a [`STRING_LIST`] segment.
    ///
    /// The whole list is validated up front, so the returned iterator
    /// yields every declared string.
    pub fn strings(&self) -> Result<Strings<'b>, CodecError> {
        self.expect_type(STRING_LIST)?;
        let count = read_u32(self.payload, 0).ok_or_else(|| self.malformed("missing string count"))?;
        let body = &self.payload[4..];
        let mut at = 0;
        let mut found = 0;
        while at < body.len() {
            let len = read_u32(body, at).ok_or_else(|| self.malformed("truncated string length"))?;
            let start = at + 4;
            let end = start + len as usize;
            let bytes = body
                .get(start..end)
                .ok_or_else(|| self.malformed("string runs past the payload"))?;
            std::str::from_utf8(bytes).map_err(|_| self.malformed("string is not UTF-8"))?;
            at = end;
            found += 1;
        }
        if found != count as usize {
            return Err(CodecError::LengthMismatch {
                declared: count as usize,
                actual: found,
            });
        }
        Ok(Strings {
            body,
            remaining: found,
        })
    }
}

/// Iterator returned by [`SegmentRef::strings`].
#[derive(Clone, Debug)]
pub struct Strings<'b> {
    body: &'b [u8],
    remaining: usize,
}

impl<'b> Iterator for Strings<'b> {
    type Item = &'b str;

    fn next(&mut self) -> Option<&'b str> {
        if self.remaining == 0 {
            return None;
        }
        let len = read_u32(self.body, 0)? as usize;
        let bytes = self.body.get(4..4 + len)?;
        self.body = &self.body[4 + len..];
        self.remaining -= 1;
        std::str::from_utf8(bytes).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Strings<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_arena::AlignedBuffer;

    #[test]
    fn basic_type_segments_in_push_order() {
        let mut buf = AlignedBuffer::new(6000);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        let seg1: Vec<u8> = (0..32).map(|i| i + 1).collect();
        let seg2: Vec<u8> = (0..64).map(|i| 2 * i + 1).collect();
        let seg3: Vec<u8> = (0..128u32).map(|i| (3 * i + 1) as u8).collect();
        let a1 = sb.push_basic_type("segment1", &seg1).unwrap();
        let a2 = sb.push_basic_type("segment2", &seg2).unwrap();
        let a3 = sb.push_basic_type("segment3", &seg3).unwrap();

        let segments: Vec<SegmentRef<'_>> = sb.iter().map(Option::unwrap).collect();
        assert_eq!(segments.len(), 3);
        for (s, (alloc, (name, data))) in segments.iter().zip([
            (a1, ("segment1", &seg1)),
            (a2, ("segment2", &seg2)),
            (a3, ("segment3", &seg3)),
        ]) {
            assert_eq!(s.allocation(), alloc);
            assert_eq!(s.type_name(), BASIC_TYPE_BUFFER);
            assert_eq!(s.object_name(), name);
            assert_eq!(s.len(), DESCRIPTOR_BYTES + data.len());
            assert_eq!(alloc.len(), SEGMENT_HEADER_BYTES + s.len() + CHECKSUM_BYTES);
            assert_eq!(s.as_basic_type::<u8>().unwrap(), data.as_slice());
        }
        assert_eq!(segments[0].len() + SEGMENT_HEADER_BYTES, 48 + 64);
        assert_eq!(segments[2].len() + SEGMENT_HEADER_BYTES, 144 + 64);
    }

    #[test]
    fn typed_reads_check_kind_and_type_name() {
        let mut buf = AlignedBuffer::new(1024);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_basic_type("floats", &[1.5f32, -2.0]).unwrap();
        sb.push_raw("raw", b"abc").unwrap();
        let segs: Vec<_> = sb.iter().flatten().collect();
        assert_eq!(segs[0].as_basic_type::<f32>().unwrap(), &[1.5, -2.0]);
        assert_eq!(
            segs[0].as_basic_type::<i32>().unwrap_err(),
            CodecError::TypeMismatch {
                expected: ElementKind::I32,
                found: ElementKind::F32
            }
        );
        assert_eq!(segs[1].type_name(), RAW_BUFFER);
        assert_eq!(segs[1].payload(), b"abc");
        assert!(matches!(
            segs[1].as_basic_type::<u8>(),
            Err(CodecError::MalformedSegment { .. })
        ));
    }

    #[test]
    fn arrays_round_trip_through_scratch() {
        let mut src = AlignedBuffer::new(1024);
        let mut ms = MemoryStack::new(src.as_bytes_mut());
        let a = Array::<i16>::new(3, 5, &mut ms).unwrap();
        let values: Vec<i16> = (0..15).map(|i| i * 7 - 40).collect();
        a.copy_from_slice(&mut ms, &values);

        let mut buf = AlignedBuffer::new(1024);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_array("a", &ms, &a).unwrap();

        let mut scratch_buf = AlignedBuffer::new(1024);
        let mut scratch = MemoryStack::new(scratch_buf.as_bytes_mut());
        let seg = sb.iter().next().flatten().unwrap();
        assert_eq!(seg.type_name(), ARRAY);
        let b = seg.reconstruct_array::<i16>(&mut scratch).unwrap();
        assert_eq!(b.shape(), (3, 5));
        for y in 0..3 {
            assert_eq!(b.row(&scratch, y), a.row(&ms, y));
        }
        assert!(matches!(
            seg.reconstruct_array::<u16>(&mut scratch),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn array_payload_size_is_overflow_checked() {
        assert_eq!(array_payload_len::<f32>(3, 5), Ok(DESCRIPTOR_BYTES + 60));
        assert!(matches!(
            array_payload_len::<f64>(2, usize::MAX / 8),
            Err(CodecError::Kernel(KernelError::InvalidParameter { .. }))
        ));
        assert!(array_payload_len::<u8>(usize::MAX, 2).is_err());
    }

    #[test]
    fn empty_array_is_serializable() {
        let mut src = AlignedBuffer::new(256);
        let mut ms = MemoryStack::new(src.as_bytes_mut());
        let a = Array::<f64>::new(0, 4, &mut ms).unwrap();
        let mut buf = AlignedBuffer::new(512);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_array("empty", &ms, &a).unwrap();
        let mut scratch_buf = AlignedBuffer::new(256);
        let mut scratch = MemoryStack::new(scratch_buf.as_bytes_mut());
        let seg = sb.iter().next().flatten().unwrap();
        let b = seg.reconstruct_array::<f64>(&mut scratch).unwrap();
        assert_eq!(b.shape(), (0, 4));
    }

    #[test]
    fn string_lists() {
        let mut buf = AlignedBuffer::new(1024);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_strings("labels", &["left", "", "right eye"]).unwrap();
        let seg = sb.iter().next().flatten().unwrap();
        let got: Vec<&str> = seg.strings().unwrap().collect();
        assert_eq!(got, vec!["left", "", "right eye"]);
    }

    #[test]
    fn long_names_are_rejected() {
        let mut buf = AlignedBuffer::new(1024);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        let name = "x".repeat(32);
        assert!(matches!(
            sb.push_raw(&name, b"1"),
            Err(CodecError::Kernel(KernelError::InvalidParameter { .. }))
        ));
        assert!(sb.push_raw(&name[..31], b"1").is_ok());
    }

    #[test]
    fn full_buffer_is_reported_and_leaves_it_intact() {
        let mut buf = AlignedBuffer::new(256);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_raw("first", &[7; 64]).unwrap();
        let used = sb.len();
        assert!(matches!(
            sb.push_raw("second", &[8; 200]),
            Err(CodecError::BufferFull { .. })
        ));
        assert_eq!(sb.len(), used);
        assert_eq!(sb.iter().count(), 1);
    }

    #[test]
    fn blob_moves_between_buffers() {
        let mut buf = AlignedBuffer::new(1024);
        let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
        sb.push_raw("one", &[1, 2, 3]).unwrap();
        sb.push_basic_type("two", &[4u32, 5]).unwrap();

        let mut copy = AlignedBuffer::new(1024);
        let len = sb.len();
        copy.as_bytes_mut()[..len].copy_from_slice(sb.as_bytes());
        let mut reopened = SerializedBuffer::from_existing(copy.as_bytes_mut(), len).unwrap();
        let names: Vec<&str> = reopened.iter().flatten().map(|s| s.object_name()).collect();
        assert_eq!(names, vec!["one", "two"]);

        reopened.push_raw("three", &[6]).unwrap();
        assert_eq!(reopened.iter().count(), 3);
    }

    #[test]
    fn damaged_segment_is_skipped() {
        let mut buf = AlignedBuffer::new(1024);
        let (len, first) = {
            let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
            let a = sb.push_raw("a", &[1; 16]).unwrap();
            sb.push_raw("b", &[2; 16]).unwrap();
            (sb.len(), a)
        };
        // The footer follows the 16-rounded data.
        let footer = first.offset() + first.len().div_ceil(16) * 16;
        buf.as_bytes_mut()[footer] ^= 0xFF;

        let sb = SerializedBuffer::from_existing(buf.as_bytes_mut(), len).unwrap();
        let segs: Vec<Option<SegmentRef<'_>>> = sb.iter().collect();
        assert_eq!(segs.len(), 2);
        assert!(segs[0].is_none());
        assert_eq!(segs[1].map(|s| s.object_name()), Some("b"));
    }

    #[test]
    fn corrupted_contents_are_skipped() {
        let mut buf = AlignedBuffer::new(1024);
        let (len, a, c) = {
            let mut sb = SerializedBuffer::new(buf.as_bytes_mut());
            let a = sb.push_raw("a", &[1; 32]).unwrap();
            sb.push_raw("b", &[2; 64]).unwrap();
            let c = sb.push_basic_type("c", &[3u16; 8]).unwrap();
            (sb.len(), a, c)
        };
        // Last payload byte of "a", and a byte of the object name of "c".
        buf.as_bytes_mut()[a.offset() + SEGMENT_HEADER_BYTES + 31] ^= 0xFF;
        buf.as_bytes_mut()[c.offset() + NAME_BYTES + 5] ^= 0x01;

        let sb = SerializedBuffer::from_existing(buf.as_bytes_mut(), len).unwrap();
        assert!(sb.stack().is_valid());
        let segs: Vec<Option<SegmentRef<'_>>> = sb.iter().collect();
        assert_eq!(segs.len(), 3);
        assert!(segs[0].is_none());
        let b = segs[1].unwrap();
        assert_eq!(b.object_name(), "b");
        assert_eq!(b.payload(), &[2; 64]);
        assert!(segs[2].is_none());
    }
}
