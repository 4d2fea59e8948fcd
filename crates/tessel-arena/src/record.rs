//! On-buffer allocation record layout.

/// Alignment of every allocation's data, in bytes.
pub const ALIGNMENT: usize = 16;

/// Bytes of header written immediately before each allocation's data.
pub const HEADER_BYTES: usize = 8;

/// Bytes of guard footer written after each allocation's rounded data.
pub const FOOTER_BYTES: usize = 4;

const FOOTER_MAGIC: u32 = 0x5EED_F00D;

/// Round `n` up to a multiple of `align` (a power of two).
#[inline]
pub(crate) fn round_up(n: usize, align: usize) -> Option<usize> {
    n.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Where a record starting at a given cursor lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    pub data: usize,
    pub footer: usize,
    pub end: usize,
}

impl Placement {
    /// Place a `size`-byte record at `cursor`. `None` on arithmetic overflow.
    pub fn at(cursor: usize, size: usize) -> Option<Self> {
        let data = round_up(cursor.checked_add(HEADER_BYTES)?, ALIGNMENT)?;
        let footer = data.checked_add(round_up(size, ALIGNMENT)?)?;
        let end = footer.checked_add(FOOTER_BYTES)?;
        Some(Self { data, footer, end })
    }

    /// The placement of an existing record whose data begins at `data`.
    pub fn of_data(data: usize, size: usize) -> Option<Self> {
        let footer = data.checked_add(round_up(size, ALIGNMENT)?)?;
        let end = footer.checked_add(FOOTER_BYTES)?;
        Some(Self { data, footer, end })
    }

    pub fn header(&self) -> usize {
        self.data - HEADER_BYTES
    }
}

/// The header fields of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub size: u32,
    pub serial: u32,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_BYTES] {
        let mut out = [0u8; HEADER_BYTES];
        out[..4].copy_from_slice(&self.size.to_le_bytes());
        out[4..].copy_from_slice(&self.serial.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let size = u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?);
        let serial = u32::from_le_bytes(bytes.get(4..8)?.try_into().ok()?);
        Some(Self { size, serial })
    }

    /// The footer word that must follow a record with this header.
    pub fn footer(&self) -> [u8; FOOTER_BYTES] {
        (FOOTER_MAGIC ^ self.size ^ self.serial.rotate_left(16)).to_le_bytes()
    }
}

/// Decode the record that starts at `cursor` within the used bytes.
///
/// Returns `None` when the header is implausible: a zero size, or a record
/// that would extend past the end of `used`.
pub(crate) fn read_record(used: &[u8], cursor: usize) -> Option<(Placement, Header)> {
    let data = round_up(cursor.checked_add(HEADER_BYTES)?, ALIGNMENT)?;
    let header = Header::decode(used.get(data - HEADER_BYTES..data)?)?;
    if header.size == 0 {
        return None;
    }
    let place = Placement::of_data(data, header.size as usize)?;
    (place.end <= used.len()).then_some((place, header))
}

/// Whether the footer after `place` still matches `header`.
pub(crate) fn footer_intact(used: &[u8], place: Placement, header: Header) -> bool {
    used.get(place.footer..place.end) == Some(&header.footer()[..])
}
