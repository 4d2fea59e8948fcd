//! The guarded bump allocator.

use std::fmt;

use tessel_core::StackId;

use crate::config::StackConfig;
use crate::error::ArenaError;
use crate::handle::Allocation;
use crate::record::{
    footer_intact, read_record, Header, Placement, ALIGNMENT, FOOTER_BYTES, HEADER_BYTES,
};
use crate::scope::{Checkpoint, StackScope};

/// A fixed-capacity bump allocator over a borrowed byte buffer.
///
/// Allocations are carved from the front of the buffer in order and are
/// released only by rewinding the cursor: through a [`StackScope`], a
/// [`Checkpoint`], or by shrinking the topmost block with
/// [`reallocate`](Self::reallocate). The stack never touches memory outside
/// the buffer it was given.
///
/// Offsets are measured from the stack's origin, the first 16-aligned byte
/// of the buffer, so every allocation is 16-aligned in absolute terms.
pub struct MemoryStack<'a> {
    /// Backing bytes, starting at the aligned origin.
    buffer: &'a mut [u8],
    /// Bump cursor: bytes consumed from the origin.
    used: usize,
    id: StackId,
    /// Serial for the next allocation. Never rewinds.
    next_serial: u32,
    config: StackConfig,
}

impl<'a> MemoryStack<'a> {
    /// Create an empty stack over `buffer` with the default configuration.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::with_config(buffer, StackConfig::default())
    }

    /// Create an empty stack over `buffer`.
    ///
    /// Leading bytes before the first 16-aligned address are skipped. A
    /// buffer larger than 4 GiB is truncated, since offsets are stored as
    /// `u32`.
    pub fn with_config(buffer: &'a mut [u8], config: StackConfig) -> Self {
        Self {
            buffer: aligned_origin(buffer),
            used: 0,
            id: StackId::next(),
            next_serial: 1,
            config,
        }
    }

    /// Reopen a buffer whose first `used` bytes already hold allocation
    /// records, for example a blob written by another stack.
    ///
    /// Every record is walked and its guards checked. Allocations made
    /// afterwards are appended after the existing ones.
    pub fn from_existing(buffer: &'a mut [u8], used: usize) -> Result<Self, ArenaError> {
        Self::reopen(buffer, used, true)
    }

    /// Like [`from_existing`](Self::from_existing), but records whose
    /// footer guard is damaged are kept and logged instead of failing the
    /// whole buffer. [`check`](Self::check) still reports them as
    /// [`ArenaError::Corrupted`], so callers can skip them one by one.
    ///
    /// A header that cannot be walked past is still an error.
    pub fn recover(buffer: &'a mut [u8], used: usize) -> Result<Self, ArenaError> {
        Self::reopen(buffer, used, false)
    }

    fn reopen(buffer: &'a mut [u8], used: usize, strict: bool) -> Result<Self, ArenaError> {
        let buffer = aligned_origin(buffer);
        if used > buffer.len() {
            return Err(ArenaError::CapacityExceeded {
                requested: used,
                available: buffer.len(),
            });
        }
        let records = &buffer[..used];
        let mut cursor = 0;
        let mut max_serial = 0;
        while cursor < used {
            let (place, header) = read_record(records, cursor).ok_or_else(|| {
                log::error!("implausible allocation header after offset {cursor}");
                ArenaError::Corrupted { offset: cursor }
            })?;
            if !footer_intact(records, place, header) {
                if strict {
                    log::error!("allocation footer corrupted at offset {}", place.data);
                    return Err(ArenaError::Corrupted { offset: place.data });
                }
                log::warn!("keeping allocation with corrupted footer at offset {}", place.data);
            }
            max_serial = max_serial.max(header.serial);
            cursor = place.end;
        }
        Ok(Self {
            buffer,
            used,
            id: StackId::next(),
            next_serial: max_serial.wrapping_add(1),
            config: StackConfig::default(),
        })
    }

    /// This stack's provenance id.
    pub fn id(&self) -> StackId {
        self.id
    }

    /// The configuration the stack was built with.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Usable bytes from the aligned origin.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes consumed, including headers, footers, and padding.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes not yet consumed. Overhead means not all of it is allocatable;
    /// see [`largest_possible_allocation`](Self::largest_possible_allocation).
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.used
    }

    /// The consumed prefix of the buffer, records included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.used]
    }

    /// The largest `size` that a following [`allocate`](Self::allocate)
    /// would satisfy. Zero when nothing fits.
    pub fn largest_possible_allocation(&self) -> usize {
        let Some(place) = Placement::at(self.used, 0) else {
            return 0;
        };
        let cap = self.capacity();
        if place.data + FOOTER_BYTES > cap {
            return 0;
        }
        (cap - place.data - FOOTER_BYTES) / ALIGNMENT * ALIGNMENT
    }

    /// Allocate `size` bytes with 16-byte alignment.
    pub fn allocate(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        let place = Placement::at(self.used, size)
            .filter(|p| p.end <= self.capacity())
            .ok_or_else(|| {
                let available = self.largest_possible_allocation();
                log::debug!(
                    "{}: allocation of {size} bytes failed, {available} available",
                    self.id
                );
                ArenaError::CapacityExceeded {
                    requested: size,
                    available,
                }
            })?;

        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        // Fits in u32: `end` is bounded by a capacity of at most u32::MAX.
        let header = Header {
            size: size as u32,
            serial,
        };
        self.write_record(place, header);
        if self.config.zero_allocations {
            self.buffer[place.data..place.footer].fill(0);
        }
        self.used = place.end;

        Ok(Allocation {
            stack: self.id,
            offset: place.data as u32,
            len: header.size,
            serial,
        })
    }

    /// Shrink the topmost allocation in place.
    ///
    /// The returned handle has the same offset and the new length; the old
    /// handle is stale afterwards. Growing is not supported, and neither is
    /// resizing any block other than the most recent one.
    pub fn reallocate(
        &mut self,
        alloc: &Allocation,
        new_size: usize,
    ) -> Result<Allocation, ArenaError> {
        self.check(alloc)?;
        let current = Placement::of_data(alloc.offset(), alloc.len())
            .ok_or(ArenaError::StaleAllocation {
                offset: alloc.offset(),
            })?;
        if current.end != self.used {
            log::debug!(
                "{}: reallocate of non-topmost block at offset {}",
                self.id,
                alloc.offset()
            );
            return Err(ArenaError::NotTopmost {
                offset: alloc.offset(),
            });
        }
        if new_size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        if new_size > alloc.len() {
            return Err(ArenaError::GrowNotSupported {
                current: alloc.len(),
                requested: new_size,
            });
        }

        let place = Placement::of_data(alloc.offset(), new_size).ok_or(
            ArenaError::StaleAllocation {
                offset: alloc.offset(),
            },
        )?;
        let header = Header {
            size: new_size as u32,
            serial: alloc.serial,
        };
        self.write_record(place, header);
        self.used = place.end;

        Ok(Allocation {
            len: header.size,
            ..*alloc
        })
    }

    /// Validate one handle against this stack.
    ///
    /// Fails with [`ArenaError::ForeignStack`] for a handle issued by a
    /// different stack, [`ArenaError::StaleAllocation`] for one whose memory
    /// was rewound or resized, and [`ArenaError::Corrupted`] when the
    /// record's guards were overwritten.
    pub fn check(&self, alloc: &Allocation) -> Result<(), ArenaError> {
        if alloc.stack != self.id {
            return Err(ArenaError::ForeignStack {
                expected: self.id,
                found: alloc.stack,
            });
        }
        let offset = alloc.offset();
        let stale = ArenaError::StaleAllocation { offset };
        let records = self.as_bytes();
        let place = Placement::of_data(offset, alloc.len())
            .filter(|p| offset >= HEADER_BYTES && p.end <= self.used)
            .ok_or(stale.clone())?;
        let header = Header::decode(&records[place.header()..place.data]).ok_or(stale.clone())?;
        if header.serial != alloc.serial {
            return Err(stale);
        }
        if header.size != alloc.len {
            // Same serial, different size: either the block was shrunk after
            // this handle was taken, or the header itself was overwritten.
            let resized = Placement::of_data(offset, header.size as usize)
                .filter(|own| own.end <= self.used)
                .is_some_and(|own| footer_intact(records, own, header));
            if resized {
                return Err(stale);
            }
            log::error!("{}: allocation header corrupted at offset {offset}", self.id);
            return Err(ArenaError::Corrupted { offset });
        }
        if !footer_intact(records, place, header) {
            log::error!("{}: allocation footer corrupted at offset {offset}", self.id);
            return Err(ArenaError::Corrupted { offset });
        }
        Ok(())
    }

    /// The bytes of an allocation.
    ///
    /// No validation is done beyond bounds; call [`check`](Self::check)
    /// first if the handle's provenance is uncertain. A handle that falls
    /// outside the buffer yields an empty slice.
    pub fn data(&self, alloc: &Allocation) -> &[u8] {
        self.buffer.get(alloc.offset()..alloc.end()).unwrap_or(&[])
    }

    /// The bytes of an allocation, mutably. See [`data`](Self::data).
    pub fn data_mut(&mut self, alloc: &Allocation) -> &mut [u8] {
        self.buffer
            .get_mut(alloc.offset()..alloc.end())
            .unwrap_or(&mut [])
    }

    /// Walk every allocation record and check its guards.
    ///
    /// Returns the data offset of the first damaged record.
    pub fn verify(&self) -> Result<(), ArenaError> {
        let records = self.as_bytes();
        let mut cursor = 0;
        while cursor < self.used {
            let Some((place, header)) = read_record(records, cursor) else {
                log::error!("{}: implausible allocation header after offset {cursor}", self.id);
                return Err(ArenaError::Corrupted { offset: cursor });
            };
            if !footer_intact(records, place, header) {
                log::error!(
                    "{}: allocation footer corrupted at offset {}",
                    self.id,
                    place.data
                );
                return Err(ArenaError::Corrupted { offset: place.data });
            }
            cursor = place.end;
        }
        Ok(())
    }

    /// Whether the stack is in a usable state.
    ///
    /// Always checks the cursor invariant. The full guard scan of
    /// [`verify`](Self::verify) runs only when
    /// [`StackConfig::verify_guards`] is set.
    pub fn is_valid(&self) -> bool {
        if self.used > self.capacity() {
            return false;
        }
        !self.config.verify_guards || self.verify().is_ok()
    }

    /// Iterate over the live allocations in allocation order.
    pub fn iter(&self) -> Allocations<'_> {
        Allocations {
            records: self.as_bytes(),
            cursor: 0,
            stack: self.id,
        }
    }

    /// Record the current cursor.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            used: self.used,
            stack: self.id,
        }
    }

    /// Rewind to a checkpoint taken on this stack.
    ///
    /// Every allocation made after the checkpoint becomes stale. Restoring
    /// never moves the cursor forward.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), ArenaError> {
        if checkpoint.stack != self.id {
            return Err(ArenaError::ForeignStack {
                expected: self.id,
                found: checkpoint.stack,
            });
        }
        self.rewind(checkpoint.used);
        Ok(())
    }

    /// Open a scratch scope. The cursor is restored when the guard drops.
    pub fn scope(&mut self) -> StackScope<'_, 'a> {
        StackScope::new(self)
    }

    pub(crate) fn rewind(&mut self, used: usize) {
        self.used = self.used.min(used);
    }

    fn write_record(&mut self, place: Placement, header: Header) {
        self.buffer[place.header()..place.data].copy_from_slice(&header.encode());
        self.buffer[place.footer..place.end].copy_from_slice(&header.footer());
    }
}

impl fmt::Debug for MemoryStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStack")
            .field("id", &self.id)
            .field("capacity", &self.capacity())
            .field("used", &self.used)
            .finish()
    }
}

impl<'s> IntoIterator for &'s MemoryStack<'_> {
    type Item = Allocation;
    type IntoIter = Allocations<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the allocations of a [`MemoryStack`].
///
/// A record with a damaged footer is still yielded, since its header gives
/// its extent. Iteration stops at the first implausible header.
#[derive(Clone, Debug)]
pub struct Allocations<'s> {
    records: &'s [u8],
    cursor: usize,
    stack: StackId,
}

impl Iterator for Allocations<'_> {
    type Item = Allocation;

    fn next(&mut self) -> Option<Allocation> {
        if self.cursor >= self.records.len() {
            return None;
        }
        let Some((place, header)) = read_record(self.records, self.cursor) else {
            self.cursor = self.records.len();
            return None;
        };
        self.cursor = place.end;
        Some(Allocation {
            stack: self.stack,
            offset: place.data as u32,
            len: header.size,
            serial: header.serial,
        })
    }
}

fn aligned_origin(buffer: &mut [u8]) -> &mut [u8] {
    let start = buffer.as_ptr().align_offset(ALIGNMENT).min(buffer.len());
    let end = buffer.len().min(start.saturating_add(u32::MAX as usize));
    &mut buffer[start..end]
}
