//! Per-process descriptor table.
//!
//! A fixed number of slots; `allocate` always hands out the lowest free one.
//! Slots 0 and 1 are conventionally the console, installed by the host.

use crate::syscall::{SyscallError, SyscallResult};

/// Maximum number of descriptors a process may hold open.
pub const MAX_OPEN_FILES: usize = 16;

/// Descriptor table mapping slot numbers to open objects.
pub struct DescriptorTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> DescriptorTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_OPEN_FILES).map(|_| None).collect(),
        }
    }

    fn index(fd: u64) -> Result<usize, SyscallError> {
        let idx = usize::try_from(fd).map_err(|_| SyscallError::BadDescriptor)?;
        if idx >= MAX_OPEN_FILES {
            return Err(SyscallError::BadDescriptor);
        }
        Ok(idx)
    }

    /// Place `entry` at a specific slot. The slot must be free.
    pub fn install(&mut self, fd: u64, entry: T) -> Result<(), SyscallError> {
        let idx = Self::index(fd)?;
        if self.slots[idx].is_some() {
            return Err(SyscallError::InvalidArgument);
        }
        self.slots[idx] = Some(entry);
        Ok(())
    }

    /// Store `entry` in the lowest free slot and return its descriptor.
    pub fn allocate(&mut self, entry: T) -> SyscallResult {
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                Ok(idx as u64)
            }
            None => Err(SyscallError::TooManyOpenFiles),
        }
    }

    /// Look up an open descriptor.
    pub fn get(&self, fd: u64) -> Result<&T, SyscallError> {
        let idx = Self::index(fd)?;
        self.slots[idx].as_ref().ok_or(SyscallError::BadDescriptor)
    }

    /// Look up an open descriptor mutably.
    pub fn get_mut(&mut self, fd: u64) -> Result<&mut T, SyscallError> {
        let idx = Self::index(fd)?;
        self.slots[idx].as_mut().ok_or(SyscallError::BadDescriptor)
    }

    /// Remove a descriptor, returning what it referred to.
    pub fn release(&mut self, fd: u64) -> Result<T, SyscallError> {
        let idx = Self::index(fd)?;
        self.slots[idx].take().ok_or(SyscallError::BadDescriptor)
    }

    /// Number of occupied slots.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether `fd` currently names an open slot.
    pub fn is_open(&self, fd: u64) -> bool {
        self.get(fd).is_ok()
    }
}

impl<T> Default for DescriptorTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
