//! Byte allocators backing tensor storage.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

/// Allocation failure reported by an [`Allocator`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("out of memory: requested {requested} bytes with {available} of {limit} bytes available")]
    Exhausted {
        requested: usize,
        available: usize,
        limit: usize,
    },
    #[error("allocator unavailable: {0}")]
    Unavailable(String),
    #[error("byte size of shape {dims:?} overflows usize")]
    SizeOverflow { dims: Vec<usize> },
}

/// Owned byte storage handed out by an allocator.
#[derive(Debug, Default)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    /// Wraps already-zeroed storage; allocators are the only intended callers.
    pub fn zeroed(nbytes: usize) -> Self {
        Self {
            bytes: vec![0; nbytes],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Source of tensor storage for one device.
///
/// Every byte handed out by [`Allocator::allocate`] is returned through [`Allocator::release`]
/// once the owning tensor drops or resizes its buffer.
pub trait Allocator: Send + Sync {
    /// Allocates a zero-filled buffer of `nbytes` bytes.
    fn allocate(&self, nbytes: usize) -> Result<Buffer, AllocError>;

    /// Returns `nbytes` previously obtained from [`Allocator::allocate`].
    fn release(&self, nbytes: usize);

    /// Bytes currently handed out.
    fn allocated_bytes(&self) -> usize;
}

/// Host memory allocator with an optional byte budget.
#[derive(Debug, Default)]
pub struct HostAllocator {
    limit: Option<usize>,
    allocated: AtomicUsize,
}

impl HostAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that refuses to hand out more than `limit` bytes in total.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            allocated: AtomicUsize::new(0),
        }
    }

    /// Creates an allocator honouring `GRAPHRT_HOST_MEMORY_LIMIT` when set.
    pub fn from_env() -> Self {
        match crate::env::host_memory_limit() {
            Some(limit) => Self::with_limit(limit),
            None => Self::new(),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl Allocator for HostAllocator {
    fn allocate(&self, nbytes: usize) -> Result<Buffer, AllocError> {
        if let Some(limit) = self.limit {
            let reserved = self
                .allocated
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    current.checked_add(nbytes).filter(|total| *total <= limit)
                });
            if let Err(current) = reserved {
                return Err(AllocError::Exhausted {
                    requested: nbytes,
                    available: limit.saturating_sub(current),
                    limit,
                });
            }
        } else {
            self.allocated.fetch_add(nbytes, Ordering::AcqRel);
        }
        Ok(Buffer::zeroed(nbytes))
    }

    fn release(&self, nbytes: usize) {
        let _ = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(nbytes))
            });
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }
}
