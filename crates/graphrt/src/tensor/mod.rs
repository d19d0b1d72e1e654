//! Named tensors stored in a [`Workspace`](crate::Workspace).
//!
//! A tensor's name and element type are fixed at creation. Its shape, storage and the advisory
//! configured shape live behind a lock so operators holding shared handles can resize outputs
//! during execution.

pub mod dtype;
pub mod shape;

use std::fmt;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::device::{AllocError, Allocator, Buffer};

pub use dtype::{DataType, DEFAULT_DATA_TYPE};
pub use shape::Shape;

/// Shared handle to a tensor owned by a workspace.
pub type TensorRef = Arc<Tensor>;

/// Raw write whose length differs from the tensor's storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("tensor {name} holds {expected} bytes, got {actual}")]
pub struct ByteLengthMismatch {
    pub name: String,
    pub expected: usize,
    pub actual: usize,
}

struct TensorState {
    shape: Shape,
    shape_configured: Option<Vec<i64>>,
    buffer: Buffer,
}

pub struct Tensor {
    name: String,
    dtype: DataType,
    allocator: Arc<dyn Allocator>,
    state: RwLock<TensorState>,
}

impl Tensor {
    /// Creates a tensor holding zero elements; storage is drawn from `allocator` on the first
    /// resize.
    ///
    /// The initial zero-byte request still goes through the allocator so an unusable
    /// allocator is reported at creation time.
    pub fn new(
        name: impl Into<String>,
        allocator: Arc<dyn Allocator>,
        dtype: DataType,
    ) -> Result<Self, AllocError> {
        let buffer = allocator.allocate(0)?;
        Ok(Self {
            name: name.into(),
            dtype,
            allocator,
            state: RwLock::new(TensorState {
                shape: Shape::empty(),
                shape_configured: None,
                buffer,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn shape(&self) -> Shape {
        self.state.read().expect("tensor state poisoned").shape.clone()
    }

    /// Advisory shape recorded from the node descriptor, if any.
    pub fn shape_configured(&self) -> Option<Vec<i64>> {
        self.state
            .read()
            .expect("tensor state poisoned")
            .shape_configured
            .clone()
    }

    /// Records the configured shape hint without touching the allocated shape.
    pub fn set_shape_configured(&self, dims: Vec<i64>) {
        self.state
            .write()
            .expect("tensor state poisoned")
            .shape_configured = Some(dims);
    }

    /// Number of elements implied by the current shape.
    pub fn size(&self) -> usize {
        self.state
            .read()
            .expect("tensor state poisoned")
            .shape
            .num_elements()
    }

    /// Bytes currently backing the tensor.
    pub fn raw_size(&self) -> usize {
        self.state.read().expect("tensor state poisoned").buffer.len()
    }

    /// Sets the shape, reallocating storage when the byte size changes.
    pub fn resize(&self, shape: impl Into<Shape>) -> Result<(), AllocError> {
        let shape = shape.into();
        let nbytes = shape
            .byte_len(self.dtype)
            .ok_or_else(|| AllocError::SizeOverflow {
                dims: shape.dims().to_vec(),
            })?;
        let mut state = self.state.write().expect("tensor state poisoned");
        if state.buffer.len() != nbytes {
            let previous = state.buffer.len();
            self.allocator.release(previous);
            match self.allocator.allocate(nbytes) {
                Ok(buffer) => state.buffer = buffer,
                Err(err) => {
                    state.buffer = Buffer::default();
                    state.shape = Shape::empty();
                    return Err(err);
                }
            }
        }
        state.shape = shape;
        Ok(())
    }

    /// Copies the raw bytes of the tensor.
    pub fn read_bytes(&self) -> Vec<u8> {
        self.state
            .read()
            .expect("tensor state poisoned")
            .buffer
            .as_slice()
            .to_vec()
    }

    /// Overwrites the storage; `bytes` must match [`Tensor::raw_size`].
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), ByteLengthMismatch> {
        let mut state = self.state.write().expect("tensor state poisoned");
        if state.buffer.len() != bytes.len() {
            return Err(ByteLengthMismatch {
                name: self.name.clone(),
                expected: state.buffer.len(),
                actual: bytes.len(),
            });
        }
        state.buffer.as_mut_slice().copy_from_slice(bytes);
        Ok(())
    }

    /// Resizes to `other`'s shape and copies its bytes.
    pub fn copy_bytes_from(&self, other: &Tensor) -> Result<(), AllocError> {
        let (shape, bytes) = {
            let source = other.state.read().expect("tensor state poisoned");
            (source.shape.clone(), source.buffer.as_slice().to_vec())
        };
        self.resize(shape)?;
        let mut state = self.state.write().expect("tensor state poisoned");
        let len = bytes.len().min(state.buffer.len());
        state.buffer.as_mut_slice()[..len].copy_from_slice(&bytes[..len]);
        Ok(())
    }
}

impl Drop for Tensor {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|err| err.into_inner());
        self.allocator.release(state.buffer.len());
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().expect("tensor state poisoned");
        f.debug_struct("Tensor")
            .field("name", &self.name)
            .field("dtype", &self.dtype)
            .field("shape", &state.shape)
            .field("shape_configured", &state.shape_configured)
            .field("bytes", &state.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostAllocator;

    #[test]
    fn resize_tracks_allocator_accounting() {
        let allocator = Arc::new(HostAllocator::new());
        let tensor = Tensor::new("t", allocator.clone(), DataType::I32).unwrap();
        assert_eq!(tensor.raw_size(), 0);

        tensor.resize([2, 3]).unwrap();
        assert_eq!(tensor.size(), 6);
        assert_eq!(tensor.raw_size(), 24);
        assert_eq!(allocator.allocated_bytes(), 24);

        tensor.resize([1]).unwrap();
        assert_eq!(allocator.allocated_bytes(), 4);

        drop(tensor);
        assert_eq!(allocator.allocated_bytes(), 0);
    }

    #[test]
    fn overflowing_resize_keeps_previous_storage() {
        let allocator = Arc::new(HostAllocator::new());
        let tensor = Tensor::new("t", allocator.clone(), DataType::F32).unwrap();
        tensor.resize([3]).unwrap();

        let err = tensor.resize([1 << 40, 1 << 40]).unwrap_err();
        assert!(matches!(err, AllocError::SizeOverflow { ref dims } if dims == &[1 << 40, 1 << 40]));
        assert_eq!(tensor.shape().dims(), &[3]);
        assert_eq!(allocator.allocated_bytes(), 12);
    }

    #[test]
    fn write_bytes_requires_matching_length() {
        let tensor = Tensor::new("t", Arc::new(HostAllocator::new()), DataType::U8).unwrap();
        tensor.resize([2]).unwrap();
        assert_eq!(
            tensor.write_bytes(&[1, 2, 3]).unwrap_err(),
            ByteLengthMismatch {
                name: "t".to_string(),
                expected: 2,
                actual: 3,
            }
        );
        tensor.write_bytes(&[7, 9]).unwrap();
        assert_eq!(tensor.read_bytes(), vec![7, 9]);
    }

    #[test]
    fn configured_shape_does_not_change_allocated_shape() {
        let tensor = Tensor::new("t", Arc::new(HostAllocator::new()), DataType::F32).unwrap();
        tensor.set_shape_configured(vec![1, -1, 8]);
        assert_eq!(tensor.shape_configured(), Some(vec![1, -1, 8]));
        assert_eq!(tensor.shape(), Shape::empty());
        assert_eq!(tensor.size(), 0);
        assert_eq!(tensor.raw_size(), 0);
    }
}
