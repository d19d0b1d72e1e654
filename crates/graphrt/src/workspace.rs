//! Name-addressed tensor store shared by the operators of a graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{AllocError, Allocator};
use crate::tensor::{DataType, Tensor, TensorRef};

/// Owns every tensor of a graph under a single flat namespace.
///
/// Mutation requires `&mut self`; callers sharing a workspace across threads wrap it in their
/// own lock, which also rules out two operators creating the same output name concurrently.
#[derive(Debug, Default)]
pub struct Workspace {
    tensors: HashMap<String, TensorRef>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_tensor(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    pub fn get_tensor(&self, name: &str) -> Option<TensorRef> {
        self.tensors.get(name).cloned()
    }

    /// Creates an empty tensor under `name`, or returns the existing one unchanged.
    pub fn create_tensor(
        &mut self,
        name: &str,
        allocator: Arc<dyn Allocator>,
        dtype: DataType,
    ) -> Result<TensorRef, AllocError> {
        if let Some(existing) = self.tensors.get(name) {
            tracing::trace!("tensor {name} already exists, skipping creation");
            return Ok(Arc::clone(existing));
        }
        tracing::trace!("creating tensor {name} ({dtype})");
        let tensor = Arc::new(Tensor::new(name, allocator, dtype)?);
        self.tensors.insert(name.to_string(), Arc::clone(&tensor));
        Ok(tensor)
    }

    /// Inserts a prepared tensor under its own name, replacing any previous entry.
    pub fn insert_tensor(&mut self, tensor: Tensor) -> TensorRef {
        let tensor = Arc::new(tensor);
        self.tensors
            .insert(tensor.name().to_string(), Arc::clone(&tensor));
        tensor
    }

    pub fn remove_tensor(&mut self, name: &str) -> Option<TensorRef> {
        self.tensors.remove(name)
    }

    /// Registered tensor names in sorted order.
    pub fn tensor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tensors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
