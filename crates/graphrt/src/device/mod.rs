//! Execution targets and the allocators they expose.

mod allocator;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use allocator::{AllocError, Allocator, Buffer, HostAllocator};

/// Execution target class an operator implementation is registered for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    #[default]
    Cpu,
    Gpu,
    Dsp,
}

impl DeviceType {
    /// Canonical name used in registry keys and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Cpu => "CPU",
            DeviceType::Gpu => "GPU",
            DeviceType::Dsp => "DSP",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete execution target. New tensors are created through its allocator.
pub trait Device: Send + Sync {
    fn device_type(&self) -> DeviceType;

    fn allocator(&self) -> Arc<dyn Allocator>;
}

/// CPU device backed by host memory.
#[derive(Clone)]
pub struct HostDevice {
    allocator: Arc<HostAllocator>,
}

impl HostDevice {
    pub fn new() -> Self {
        Self::with_allocator(HostAllocator::from_env())
    }

    pub fn with_allocator(allocator: HostAllocator) -> Self {
        Self {
            allocator: Arc::new(allocator),
        }
    }

    /// Typed access to the allocator, e.g. to inspect its accounting.
    pub fn host_allocator(&self) -> &Arc<HostAllocator> {
        &self.allocator
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for HostDevice {
    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn allocator(&self) -> Arc<dyn Allocator> {
        Arc::clone(&self.allocator) as Arc<dyn Allocator>
    }
}
