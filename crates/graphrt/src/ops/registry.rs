//! Registry of operator implementations keyed by kind, device and numeric type.
//!
//! Implementation crates contribute registrar functions to [`OP_REGISTRARS`]; one call to
//! [`OpRegistry::from_registrars`] runs them all before any graph is built. The finished
//! registry is frozen behind an [`OpRegistryHandle`] and only read afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{get_optional_arg, DTYPE_ARG, MODE_ARG};
use crate::device::DeviceType;
use crate::error::{OpError, OpResult};
use crate::tensor::{DataType, DEFAULT_DATA_TYPE};

use super::context::OpConstructContext;
use super::key::op_key;
use super::mode::ExecutionMode;
use super::operation::Operation;

/// Factory building one implementation variant for the node carried by the context.
pub type OpCreator =
    Box<dyn Fn(&OpConstructContext<'_>) -> OpResult<Box<dyn Operation>> + Send + Sync>;

/// Function contributing registrations, collected at link time.
pub type OpRegistrar = fn(&mut OpRegistry) -> OpResult<()>;

/// Shared pointer to a fully populated registry.
pub type OpRegistryHandle = Arc<OpRegistry>;

#[linkme::distributed_slice]
pub static OP_REGISTRARS: [OpRegistrar] = [..];

/// Everything registered for one operator kind.
#[derive(Default)]
pub struct OpRegistrationInfo {
    devices: BTreeSet<DeviceType>,
    creators: HashMap<String, OpCreator>,
}

impl OpRegistrationInfo {
    pub fn devices(&self) -> &BTreeSet<DeviceType> {
        &self.devices
    }

    /// Encoded keys registered for this kind, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.creators.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn add_device(&mut self, device: DeviceType) {
        self.devices.insert(device);
    }

    fn register(&mut self, key: String, creator: OpCreator) -> OpResult<()> {
        tracing::trace!("registering: {key}");
        if self.creators.contains_key(&key) {
            return Err(OpError::DuplicateRegistration { key });
        }
        self.creators.insert(key, creator);
        Ok(())
    }
}

impl fmt::Debug for OpRegistrationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpRegistrationInfo")
            .field("devices", &self.devices)
            .field("keys", &self.keys())
            .finish()
    }
}

#[derive(Default)]
pub struct OpRegistry {
    registry: HashMap<String, OpRegistrationInfo>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every registrar linked into the binary.
    pub fn from_registrars() -> OpResult<Self> {
        let mut registry = Self::new();
        for registrar in OP_REGISTRARS {
            registrar(&mut registry)?;
        }
        tracing::debug!(
            "collected {} operator kinds from {} registrars",
            registry.len(),
            OP_REGISTRARS.len()
        );
        Ok(registry)
    }

    /// Freezes the registry for sharing with graph builders.
    pub fn into_handle(self) -> OpRegistryHandle {
        Arc::new(self)
    }

    /// Registers `creator` for `op_type` on `device` with numeric type `dtype`.
    ///
    /// Registering the same combination twice is a configuration error.
    pub fn register<F>(
        &mut self,
        op_type: &str,
        device: DeviceType,
        dtype: DataType,
        creator: F,
    ) -> OpResult<()>
    where
        F: Fn(&OpConstructContext<'_>) -> OpResult<Box<dyn Operation>> + Send + Sync + 'static,
    {
        let info = self.registry.entry(op_type.to_string()).or_default();
        info.add_device(device);
        info.register(op_key(op_type, device, dtype), Box::new(creator))
    }

    /// Registers a factory returning a concrete operation type.
    pub fn register_op<O, F>(
        &mut self,
        op_type: &str,
        device: DeviceType,
        dtype: DataType,
        creator: F,
    ) -> OpResult<()>
    where
        O: Operation + 'static,
        F: Fn(&OpConstructContext<'_>) -> OpResult<O> + Send + Sync + 'static,
    {
        self.register(op_type, device, dtype, move |context| {
            Ok(Box::new(creator(context)?) as Box<dyn Operation>)
        })
    }

    /// Devices `op_type` has at least one implementation for.
    pub fn available_devices(&self, op_type: &str) -> OpResult<BTreeSet<DeviceType>> {
        Ok(self.info(op_type)?.devices.clone())
    }

    /// Instantiates the implementation matching the context's node on `device`.
    ///
    /// Returns `Ok(None)` when the node belongs to a different execution mode than `mode`,
    /// including a mode tag that is unknown or not an int. The node's other arguments are
    /// only validated once its mode matches.
    ///
    /// A registered kind without a variant for the node's exact device and type is an error;
    /// there is no fallback to another variant.
    pub fn create_operation(
        &self,
        context: &OpConstructContext<'_>,
        device: DeviceType,
        mode: ExecutionMode,
    ) -> OpResult<Option<Box<dyn Operation>>> {
        let operator_def = context.require_operator_def()?;
        // A mode tag this build cannot read never matches the requested mode.
        let op_mode = get_optional_arg(operator_def, MODE_ARG, ExecutionMode::Normal).ok();
        if op_mode != Some(mode) {
            tracing::debug!(
                "skipping {}({}): declared mode {}, building {mode}",
                operator_def.name,
                operator_def.op_type,
                op_mode.map_or_else(|| "unknown".to_string(), |op_mode| op_mode.to_string())
            );
            return Ok(None);
        }

        let dtype = get_optional_arg(operator_def, DTYPE_ARG, DEFAULT_DATA_TYPE)?;
        tracing::debug!(
            "creating operator {}({}<{}>) on {}",
            operator_def.name,
            operator_def.op_type,
            dtype,
            device
        );
        let info = self.info(&operator_def.op_type)?;
        let key = op_key(&operator_def.op_type, device, dtype);
        let creator = info
            .creators
            .get(&key)
            .ok_or(OpError::UnregisteredKey { key })?;
        creator(context).map(Some)
    }

    pub fn is_registered(&self, op_type: &str) -> bool {
        self.registry.contains_key(op_type)
    }

    pub fn registration(&self, op_type: &str) -> Option<&OpRegistrationInfo> {
        self.registry.get(op_type)
    }

    /// Registered operator kinds, sorted.
    pub fn op_types(&self) -> Vec<&str> {
        let mut op_types: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        op_types.sort_unstable();
        op_types
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn info(&self, op_type: &str) -> OpResult<&OpRegistrationInfo> {
        self.registry
            .get(op_type)
            .ok_or_else(|| OpError::UnregisteredOp {
                op_type: op_type.to_string(),
            })
    }
}

impl fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpRegistry")
            .field("op_types", &self.op_types())
            .finish()
    }
}
