//! Builds and runs the operators of one graph for a single execution mode.
//!
//! Nodes are visited in the order the [`NetDef`] declares them. The plan neither reorders nodes
//! nor plans memory; it only skips nodes that belong to another mode.

use serde::{Deserialize, Serialize};

use crate::descriptor::NetDef;
use crate::device::Device;
use crate::error::OpResult;
use crate::ops::{ExecutionMode, OpConstructContext, OpContext, OpInitContext, OpRegistry, Operation};
use crate::workspace::Workspace;

/// Knobs for [`OperationPlan::build`], deserializable from a JSON config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub mode: ExecutionMode,
}

impl BuildOptions {
    pub fn with_mode(mode: ExecutionMode) -> Self {
        Self { mode }
    }
}

pub struct OperationPlan {
    operations: Vec<Box<dyn Operation>>,
    skipped: Vec<String>,
}

impl OperationPlan {
    /// Instantiates and initializes every node of `net` applicable to `options.mode` on
    /// `device`. The first failing node aborts the whole build.
    pub fn build(
        registry: &OpRegistry,
        net: &NetDef,
        workspace: &mut Workspace,
        device: &dyn Device,
        options: BuildOptions,
    ) -> OpResult<Self> {
        let device_type = device.device_type();
        let mut operations = Vec::with_capacity(net.ops.len());
        let mut skipped = Vec::new();

        for operator_def in &net.ops {
            let created = {
                let context = OpConstructContext::for_node(operator_def, workspace, device);
                registry.create_operation(&context, device_type, options.mode)?
            };
            let Some(mut operation) = created else {
                skipped.push(operator_def.name.clone());
                continue;
            };
            let mut init_context = OpInitContext::new(workspace, device);
            operation.init(&mut init_context)?;
            operations.push(operation);
        }

        tracing::debug!(
            "built plan for {:?} on {}: {} operations, {} skipped",
            net.name,
            device_type,
            operations.len(),
            skipped.len()
        );
        Ok(Self {
            operations,
            skipped,
        })
    }

    /// Runs every operation once, in build order.
    pub fn run(&mut self, workspace: &Workspace, device: &dyn Device) -> OpResult<()> {
        let context = OpContext::new(workspace, device);
        for operation in &mut self.operations {
            operation.run(&context)?;
        }
        Ok(())
    }

    pub fn operations(&self) -> &[Box<dyn Operation>] {
        &self.operations
    }

    /// Names of the nodes left out because they belong to another mode.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
