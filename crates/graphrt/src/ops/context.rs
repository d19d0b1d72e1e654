//! Plain carriers for the state operators see while being built, initialized and run.

use crate::descriptor::OperatorDef;
use crate::device::Device;
use crate::error::{OpError, OpResult};
use crate::workspace::Workspace;

/// State available to an operator factory.
///
/// A builder may keep one context per workspace and retarget it node by node with
/// [`OpConstructContext::set_operator_def`] and [`OpConstructContext::set_device`].
#[derive(Clone, Copy)]
pub struct OpConstructContext<'a> {
    operator_def: Option<&'a OperatorDef>,
    workspace: &'a Workspace,
    device: Option<&'a dyn Device>,
}

impl<'a> OpConstructContext<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            operator_def: None,
            workspace,
            device: None,
        }
    }

    pub fn for_node(
        operator_def: &'a OperatorDef,
        workspace: &'a Workspace,
        device: &'a dyn Device,
    ) -> Self {
        Self {
            operator_def: Some(operator_def),
            workspace,
            device: Some(device),
        }
    }

    pub fn set_operator_def(&mut self, operator_def: &'a OperatorDef) {
        self.operator_def = Some(operator_def);
    }

    pub fn set_device(&mut self, device: &'a dyn Device) {
        self.device = Some(device);
    }

    pub fn operator_def(&self) -> Option<&'a OperatorDef> {
        self.operator_def
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn device(&self) -> Option<&'a dyn Device> {
        self.device
    }

    pub(crate) fn require_operator_def(&self) -> OpResult<&'a OperatorDef> {
        self.operator_def.ok_or(OpError::IncompleteContext {
            field: "operator def",
        })
    }
}

/// State available to [`Operation::init`](super::Operation::init).
pub struct OpInitContext<'a> {
    workspace: &'a mut Workspace,
    device: &'a dyn Device,
}

impl<'a> OpInitContext<'a> {
    pub fn new(workspace: &'a mut Workspace, device: &'a dyn Device) -> Self {
        Self { workspace, device }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        self.workspace
    }

    pub fn device(&self) -> &'a dyn Device {
        self.device
    }
}

/// State available to [`Operation::run`](super::Operation::run).
#[derive(Clone, Copy)]
pub struct OpContext<'a> {
    workspace: &'a Workspace,
    device: &'a dyn Device,
}

impl<'a> OpContext<'a> {
    pub fn new(workspace: &'a Workspace, device: &'a dyn Device) -> Self {
        Self { workspace, device }
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn device(&self) -> &'a dyn Device {
        self.device
    }
}
