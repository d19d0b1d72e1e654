//! Operator instances and the input/output binding they share.

use std::sync::Arc;

use crate::descriptor::{
    get_optional_arg, get_repeated_args, ArgType, OperatorDef, RepeatedArgType, DTYPE_ARG,
};
use crate::error::{OpError, OpResult};
use crate::tensor::{DataType, TensorRef, DEFAULT_DATA_TYPE};

use super::context::{OpConstructContext, OpContext, OpInitContext};

/// Descriptor copy and tensor bindings common to every operator implementation.
///
/// Concrete operators embed one of these and expose it through [`Operation::base`].
#[derive(Debug)]
pub struct OperationBase {
    operator_def: Arc<OperatorDef>,
    inputs: Vec<TensorRef>,
    outputs: Vec<TensorRef>,
}

impl OperationBase {
    /// Takes a private deep copy of the context's node so later edits to the graph definition
    /// cannot change this instance.
    pub fn new(context: &OpConstructContext<'_>) -> OpResult<Self> {
        let operator_def = context.require_operator_def()?;
        Ok(Self::from_def(operator_def.clone()))
    }

    pub fn from_def(operator_def: OperatorDef) -> Self {
        Self {
            operator_def: Arc::new(operator_def),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Resolves every declared input and binds or creates every declared output.
    ///
    /// Inputs must already exist. An output already present in the workspace is bound as is;
    /// otherwise it is created with the type from `output_types[i]`, or the node's `T` argument
    /// when no per-output types are declared, and receives `output_shapes[i]` as its configured
    /// shape hint. On error, outputs created by this call are removed from the workspace again.
    pub fn init(&mut self, context: &mut OpInitContext<'_>) -> OpResult<()> {
        let def = Arc::clone(&self.operator_def);

        let mut inputs = Vec::with_capacity(def.inputs.len());
        for input in &def.inputs {
            let tensor =
                context
                    .workspace()
                    .get_tensor(input)
                    .ok_or_else(|| OpError::MissingInput {
                        op_type: def.op_type.clone(),
                        input: input.clone(),
                    })?;
            inputs.push(tensor);
        }

        let mut created = Vec::new();
        let outputs = match bind_outputs(&def, context, &mut created) {
            Ok(outputs) => outputs,
            Err(err) => {
                for name in &created {
                    context.workspace_mut().remove_tensor(name);
                }
                return Err(err);
            }
        };

        tracing::trace!(
            "initialized {} ({}): {} inputs, {} outputs",
            def.name,
            def.op_type,
            inputs.len(),
            outputs.len()
        );
        self.inputs = inputs;
        self.outputs = outputs;
        Ok(())
    }

    /// The private descriptor copy this instance was built from.
    pub fn debug_def(&self) -> &OperatorDef {
        &self.operator_def
    }

    pub fn op_type(&self) -> &str {
        &self.operator_def.op_type
    }

    pub fn inputs(&self) -> &[TensorRef] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorRef] {
        &self.outputs
    }

    pub fn input_size(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_size(&self) -> usize {
        self.outputs.len()
    }

    pub fn input(&self, idx: usize) -> OpResult<&TensorRef> {
        self.inputs.get(idx).ok_or_else(|| {
            OpError::execution(
                self.op_type(),
                format!("input {idx} out of range ({} bound)", self.inputs.len()),
            )
        })
    }

    pub fn output(&self, idx: usize) -> OpResult<&TensorRef> {
        self.outputs.get(idx).ok_or_else(|| {
            OpError::execution(
                self.op_type(),
                format!("output {idx} out of range ({} bound)", self.outputs.len()),
            )
        })
    }

    /// Node's numeric type, `f32` when unspecified.
    pub fn dtype(&self) -> OpResult<DataType> {
        self.optional_arg(DTYPE_ARG, DEFAULT_DATA_TYPE)
    }

    pub fn optional_arg<T: ArgType>(&self, name: &str, default: T) -> OpResult<T> {
        get_optional_arg(&self.operator_def, name, default)
    }

    pub fn repeated_args<T: RepeatedArgType>(&self, name: &str) -> OpResult<Vec<T>> {
        get_repeated_args(&self.operator_def, name)
    }
}

fn bind_outputs(
    def: &OperatorDef,
    context: &mut OpInitContext<'_>,
    created: &mut Vec<String>,
) -> OpResult<Vec<TensorRef>> {
    let device = context.device();
    let mut outputs = Vec::with_capacity(def.outputs.len());
    for (idx, output) in def.outputs.iter().enumerate() {
        if let Some(existing) = context.workspace().get_tensor(output) {
            outputs.push(existing);
            continue;
        }

        if !def.output_types.is_empty() && def.output_types.len() != def.outputs.len() {
            return Err(OpError::OutputTypeCountMismatch {
                op_type: def.op_type.clone(),
                outputs: def.outputs.len(),
                output_types: def.output_types.len(),
            });
        }
        let dtype = match def.output_types.get(idx) {
            Some(dtype) => *dtype,
            None => get_optional_arg(def, DTYPE_ARG, DEFAULT_DATA_TYPE)?,
        };

        let tensor = context
            .workspace_mut()
            .create_tensor(output, device.allocator(), dtype)
            .map_err(|source| OpError::Allocation {
                op_type: def.op_type.clone(),
                output: output.clone(),
                source,
            })?;
        created.push(output.clone());
        if let Some(shape) = def.output_shapes.get(idx) {
            tensor.set_shape_configured(shape.dims.clone());
        }
        outputs.push(tensor);
    }
    Ok(outputs)
}

/// Runtime object bound to one graph node.
pub trait Operation: Send {
    fn base(&self) -> &OperationBase;

    fn base_mut(&mut self) -> &mut OperationBase;

    /// Binds inputs and outputs. Implementations overriding this must still call
    /// [`OperationBase::init`].
    fn init(&mut self, context: &mut OpInitContext<'_>) -> OpResult<()> {
        self.base_mut().init(context)
    }

    fn run(&mut self, context: &OpContext<'_>) -> OpResult<()>;

    fn debug_def(&self) -> &OperatorDef {
        self.base().debug_def()
    }
}
