use graphrt::{OpConstructContext, OpContext, OpError, OpResult, Operation, OperationBase};

/// Copies its single input into its single output.
#[derive(Debug)]
pub struct IdentityOp {
    base: OperationBase,
}

impl IdentityOp {
    pub fn new(context: &OpConstructContext<'_>) -> OpResult<Self> {
        Ok(Self {
            base: OperationBase::new(context)?,
        })
    }
}

impl Operation for IdentityOp {
    fn base(&self) -> &OperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    fn run(&mut self, _context: &OpContext<'_>) -> OpResult<()> {
        let input = self.base.input(0)?;
        let output = self.base.output(0)?;
        if input.dtype() != output.dtype() {
            return Err(OpError::execution(
                self.base.op_type(),
                format!(
                    "output {} is {} but input {} is {}",
                    output.name(),
                    output.dtype(),
                    input.name(),
                    input.dtype()
                ),
            ));
        }
        output
            .copy_bytes_from(input)
            .map_err(|source| OpError::Allocation {
                op_type: self.base.op_type().to_string(),
                output: output.name().to_string(),
                source,
            })
    }
}
