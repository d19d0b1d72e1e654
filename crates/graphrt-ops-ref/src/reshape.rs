use graphrt::{OpConstructContext, OpContext, OpError, OpResult, Operation, OperationBase};

/// Reinterprets its input under the shape given by the `shape` argument.
///
/// At most one entry of `shape` may be `-1`; it is inferred from the input element count.
#[derive(Debug)]
pub struct ReshapeOp {
    base: OperationBase,
    shape: Vec<i64>,
}

impl ReshapeOp {
    pub fn new(context: &OpConstructContext<'_>) -> OpResult<Self> {
        let base = OperationBase::new(context)?;
        let shape = base.repeated_args::<i64>("shape")?;
        if shape.iter().filter(|dim| **dim == -1).count() > 1 {
            return Err(OpError::execution(
                base.op_type(),
                format!("at most one inferred dimension allowed, got {shape:?}"),
            ));
        }
        if let Some(dim) = shape.iter().find(|dim| **dim < -1) {
            return Err(OpError::execution(
                base.op_type(),
                format!("invalid dimension {dim} in {shape:?}"),
            ));
        }
        Ok(Self { base, shape })
    }

    fn resolve_shape(&self, num_elements: usize) -> OpResult<Vec<usize>> {
        let mismatch = || {
            OpError::execution(
                self.base.op_type(),
                format!(
                    "cannot reshape {num_elements} elements into {:?}",
                    self.shape
                ),
            )
        };

        let known = self
            .shape
            .iter()
            .filter(|dim| **dim >= 0)
            .try_fold(1usize, |acc, dim| {
                usize::try_from(*dim).ok().and_then(|dim| acc.checked_mul(dim))
            })
            .ok_or_else(|| mismatch())?;

        let mut dims = Vec::with_capacity(self.shape.len());
        for dim in &self.shape {
            if *dim == -1 {
                if known == 0 || num_elements % known != 0 {
                    return Err(mismatch());
                }
                dims.push(num_elements / known);
            } else {
                dims.push(usize::try_from(*dim).map_err(|_| mismatch())?);
            }
        }
        let total = dims
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(*dim));
        if total != Some(num_elements) {
            return Err(mismatch());
        }
        Ok(dims)
    }
}

impl Operation for ReshapeOp {
    fn base(&self) -> &OperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    fn run(&mut self, _context: &OpContext<'_>) -> OpResult<()> {
        let input = self.base.input(0)?;
        let output = self.base.output(0)?;
        let dims = self.resolve_shape(input.size())?;
        let bytes = input.read_bytes();
        output
            .resize(dims)
            .map_err(|source| OpError::Allocation {
                op_type: self.base.op_type().to_string(),
                output: output.name().to_string(),
                source,
            })?;
        output
            .write_bytes(&bytes)
            .map_err(|err| OpError::execution(self.base.op_type(), err.to_string()))?;
        Ok(())
    }
}
