use std::fmt;

use super::DataType;

/// Concrete extents of an allocated tensor. Unlike configured shapes, every extent is known.
///
/// Rank 0 is a scalar holding one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Shape { dims: dims.into() }
    }

    /// `[0]`: the shape of a tensor that has not been sized yet.
    pub fn empty() -> Self {
        Shape { dims: vec![0] }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Element count. Shapes held by tensors always fit; see [`Shape::checked_num_elements`]
    /// for untrusted extents.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Element count, or `None` when it does not fit in `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
    }

    /// Storage needed for this shape at `dtype`, or `None` on overflow.
    pub fn byte_len(&self, dtype: DataType) -> Option<usize> {
        self.checked_num_elements()?
            .checked_mul(dtype.size_in_bytes())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, dim) in self.dims.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dim}")?;
        }
        f.write_str("]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_scalar_differ() {
        assert_eq!(Shape::empty().num_elements(), 0);
        assert_eq!(Shape::new(Vec::<usize>::new()).num_elements(), 1);
        assert_eq!(Shape::from([2, 3]).byte_len(DataType::F16), Some(12));
        assert_eq!(Shape::from([2, 3]).to_string(), "[2, 3]");
    }

    #[test]
    fn oversized_extents_report_overflow() {
        let huge = Shape::from([1 << 40, 1 << 40]);
        assert_eq!(huge.checked_num_elements(), None);
        assert_eq!(huge.byte_len(DataType::U8), None);
        assert_eq!(Shape::from([usize::MAX]).byte_len(DataType::F32), None);
        assert_eq!(Shape::from([usize::MAX]).byte_len(DataType::U8), Some(usize::MAX));
    }
}
