//! Enumerates the scalar element types operators can be registered for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Element type used when a node does not declare its `T` argument.
pub const DEFAULT_DATA_TYPE: DataType = DataType::F32;

/// Logical element type shared between node descriptors, registry keys and tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    F32,
    F16,
    BF16,
    I8,
    U8,
    I16,
    I32,
    I64,
}

impl DataType {
    /// Returns the number of bytes required per scalar element.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DataType::I8 | DataType::U8 => 1,
            DataType::F16 | DataType::BF16 | DataType::I16 => 2,
            DataType::F32 | DataType::I32 => 4,
            DataType::I64 => 8,
        }
    }

    /// Produces the stable integer tag carried by the `T` node argument.
    pub fn tag(self) -> i64 {
        match self {
            DataType::F32 => 1,
            DataType::F16 => 2,
            DataType::BF16 => 3,
            DataType::I8 => 4,
            DataType::U8 => 5,
            DataType::I16 => 6,
            DataType::I32 => 7,
            DataType::I64 => 8,
        }
    }

    /// Reconstructs a `DataType` from its argument tag.
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(DataType::F32),
            2 => Some(DataType::F16),
            3 => Some(DataType::BF16),
            4 => Some(DataType::I8),
            5 => Some(DataType::U8),
            6 => Some(DataType::I16),
            7 => Some(DataType::I32),
            8 => Some(DataType::I64),
            _ => None,
        }
    }

    /// Canonical lowercase name, also used inside registry keys.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::F32 => "f32",
            DataType::F16 => "f16",
            DataType::BF16 => "bf16",
            DataType::I8 => "i8",
            DataType::U8 => "u8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DEFAULT_DATA_TYPE
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::DataType;

    #[test]
    fn tags_round_trip_and_unknown_tags_are_rejected() {
        for dtype in [
            DataType::F32,
            DataType::F16,
            DataType::BF16,
            DataType::I8,
            DataType::U8,
            DataType::I16,
            DataType::I32,
            DataType::I64,
        ] {
            assert_eq!(DataType::from_tag(dtype.tag()), Some(dtype));
        }
        assert_eq!(DataType::from_tag(0), None);
        assert_eq!(DataType::from_tag(99), None);
    }
}
