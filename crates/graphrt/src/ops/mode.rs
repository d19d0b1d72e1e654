use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{ArgType, ArgValue};

/// Build pass a node belongs to. Nodes of other modes are skipped, not rejected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Init,
    #[default]
    Normal,
    Calibration,
    Training,
}

impl ExecutionMode {
    /// Stable integer tag carried by the `mode` node argument.
    pub fn tag(self) -> i64 {
        match self {
            ExecutionMode::Init => 0,
            ExecutionMode::Normal => 1,
            ExecutionMode::Calibration => 2,
            ExecutionMode::Training => 3,
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(ExecutionMode::Init),
            1 => Some(ExecutionMode::Normal),
            2 => Some(ExecutionMode::Calibration),
            3 => Some(ExecutionMode::Training),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Init => "init",
            ExecutionMode::Normal => "normal",
            ExecutionMode::Calibration => "calibration",
            ExecutionMode::Training => "training",
        };
        f.write_str(name)
    }
}

impl ArgType for ExecutionMode {
    const EXPECTED: &'static str = "execution mode tag";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        i64::from_arg(value).and_then(ExecutionMode::from_tag)
    }
}
