use serde::{Deserialize, Serialize};
use std::fmt;

/// How a bound host instance is exposed to script code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProxyMode {
    /// The type itself is bound: constructors and the class surface.
    Class = 0,
    /// Instances are bound one object at a time. Host code reads members
    /// through the binding's resolver; script exposure copies a snapshot.
    #[default]
    Object = 1,
    /// Instances are invocable through the class's apply functions.
    Function = 2,
}

impl ProxyMode {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ProxyMode::Class,
            2 => ProxyMode::Function,
            _ => ProxyMode::Object,
        }
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProxyMode::Class => "Class",
            ProxyMode::Object => "Object",
            ProxyMode::Function => "Function",
        };
        f.write_str(name)
    }
}

/// Member exposure mark carried by every descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Exposure {
    #[default]
    Default,
    Allow,
    Block,
}

/// How members are admitted and how deeply values are converted.
///
/// | Mode          | Members admitted           | Nested values      |
/// |---------------|----------------------------|--------------------|
/// | `Transparent` | all                        | converted deeply   |
/// | `AllowOnly`   | only `Exposure::Allow`     | top level only     |
/// | `BlockOnly`   | all but `Exposure::Block`  | top level only     |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionMode {
    #[default]
    Transparent,
    AllowOnly,
    BlockOnly,
}

impl ConversionMode {
    /// Whether a member with the given mark is registered under this mode.
    pub fn admits(self, exposure: Exposure) -> bool {
        match self {
            ConversionMode::Transparent => true,
            ConversionMode::AllowOnly => exposure == Exposure::Allow,
            ConversionMode::BlockOnly => exposure != Exposure::Block,
        }
    }

    /// Whether nested arrays/objects are converted recursively.
    pub fn converts_nested(self) -> bool {
        matches!(self, ConversionMode::Transparent)
    }
}

/// Per-class binding configuration, declared through [`HostClass`](super::HostClass).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingConfig {
    pub conversion_mode: ConversionMode,
}

impl BindingConfig {
    pub fn new(conversion_mode: ConversionMode) -> Self {
        Self { conversion_mode }
    }
}
