use strum_macros::{Display, EnumString};

/// Lifecycle of a produced value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Scope {
    /// One instance per root container.
    #[default]
    Singleton,
    /// A fresh instance on every resolution.
    Transient,
    /// One instance per child container; rejected at the root.
    Request,
}
