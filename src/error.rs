use thiserror::Error;

pub type Result<T> = std::result::Result<T, TesseraError>;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error(
        "No injector for argument [{index}] of [{member}] on class [{class}] and no default injector is configured"
    )]
    MissingInjector {
        class: String,
        member: String,
        index: usize,
    },

    #[error(
        "Cannot provide [{key}] from a top level container: a REQUEST scoped service can only be resolved from a child container. Make sure [{key}] is not used by a SINGLETON scoped service"
    )]
    ScopeMismatch { key: String },

    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Class [{class}] carries no construction metadata")]
    NotConstructible { class: String },

    #[error("Class [{class}] has no member [{member}]")]
    UnknownMember { class: String, member: String },

    #[error("Invalid decoration target: {message}")]
    InvalidTarget { message: String },

    #[error("Invalid key [{key}]: {message}")]
    InvalidKey { key: String, message: String },

    #[error("[{slot}] resolved asynchronously but was requested on a synchronous path")]
    PendingInSyncContext { slot: String },

    #[error("[{key}] only has an async resolver; use get_async")]
    AsyncResolverInSyncContext { key: String },

    #[error("Timeout during {phase}: {message}")]
    Timeout { phase: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl TesseraError {
    pub(crate) fn missing_injector(
        class: &str,
        member: Option<&str>,
        index: usize,
    ) -> Self {
        Self::MissingInjector {
            class: class.to_string(),
            member: member.unwrap_or("constructor").to_string(),
            index,
        }
    }

    pub(crate) fn timeout(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            phase: phase.into(),
            message: message.into(),
        }
    }

    pub(crate) fn downcast<T: ?Sized>() -> Self {
        Self::DowncastFailed {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}
