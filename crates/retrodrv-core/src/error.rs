use thiserror::Error;

use crate::category::DriverCategory;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("unknown driver category label '{0}'")]
    UnknownLabel(String),

    #[error("{0} backends are not compiled into this build")]
    CategoryUnavailable(DriverCategory),

    #[error("no {0} backends are registered")]
    NoBackends(DriverCategory),

    #[error("{category} backend '{ident}' failed to initialize: {reason}")]
    BackendInit {
        category: DriverCategory,
        ident: String,
        reason: String,
    },

    #[error("scoped init/uninit requires a set of driver flags")]
    MissingFlags,

    #[error("driver manager has been shut down")]
    ShutDown,
}

impl DriverError {
    /// Convenience constructor used by backend factories.
    pub fn backend_init(
        category: DriverCategory,
        ident: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DriverError::BackendInit {
            category,
            ident: ident.into(),
            reason: reason.into(),
        }
    }
}
