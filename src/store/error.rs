use thiserror::Error;

/// Failures surfaced by the entity stores.
///
/// Every storage failure is reported, never swallowed and never retried.
/// `Duplicate` is split out from the generic access failure so callers can
/// react to key conflicts specifically; everything else (connectivity, bad
/// statements, constraint failures other than the primary key) is `Access`
/// with the driver error attached as the cause.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Access {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// The store reported a uniqueness violation on the entity's primary
    /// (or composite) key.
    #[error("A {entity} with this {key} already exists.")]
    Duplicate {
        entity: &'static str,
        key: &'static str,
    },
}

impl StoreError {
    /// Wraps a driver error with a short description of the failed
    /// operation, for use with `map_err`.
    pub fn access(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let context = context.into();
        move |source| Self::Access { context, source }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}
