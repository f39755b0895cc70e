use thiserror::Error;

/// Client-side precondition failures. None of these ever reaches the
/// store: each is raised before any storage call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edited fields would change the record's key. Keys are assigned
    /// at creation and never change.
    #[error("Cannot update the {0}!")]
    KeyChanged(&'static str),

    /// An update or delete was attempted with nothing selected.
    #[error("No {0} selected!")]
    NoSelection(&'static str),

    /// A raw field value failed to parse into its typed form.
    #[error("Invalid {field}: '{value}'")]
    InvalidField {
        field: &'static str,
        value: String,
    },
}

/// Compares a record's key as loaded from storage against the edited
/// value, rejecting the operation on any mismatch. Composite keys compare
/// as tuples. Every caller of `update` goes through this one helper rather
/// than re-implementing the check per entity.
pub fn ensure_key_unchanged<K: PartialEq>(
    loaded: K,
    edited: K,
    key_desc: &'static str,
) -> Result<(), EditError> {
    if loaded == edited {
        Ok(())
    } else {
        Err(EditError::KeyChanged(key_desc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_keys_pass() {
        assert_eq!(ensure_key_unchanged("C1", "C1", "account number"), Ok(()));
    }

    #[test]
    fn changed_key_is_rejected_with_a_message() {
        let err = ensure_key_unchanged("C1", "C2", "customer account number").unwrap_err();
        assert_eq!(err.to_string(), "Cannot update the customer account number!");
    }

    #[test]
    fn composite_keys_compare_as_tuples() {
        assert!(ensure_key_unchanged(("C1", "B1"), ("C1", "B2"), "purchase key").is_err());
        assert!(ensure_key_unchanged(("C1", "B1"), ("C1", "B1"), "purchase key").is_ok());
    }
}
