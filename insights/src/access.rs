use std::collections::BTreeSet;

use crate::{errors::ApiError, types::DocType};

/// Which doctypes the caller may read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    #[default]
    AllowAll,
    Readable(BTreeSet<DocType>),
}

impl AccessPolicy {
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    pub fn readable(doctypes: impl IntoIterator<Item = DocType>) -> Self {
        Self::Readable(doctypes.into_iter().collect())
    }

    pub fn can_read(&self, doctype: DocType) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Readable(doctypes) => doctypes.contains(&doctype),
        }
    }

    pub fn ensure_read(&self, doctype: DocType) -> Result<(), ApiError> {
        if self.can_read(doctype) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied { doctype })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_set_denies_other_doctypes() {
        let policy = AccessPolicy::readable([DocType::DataSource, DocType::Table]);
        assert!(policy.ensure_read(DocType::Table).is_ok());
        assert!(matches!(
            policy.ensure_read(DocType::Query),
            Err(ApiError::PermissionDenied { doctype: DocType::Query })
        ));
    }

    #[test]
    fn default_allows_everything() {
        assert!(DocType::ALL.iter().all(|doctype| AccessPolicy::default().can_read(*doctype)));
    }
}
