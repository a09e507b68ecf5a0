//! Lookup criteria for a single account.

use crate::error::SecurdenError;

/// Partial identifying fields for an account lookup.
///
/// Unset or empty fields are never sent. At least one of `id`, `name` or
/// `title` must be present for a lookup to make sense; that rule is applied
/// by the caller through [`ensure_identifiable`](Self::ensure_identifiable).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountCriteria {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub account_type: Option<String>,
    pub ticket_id: Option<String>,
    pub reason: Option<String>,
    pub key_field: Option<String>,
}

impl AccountCriteria {
    /// Criteria matching an account by numeric id.
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Criteria matching an account by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Criteria matching an account by title.
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }

    #[must_use]
    pub fn with_ticket_id(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    /// True when a non-zero id, a non-empty name or a non-empty title is set.
    pub fn is_identifiable(&self) -> bool {
        self.id.is_some_and(|id| id != 0)
            || non_empty(self.name.as_ref())
            || non_empty(self.title.as_ref())
    }

    /// Reject criteria that cannot identify an account.
    ///
    /// # Errors
    ///
    /// Returns [`SecurdenError::Validation`] if no identifying field is set.
    pub fn ensure_identifiable(&self) -> Result<(), SecurdenError> {
        if self.is_identifiable() {
            Ok(())
        } else {
            Err(SecurdenError::Validation(
                "At least one of account_id, account_name, or account_title must be provided."
                    .to_owned(),
            ))
        }
    }

    /// Query pairs for every set, non-empty field, in a fixed order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(7);
        if let Some(id) = self.id.filter(|id| *id != 0) {
            query.push(("account_id", id.to_string()));
        }
        let text_fields = [
            ("account_name", &self.name),
            ("account_title", &self.title),
            ("account_type", &self.account_type),
            ("ticket_id", &self.ticket_id),
            ("reason", &self.reason),
            ("key_field", &self.key_field),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                query.push((key, value.clone()));
            }
        }
        query
    }
}

fn non_empty(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_only_set_fields() {
        let criteria = AccountCriteria::by_name("root")
            .with_reason("deploy")
            .with_ticket_id("");
        assert_eq!(
            criteria.to_query(),
            vec![
                ("account_name", "root".to_owned()),
                ("reason", "deploy".to_owned()),
            ]
        );
    }

    #[test]
    fn query_includes_every_field_when_all_set() {
        let criteria = AccountCriteria {
            id: Some(42),
            name: Some("n".to_owned()),
            title: Some("t".to_owned()),
            account_type: Some("Linux".to_owned()),
            ticket_id: Some("T-1".to_owned()),
            reason: Some("r".to_owned()),
            key_field: Some("password".to_owned()),
        };
        let keys: Vec<_> = criteria.to_query().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                "account_id",
                "account_name",
                "account_title",
                "account_type",
                "ticket_id",
                "reason",
                "key_field"
            ]
        );
    }

    #[test]
    fn zero_id_is_omitted() {
        let criteria = AccountCriteria::by_id(0).with_type("Windows");
        assert_eq!(criteria.to_query(), vec![("account_type", "Windows".to_owned())]);
    }

    #[test]
    fn identifiable_needs_id_name_or_title() {
        assert!(AccountCriteria::by_id(3).is_identifiable());
        assert!(AccountCriteria::by_name("a").is_identifiable());
        assert!(AccountCriteria::by_title("b").is_identifiable());
        assert!(!AccountCriteria::by_id(0).is_identifiable());
        assert!(!AccountCriteria::by_name("").is_identifiable());
        assert!(!AccountCriteria::default().with_type("Linux").is_identifiable());
    }

    #[test]
    fn ensure_identifiable_is_validation_error() {
        let err = AccountCriteria::default()
            .with_reason("audit")
            .ensure_identifiable()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().starts_with("At least one of account_id"));
    }
}
