//! Replication reports
//!
//! A save event never fails as a whole. What happened on each site,
//! including per-category failures, is collected here instead.

use std::fmt;

use serde::Serialize;

use autopost_host::{DocId, DocumentStatus, SiteId};
use autopost_meta::FieldCategory;

use crate::copiers::Change;

/// Why a save event was not replicated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "reason", content = "detail")]
pub enum SkipReason {
    /// The save was caused by the engine's own write
    Reentrant,
    Revision,
    Status(DocumentStatus),
    /// The document type has no policy
    UnconfiguredType(String),
    /// The document carries the ignore marker
    Ignored,
    /// The source site could not be entered
    SiteUnavailable(String),
    /// No relation registry is installed
    RegistryUnavailable,
    /// The registry failed to return the document's own links
    LinkLookupFailed(String),
    /// Extended fields are not configured or not installed
    NoExtendedFields,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reentrant => write!(f, "save caused by replication"),
            Self::Revision => write!(f, "document is a revision"),
            Self::Status(status) => write!(f, "status '{}' is not replicated", status),
            Self::UnconfiguredType(doc_type) => {
                write!(f, "type '{}' has no replication policy", doc_type)
            }
            Self::Ignored => write!(f, "document is marked as ignored"),
            Self::SiteUnavailable(message) => write!(f, "source site unavailable: {}", message),
            Self::RegistryUnavailable => write!(f, "relation registry unavailable"),
            Self::LinkLookupFailed(message) => write!(f, "link lookup failed: {}", message),
            Self::NoExtendedFields => write!(f, "no extended fields to copy"),
        }
    }
}

/// Result of applying one field category on one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
    pub category: FieldCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened on one target site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: SiteId,
    /// Counterpart on this site, if one exists or was created
    pub target_id: Option<DocId>,
    pub created: bool,
    pub categories: Vec<CategoryOutcome>,
    /// Why the site was left alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    /// Site-level failure, such as a failed creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hook_errors: Vec<String>,
}

impl SiteReport {
    pub fn new(site: SiteId) -> Self {
        Self {
            site,
            target_id: None,
            created: false,
            categories: Vec::new(),
            skipped: None,
            error: None,
            hook_errors: Vec::new(),
        }
    }

    /// Outcome of `category`, if it was attempted
    pub fn category(&self, category: FieldCategory) -> Option<&CategoryOutcome> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Whether `category` was applied without error
    pub fn applied(&self, category: FieldCategory) -> bool {
        self.category(category)
            .is_some_and(|c| c.error.is_none() && c.change != Some(Change::Unavailable))
    }

    pub fn record(&mut self, category: FieldCategory, change: Change) {
        self.categories.push(CategoryOutcome {
            category,
            change: Some(change),
            error: None,
        });
    }

    pub fn record_error(&mut self, category: FieldCategory, error: String) {
        self.categories.push(CategoryOutcome {
            category,
            change: None,
            error: Some(error),
        });
    }
}

/// Report from one save event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationReport {
    pub source_site: SiteId,
    pub source_id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    pub sites: Vec<SiteReport>,
    /// Problems outside any one site
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ReplicationReport {
    pub fn new(source_site: SiteId, source_id: DocId) -> Self {
        Self {
            source_site,
            source_id,
            skipped: None,
            sites: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Report for an event that was not replicated
    pub fn skipped(source_site: SiteId, source_id: DocId, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::new(source_site, source_id)
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub fn site(&self, site: SiteId) -> Option<&SiteReport> {
        self.sites.iter().find(|s| s.site == site)
    }

    /// Number of copies created
    pub fn created(&self) -> usize {
        self.sites.iter().filter(|s| s.created).count()
    }

    /// Every recorded failure, prefixed with its site.
    ///
    /// A failed lookup of the source's own links counts as a failure even
    /// though the event is skipped.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(reason @ SkipReason::LinkLookupFailed(_)) = &self.skipped {
            errors.push(reason.to_string());
        }
        for site in &self.sites {
            if let Some(error) = &site.error {
                errors.push(format!("site {}: {}", site.site, error));
            }
            for outcome in &site.categories {
                if let Some(error) = &outcome.error {
                    errors.push(format!("site {}: {}: {}", site.site, outcome.category, error));
                }
            }
            for error in &site.hook_errors {
                errors.push(format!("site {}: {}", site.site, error));
            }
        }
        errors
    }

    /// Whether every site completed without failures
    pub fn success(&self) -> bool {
        self.errors().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_errors_are_prefixed_by_site() {
        let mut site = SiteReport::new(SiteId(2));
        site.record(FieldCategory::Title, Change::Written);
        site.record_error(FieldCategory::Meta, "boom".to_string());
        let mut report = ReplicationReport::new(SiteId(1), DocId(10));
        report.sites.push(site);

        assert!(!report.success());
        assert_eq!(report.errors(), vec!["site 2: meta: boom"]);
        let site = report.site(SiteId(2)).unwrap();
        assert!(site.applied(FieldCategory::Title));
        assert!(!site.applied(FieldCategory::Meta));
        assert!(!site.applied(FieldCategory::Thumbnail));
    }

    #[test]
    fn test_failed_link_lookup_is_not_a_success() {
        let report = ReplicationReport::skipped(
            SiteId(1),
            DocId(10),
            SkipReason::LinkLookupFailed("timeout".to_string()),
        );
        assert!(!report.success());
        assert_eq!(report.errors(), vec!["link lookup failed: timeout"]);

        let report =
            ReplicationReport::skipped(SiteId(1), DocId(10), SkipReason::RegistryUnavailable);
        assert!(report.success());
    }

    #[test]
    fn test_skip_reason_serializes_with_detail() {
        let json = serde_json::to_value(SkipReason::Status(DocumentStatus::Draft)).unwrap();
        assert_eq!(json, serde_json::json!({"reason": "status", "detail": "draft"}));
        let json = serde_json::to_value(SkipReason::Ignored).unwrap();
        assert_eq!(json, serde_json::json!({"reason": "ignored"}));
    }
}
