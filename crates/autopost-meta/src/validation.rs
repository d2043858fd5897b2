//! Validation of field policy tables

use std::fmt;

use autopost_host::{DocumentStatus, THUMBNAIL_META_KEY};

use crate::policy::TypePolicy;
use crate::table::PolicyTable;
use crate::{IGNORE_MARKER, SYNCED_MARKER};

/// One problem found in a policy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyIssue {
    pub doc_type: String,
    pub message: String,
}

impl fmt::Display for PolicyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.doc_type, self.message)
    }
}

/// Keys the engine manages itself and a policy must not copy
const RESERVED_KEYS: [&str; 3] = [THUMBNAIL_META_KEY, SYNCED_MARKER, IGNORE_MARKER];

/// Collect every issue in `table`
pub fn validate(table: &PolicyTable) -> Vec<PolicyIssue> {
    let mut issues = Vec::new();
    for (doc_type, policy) in &table.types {
        for message in type_issues(policy) {
            issues.push(PolicyIssue {
                doc_type: doc_type.clone(),
                message,
            });
        }
    }
    issues
}

fn type_issues(policy: &TypePolicy) -> Vec<String> {
    let mut messages = Vec::new();

    if let Some(status) = policy.post_status
        && matches!(
            status,
            DocumentStatus::Trash | DocumentStatus::AutoDraft | DocumentStatus::Inherit
        )
    {
        messages.push(format!("post_status '{}' cannot be used for new copies", status));
    }

    let lists = [
        ("meta", &policy.meta),
        ("relational_meta", &policy.relational_meta),
        ("extended_fields", &policy.extended_fields),
        ("permanent.meta", &policy.permanent.meta),
        ("permanent.relational_meta", &policy.permanent.relational_meta),
        ("permanent.extended_fields", &policy.permanent.extended_fields),
    ];
    for (name, keys) in lists {
        for key in keys.iter() {
            if key.trim().is_empty() {
                messages.push(format!("{} contains an empty key", name));
            } else if RESERVED_KEYS.contains(&key.as_str()) {
                messages.push(format!("{} lists reserved key '{}'", name, key));
            }
        }
    }

    let relational: Vec<&String> = policy
        .relational_meta
        .iter()
        .chain(&policy.permanent.relational_meta)
        .collect();
    for key in policy.meta.iter().chain(&policy.permanent.meta) {
        let message = format!("'{}' is listed as both scalar and relational meta", key);
        if relational.contains(&key) && !messages.contains(&message) {
            messages.push(message);
        }
    }

    messages
}
