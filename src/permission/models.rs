use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::store::models::Category;

/// Categories a caller may see in reports, resolved once per request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionScope {
    /// Caller holds the all-categories grant
    pub has_all_categories: bool,
    /// Explicitly granted categories (ignored when `has_all_categories`)
    pub allowed_category_ids: BTreeSet<Uuid>,
}

impl PermissionScope {
    pub fn unrestricted() -> Self {
        Self {
            has_all_categories: true,
            allowed_category_ids: BTreeSet::new(),
        }
    }

    pub fn restricted(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            has_all_categories: false,
            allowed_category_ids: ids.into_iter().collect(),
        }
    }

    /// True when the caller cannot see a single category.
    pub fn is_empty(&self) -> bool {
        !self.has_all_categories && self.allowed_category_ids.is_empty()
    }

    /// Uncategorized records are only visible to unrestricted callers.
    pub fn allows(&self, category_id: Option<Uuid>) -> bool {
        if self.has_all_categories {
            return true;
        }
        category_id.is_some_and(|id| self.allowed_category_ids.contains(&id))
    }

    pub fn visible_categories(&self, categories: Vec<Category>) -> Vec<Category> {
        categories
            .into_iter()
            .filter(|c| self.allows(Some(c.id)))
            .collect()
    }
}
