use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use super::models::PermissionScope;
use crate::store::RecordFilter;

/// Grant that lifts every category restriction
pub const ALL_CATEGORIES_PERMISSION: &str = "view all categories";

lazy_static! {
    /// `view category: <uuid>`, case-insensitive, flexible whitespace
    static ref CATEGORY_PERMISSION: Regex =
        Regex::new(r"(?i)^view\s+category\s*:\s*([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$")
            .expect("Invalid category permission pattern");
}

/// Resolve a caller's permission strings into a category scope.
///
/// Malformed strings are ignored. No category grants means no visible
/// categories, not all of them.
pub fn resolve_scope<I, S>(permissions: I) -> PermissionScope
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut allowed = Vec::new();

    for permission in permissions {
        let permission = permission.as_ref().trim();
        if permission.eq_ignore_ascii_case(ALL_CATEGORIES_PERMISSION) {
            return PermissionScope::unrestricted();
        }
        if let Some(id) = CATEGORY_PERMISSION
            .captures(permission)
            .and_then(|caps| Uuid::parse_str(&caps[1]).ok())
        {
            allowed.push(id);
        }
    }

    PermissionScope::restricted(allowed)
}

/// Narrow a record filter to the scope. No-op for unrestricted callers.
pub fn apply_scope(scope: &PermissionScope, mut filter: RecordFilter) -> RecordFilter {
    if !scope.has_all_categories {
        filter.allowed_category_ids = Some(scope.allowed_category_ids.iter().copied().collect());
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPLIES: &str = "0b6f0e8e-1c2d-4b7a-9f3e-5a6b7c8d9e01";
    const RENT: &str = "7d4c3b2a-1e0f-4a9b-8c7d-6e5f4a3b2c1d";

    #[test]
    fn test_all_categories_grant_is_unrestricted() {
        let scope = resolve_scope([
            format!("view category: {SUPPLIES}"),
            "View All Categories ".to_string(),
        ]);
        assert!(scope.has_all_categories);
        assert!(scope.allows(None));
    }

    #[test]
    fn test_category_grants_build_allow_list() {
        let scope = resolve_scope([
            format!("view category: {SUPPLIES}"),
            format!("VIEW CATEGORY:{RENT}"),
            "edit suppliers".to_string(),
        ]);

        assert!(!scope.has_all_categories);
        assert_eq!(scope.allowed_category_ids.len(), 2);
        assert!(scope.allows(Some(Uuid::parse_str(SUPPLIES).unwrap())));
        assert!(!scope.allows(None), "Uncategorized should be hidden");
    }

    #[test]
    fn test_malformed_permissions_are_ignored() {
        let scope = resolve_scope(["view category: not-a-uuid", "view category", ""]);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_no_grants_means_nothing_visible() {
        let scope = resolve_scope(Vec::<String>::new());
        assert!(scope.is_empty());
        assert!(!scope.allows(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_apply_scope_sets_allow_list_only_when_restricted() {
        let supplies = Uuid::parse_str(SUPPLIES).unwrap();

        let restricted = apply_scope(
            &PermissionScope::restricted([supplies]),
            RecordFilter::default(),
        );
        assert_eq!(restricted.allowed_category_ids, Some(vec![supplies]));

        let open = apply_scope(&PermissionScope::unrestricted(), RecordFilter::default());
        assert_eq!(open.allowed_category_ids, None);

        let empty = apply_scope(&PermissionScope::default(), RecordFilter::default());
        assert_eq!(empty.allowed_category_ids, Some(vec![]));
    }
}
