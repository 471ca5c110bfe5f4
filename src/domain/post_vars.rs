//! Editing of the integration "Post Variables" field, an `&`-joined list of
//! `key=value` pairs.

/// Id of the "Post Variables" input of the integration edit form.
pub const POST_VARS_FIELD_ID: &str = "post_vars";

pub const LIST_ID_KEY: &str = "list_id=";

/// Points the post variables at `list_id`.
///
/// Only the first `list_id=` occurrence is rewritten; its value runs up to the
/// next `&` or the end of the string. When the key is absent it is appended.
pub fn patch_list_id(current: &str, list_id: &str) -> String {
    let Some(key_start) = current.find(LIST_ID_KEY) else {
        return format!("{current}&{LIST_ID_KEY}{list_id}");
    };

    let value_start = key_start + LIST_ID_KEY.len();
    let value_end = current[value_start..]
        .find('&')
        .map(|offset| value_start + offset)
        .unwrap_or(current.len());

    let mut updated = String::with_capacity(current.len() + list_id.len());
    updated.push_str(&current[..value_start]);
    updated.push_str(list_id);
    updated.push_str(&current[value_end..]);
    updated
}

/// Reads the value of the first `list_id=` pair, if any.
pub fn current_list_id(current: &str) -> Option<&str> {
    let value_start = current.find(LIST_ID_KEY)? + LIST_ID_KEY.len();
    let rest = &current[value_start..];
    Some(rest.split('&').next().unwrap_or(rest))
}

/// A list id that can be written into the field without breaking its shape.
pub fn is_valid_list_id(list_id: &str) -> bool {
    !list_id.is_empty() && !list_id.contains(['&', '='])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_existing_value() {
        assert_eq!(
            patch_list_id("foo=1&list_id=100&bar=2", "999"),
            "foo=1&list_id=999&bar=2"
        );
    }

    #[test]
    fn test_replaces_trailing_value() {
        assert_eq!(patch_list_id("foo=1&list_id=100", "7"), "foo=1&list_id=7");
    }

    #[test]
    fn test_replaces_empty_value() {
        assert_eq!(patch_list_id("list_id=&foo=1", "7"), "list_id=7&foo=1");
    }

    #[test]
    fn test_appends_when_absent() {
        assert_eq!(patch_list_id("foo=1", "999"), "foo=1&list_id=999");
        assert_eq!(patch_list_id("", "999"), "&list_id=999");
    }

    #[test]
    fn test_only_first_occurrence_is_rewritten() {
        assert_eq!(patch_list_id("list_id=1&list_id=2", "9"), "list_id=9&list_id=2");
        assert_eq!(patch_list_id("list_id=1&list_id=1", "9"), "list_id=9&list_id=1");
    }

    #[test]
    fn test_key_embedded_in_longer_key_counts_as_occurrence() {
        assert_eq!(
            patch_list_id("old_list_id=5&list_id=6", "9"),
            "old_list_id=9&list_id=6"
        );
    }

    #[test]
    fn test_patch_is_idempotent() {
        for current in [
            "foo=1&list_id=100&bar=2",
            "foo=1",
            "",
            "list_id=1&list_id=2",
            "a=b&c",
            "list_id",
        ] {
            for list_id in ["999", "1", "abc"] {
                let once = patch_list_id(current, list_id);
                assert_eq!(patch_list_id(&once, list_id), once, "{current:?} {list_id:?}");
            }
        }
    }

    #[test]
    fn test_current_list_id() {
        assert_eq!(current_list_id("foo=1&list_id=100&bar=2"), Some("100"));
        assert_eq!(current_list_id("list_id=7"), Some("7"));
        assert_eq!(current_list_id("foo=1"), None);
    }

    #[test]
    fn test_list_id_validation() {
        assert!(is_valid_list_id("8842"));
        assert!(!is_valid_list_id("1&2"));
        assert!(!is_valid_list_id("a=b"));
        assert!(!is_valid_list_id(""));
    }
}
