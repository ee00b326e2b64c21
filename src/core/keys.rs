//! core::keys
//!
//! Field names of metadata records and the reserved (computed) key set.
//!
//! Every name in [`ReservedKeySet`] is computed by the metadata engine.
//! Users may never supply one as a tag; doing so fails the declaration.

pub const DESCRIPTION: &str = "description";
pub const DESCRIPTION_ARGS: &str = "description_args";
pub const DESCRIBED_CLASS: &str = "described_class";
pub const EXAMPLE_GROUP: &str = "example_group";
pub const PARENT_EXAMPLE_GROUP: &str = "parent_example_group";
pub const EXECUTION_RESULT: &str = "execution_result";
pub const LAST_RUN_STATUS: &str = "last_run_status";
pub const FILE_PATH: &str = "file_path";
pub const ABSOLUTE_FILE_PATH: &str = "absolute_file_path";
pub const RERUN_FILE_PATH: &str = "rerun_file_path";
pub const FULL_DESCRIPTION: &str = "full_description";
pub const LINE_NUMBER: &str = "line_number";
pub const LOCATION: &str = "location";
pub const SCOPED_ID: &str = "scoped_id";
pub const BLOCK: &str = "block";
pub const SHARED_GROUP_INCLUSION_BACKTRACE: &str = "shared_group_inclusion_backtrace";

/// Tag carrying an explicit location override. Consumed during construction,
/// never stored.
pub const CALLER: &str = "caller";

/// Legacy alias of `block` on group records.
pub const EXAMPLE_GROUP_BLOCK: &str = "example_group_block";

/// Legacy alias of `described_class` on group records.
pub const DESCRIBES: &str = "describes";

const RESERVED_KEYS: [&str; 16] = [
    DESCRIPTION,
    DESCRIPTION_ARGS,
    DESCRIBED_CLASS,
    EXAMPLE_GROUP,
    PARENT_EXAMPLE_GROUP,
    EXECUTION_RESULT,
    LAST_RUN_STATUS,
    FILE_PATH,
    ABSOLUTE_FILE_PATH,
    RERUN_FILE_PATH,
    FULL_DESCRIPTION,
    LINE_NUMBER,
    LOCATION,
    SCOPED_ID,
    BLOCK,
    SHARED_GROUP_INCLUSION_BACKTRACE,
];

/// The fixed set of computed field names.
///
/// # Example
///
/// ```
/// use specmeta::core::keys::ReservedKeySet;
///
/// assert!(ReservedKeySet::contains("location"));
/// assert!(!ReservedKeySet::contains("slow"));
/// assert_eq!(ReservedKeySet::all().first(), Some(&"description"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservedKeySet;

impl ReservedKeySet {
    /// All reserved keys in their canonical order.
    pub fn all() -> &'static [&'static str] {
        &RESERVED_KEYS
    }

    pub fn contains(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    /// First reserved key (in canonical order) present among `keys`.
    pub fn first_collision<'a, I>(keys: I) -> Option<&'static str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys: Vec<&str> = keys.into_iter().collect();
        RESERVED_KEYS
            .iter()
            .copied()
            .find(|reserved| keys.contains(reserved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_is_not_reserved() {
        assert!(!ReservedKeySet::contains(CALLER));
    }

    #[test]
    fn legacy_aliases_are_not_reserved() {
        assert!(!ReservedKeySet::contains(EXAMPLE_GROUP_BLOCK));
        assert!(!ReservedKeySet::contains(DESCRIBES));
    }

    #[test]
    fn first_collision_follows_canonical_order() {
        let found = ReservedKeySet::first_collision(["slow", "location", "description"]);
        assert_eq!(found, Some(DESCRIPTION));
        assert_eq!(ReservedKeySet::first_collision(["slow", "ui"]), None);
    }

    #[test]
    fn sixteen_reserved_keys() {
        assert_eq!(ReservedKeySet::all().len(), 16);
    }
}
