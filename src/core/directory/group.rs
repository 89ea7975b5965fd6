use once_cell::sync::Lazy;
use regex::Regex;

/// Group every user belongs to. Its subscribers receive every broadcast.
pub const DEFAULT_GROUP_ID: &str = "news";
pub const DEFAULT_GROUP_NAME: &str = "News";

/// Groups whose id ends with this suffix stay out of the public menus.
pub const PRIVATE_SUFFIX: &str = "_private";

/// Longest id that still fits a `select_group_<id>` callback payload.
pub const MAX_GROUP_ID_LEN: usize = 48;

/// Longest display name, in characters. Names show up on buttons and in the
/// broadcast preview.
pub const MAX_GROUP_NAME_LEN: usize = 64;

static GROUP_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: String,
    name: String,
}

impl Group {
    pub(crate) fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub(crate) fn default_group() -> Self {
        Self::new(DEFAULT_GROUP_ID, DEFAULT_GROUP_NAME)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_private(&self) -> bool {
        is_private_id(&self.id)
    }
}

pub fn is_private_id(group_id: &str) -> bool {
    group_id.ends_with(PRIVATE_SUFFIX)
}

/// Group ids travel inside `/start` deep links and callback payloads, so only
/// ASCII letters, digits and underscores are accepted.
pub fn is_valid_group_id(group_id: &str) -> bool {
    group_id.len() <= MAX_GROUP_ID_LEN && GROUP_ID_RE.is_match(group_id)
}

pub fn is_valid_group_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name.chars().count() <= MAX_GROUP_NAME_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_charset() {
        assert!(is_valid_group_id("vip_private"));
        assert!(is_valid_group_id("Events2024"));
        assert!(!is_valid_group_id(""));
        assert!(!is_valid_group_id("with space"));
        assert!(!is_valid_group_id("dash-ed"));
        assert!(!is_valid_group_id("новости"));
        assert!(is_valid_group_id(&"a".repeat(MAX_GROUP_ID_LEN)));
        assert!(!is_valid_group_id(&"a".repeat(MAX_GROUP_ID_LEN + 1)));
    }

    #[test]
    fn group_name_bounds() {
        assert!(is_valid_group_name("VIP"));
        assert!(is_valid_group_name(&"я".repeat(MAX_GROUP_NAME_LEN)));
        assert!(!is_valid_group_name(&"я".repeat(MAX_GROUP_NAME_LEN + 1)));
        assert!(!is_valid_group_name("   "));
    }

    #[test]
    fn private_suffix() {
        assert!(Group::new("vip_private", "VIP").is_private());
        assert!(!Group::new("events", "Events").is_private());
        assert!(!Group::default_group().is_private());
    }
}
