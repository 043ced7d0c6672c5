//! Type Tags
//!
//! Every node carries a type tag naming what kind of node it is. Name-based
//! searches compare against the tag, never against the wrapped element.
//!
//! A tag stores a fully qualified name such as `content::pages::LandingPageNode`.
//! The short name is the last `::` segment (`LandingPageNode`). Generic
//! arguments stay attached to the short name and are ignored when locating
//! the last segment, so `alloc::vec::Vec<core::u8>` shortens to
//! `Vec<core::u8>`.
//!
//! # Matching
//!
//! A tag matches a search name when the chosen form equals the name, or when
//! the chosen form with every `"Node"` substring removed equals the name.
//! Searching for `"LandingPage"` therefore finds both `LandingPage` and
//! `LandingPageNode`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which form of a node's tag a name search compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagForm {
    /// The last path segment of the tag.
    #[default]
    Short,

    /// The full tag, path included.
    Qualified,
}

/// The type tag attached to a node at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag {
    qualified: String,
}

impl TypeTag {
    /// Create a tag from a qualified (or bare) name.
    pub fn new(qualified: impl Into<String>) -> Self {
        Self {
            qualified: qualified.into(),
        }
    }

    /// Create a tag from a Rust type's name.
    ///
    /// The name comes from [`std::any::type_name`], whose exact output is not
    /// guaranteed across compiler versions. It is stable within one build,
    /// which is all name matching needs.
    pub fn of<K: ?Sized>() -> Self {
        Self::new(std::any::type_name::<K>())
    }

    /// The full tag.
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// The last path segment of the tag.
    pub fn short(&self) -> &str {
        let tag = self.qualified.as_str();
        let path_end = tag.find('<').unwrap_or(tag.len());
        let start = tag[..path_end].rfind("::").map_or(0, |i| i + 2);
        &tag[start..]
    }

    /// The tag in the requested form.
    pub fn as_form(&self, form: TagForm) -> &str {
        match form {
            TagForm::Short => self.short(),
            TagForm::Qualified => self.qualified(),
        }
    }

    /// Whether this tag was left empty.
    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty()
    }

    /// Check whether this tag matches `name` in the given form.
    pub fn matches(&self, name: &str, form: TagForm) -> bool {
        let tag = self.as_form(form);
        tag == name || (tag.contains("Node") && tag.replace("Node", "") == name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

impl From<&str> for TypeTag {
    fn from(qualified: &str) -> Self {
        Self::new(qualified)
    }
}

impl From<String> for TypeTag {
    fn from(qualified: String) -> Self {
        Self::new(qualified)
    }
}
