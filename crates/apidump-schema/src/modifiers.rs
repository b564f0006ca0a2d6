//! Declaration modifiers of types and members.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
    /// Declared modifiers of a type or member.
    ///
    /// Serialized as a list of lowercase keywords, e.g. `["public", "static"]`,
    /// in flag order.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(try_from = "Vec<String>", into = "Vec<String>")]
    pub struct Modifiers: u16 {
        /// Visible everywhere.
        const PUBLIC = 1 << 0;
        /// Visible to subtypes and the declaring package.
        const PROTECTED = 1 << 1;
        /// Visible only inside the declaring type.
        const PRIVATE = 1 << 2;
        /// Belongs to the type rather than an instance.
        const STATIC = 1 << 3;
        /// Cannot be overridden, subclassed or reassigned.
        const FINAL = 1 << 4;
        /// Has no implementation in the declaring type.
        const ABSTRACT = 1 << 5;
        /// Implemented outside the type system.
        const NATIVE = 1 << 6;
        /// Holds the instance monitor while running.
        const SYNCHRONIZED = 1 << 7;
        /// Skipped by default serialization.
        const TRANSIENT = 1 << 8;
        /// Reads and writes bypass thread-local caching.
        const VOLATILE = 1 << 9;
        /// Strict floating-point semantics.
        const STRICTFP = 1 << 10;
    }
}

/// A modifier keyword that is not one of [`Modifiers`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown modifier '{0}'")]
pub struct UnknownModifier(pub String);

impl Modifiers {
    /// The flag named by a lowercase `keyword`, e.g. `"static"`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.bytes().any(|b| b.is_ascii_uppercase()) {
            return None;
        }
        Self::from_name(&keyword.to_ascii_uppercase())
    }

    /// `public`
    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// `protected`
    pub const fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    /// `private`
    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    /// `static`
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// `final`
    pub const fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    /// `abstract`
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    /// Public or protected: the only declarations that appear in a report.
    pub const fn is_visible(self) -> bool {
        self.intersects(Self::PUBLIC.union(Self::PROTECTED))
    }

    /// The visibility keyword, `package` when none is declared.
    pub const fn visibility(self) -> &'static str {
        if self.is_public() {
            "public"
        } else if self.is_protected() {
            "protected"
        } else if self.is_private() {
            "private"
        } else {
            "package"
        }
    }

    /// The lowercase keywords of the present flags, in flag order.
    pub fn keywords(self) -> impl Iterator<Item = String> {
        self.iter_names().map(|(name, _)| name.to_ascii_lowercase())
    }
}

impl TryFrom<Vec<String>> for Modifiers {
    type Error = UnknownModifier;

    fn try_from(keywords: Vec<String>) -> Result<Self, Self::Error> {
        keywords.into_iter().try_fold(Self::empty(), |set, keyword| {
            Self::from_keyword(&keyword)
                .map(|flag| set | flag)
                .ok_or(UnknownModifier(keyword))
        })
    }
}

impl From<Modifiers> for Vec<String> {
    fn from(modifiers: Modifiers) -> Self {
        modifiers.keywords().collect()
    }
}
