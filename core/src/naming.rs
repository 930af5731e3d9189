//! Bone names with explicit provenance
//!
//! A merge tracks where every bone came from with a [`Provenance`] tag instead
//! of string surgery. The tag is rendered as a suffix only when a display name
//! is needed (host lookups, vertex group names, scene documents):
//!
//! | provenance              | display        |
//! |-------------------------|----------------|
//! | `Original`              | `Chest`        |
//! | `MergedPendingRename`   | `Chest.merge`  |
//! | `RenamedCollision`      | `Chest_Old`    |
//!
//! Tagging an already tagged name folds the current display into the stem, so
//! `Chest` -> collision -> merge displays as `Chest_Old.merge`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix carried by merged-in bones until they are settled
pub const MERGE_SUFFIX: &str = ".merge";

/// Suffix given to a bone that had to make room for another
pub const COLLISION_SUFFIX: &str = "_Old";

/// Where a bone's current name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Original,
    MergedPendingRename,
    RenamedCollision,
}

impl Provenance {
    fn suffix(self) -> &'static str {
        match self {
            Provenance::Original => "",
            Provenance::MergedPendingRename => MERGE_SUFFIX,
            Provenance::RenamedCollision => COLLISION_SUFFIX,
        }
    }
}

/// Bone name: stem plus provenance tag
///
/// Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BoneName {
    stem: String,
    provenance: Provenance,
}

impl BoneName {
    pub fn new(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            provenance: Provenance::Original,
        }
    }

    /// Parse a display string, recovering the outermost tag from its suffix
    pub fn parse(display: &str) -> Self {
        for provenance in [Provenance::MergedPendingRename, Provenance::RenamedCollision] {
            if let Some(stem) = display.strip_suffix(provenance.suffix()) {
                if !stem.is_empty() {
                    return Self {
                        stem: stem.to_string(),
                        provenance,
                    };
                }
            }
        }
        Self::new(display)
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_pending_merge(&self) -> bool {
        self.provenance == Provenance::MergedPendingRename
    }

    /// Tag as merged-in, pending a rename back to its stem
    pub fn into_merged(self) -> Self {
        self.retag(Provenance::MergedPendingRename)
    }

    /// Tag as displaced by a same-named bone
    pub fn into_collision(self) -> Self {
        self.retag(Provenance::RenamedCollision)
    }

    /// Drop a pending-merge tag; other tags are kept
    pub fn settled(self) -> Self {
        match self.provenance {
            Provenance::MergedPendingRename => Self::new(self.stem),
            _ => self,
        }
    }

    fn retag(self, provenance: Provenance) -> Self {
        let stem = match self.provenance {
            Provenance::Original => self.stem,
            _ => self.to_string(),
        };
        Self { stem, provenance }
    }
}

impl fmt::Display for BoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.provenance.suffix())
    }
}

impl From<String> for BoneName {
    fn from(display: String) -> Self {
        Self::parse(&display)
    }
}

impl From<&str> for BoneName {
    fn from(display: &str) -> Self {
        Self::parse(display)
    }
}

impl From<BoneName> for String {
    fn from(name: BoneName) -> Self {
        name.to_string()
    }
}

/// Which bones survive zero-weight removal even without any influence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneFilter {
    /// Display names always kept
    pub names: Vec<String>,
    /// Stem kept regardless of its provenance tag (the synthesized root)
    pub stem: Option<String>,
}

impl BoneFilter {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            stem: None,
        }
    }

    pub fn with_stem(mut self, stem: Option<String>) -> Self {
        self.stem = stem;
        self
    }

    pub fn keeps(&self, name: &BoneName) -> bool {
        if self.stem.as_deref() == Some(name.stem()) {
            return true;
        }
        let display = name.to_string();
        self.names.iter().any(|n| *n == display)
    }
}
