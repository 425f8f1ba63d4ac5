/// [crate::properties] contains the basic building blocks for assembling and
/// manipulating [crate::map::NoteMap]s and the document structure feed.
use enumset::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use uuid::Uuid;

use crate::error::WeftError;

/// Node ID
///
/// Stable identity for an addressable content target on the note map. Targets
/// are typically notes, but any document-identified entity (an embedded image,
/// an external page) gets a Nid once something links to it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nid(Uuid);

impl Nid {
    pub fn new() -> Self {
        Nid(Uuid::new_v4())
    }

    /// Use a [Nid::nil] when generating placeholder ids in order to identify
    /// that the item has no known content target.
    pub fn nil() -> Self {
        Nid(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Nid {
    fn default() -> Self {
        Nid::new()
    }
}

impl AsRef<Uuid> for Nid {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Nid {
    fn from(id: Uuid) -> Self {
        Nid(id)
    }
}

impl TryFrom<&str> for Nid {
    type Error = WeftError;

    fn try_from(string: &str) -> Result<Self, Self::Error> {
        Ok(Nid(Uuid::parse_str(string)?))
    }
}

impl Display for Nid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.hyphenated().encode_lower(&mut Uuid::encode_buffer())
        )
    }
}

impl From<&Nid> for String {
    fn from(val: &Nid) -> Self {
        format!("{val}")
    }
}

/// Classification of nodes and connections on the note map.
///
/// `Connected` marks entities mechanically derived from a document's current
/// link structure; `Navigated` marks entities the user created by explicit
/// navigation or curation. The ordering matters: strength may be promoted
/// toward `Navigated` but automatic machinery never demotes it.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    #[default]
    Connected,
    Navigated,
}

impl Strength {
    /// Whether automatic machinery (the synchronizer) may remove an entity of
    /// this strength.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Strength::Connected)
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The kinds of structure entries a document collaborator reports. The
/// synchronizer acts on `Link` and `Embed` entries; `Tag` and `Todo` entries
/// ride the same feed for other consumers and are ignored by the map.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Link,
    Embed,
    Tag,
    Todo,
}

impl StructureKind {
    pub fn is_connective(&self) -> bool {
        matches!(self, StructureKind::Link | StructureKind::Embed)
    }
}

/// One link/embed/tag/todo entry extracted from a document.
///
/// `to` is the resolved destination target, if resolution succeeded. `raw`
/// preserves the reference text as written, for diagnostics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureItem {
    pub kind: StructureKind,
    pub to: Option<Nid>,
    pub raw: String,
}

impl StructureItem {
    pub fn link(to: Nid) -> Self {
        StructureItem {
            kind: StructureKind::Link,
            to: Some(to),
            raw: String::new(),
        }
    }

    pub fn embed(to: Nid) -> Self {
        StructureItem {
            kind: StructureKind::Embed,
            to: Some(to),
            raw: String::new(),
        }
    }

    pub fn unresolved(kind: StructureKind, raw: impl Into<String>) -> Self {
        StructureItem {
            kind,
            to: None,
            raw: raw.into(),
        }
    }
}

/// A batch of structure changes produced when a document's parsed link
/// structure changes. Deltas for a given document must be applied in the
/// order they were produced.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureDelta {
    pub added: Vec<StructureItem>,
    pub removed: Vec<StructureItem>,
}

impl StructureDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The lifecycle state of a single todo entry within a note.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[serde(rename_all = "lowercase")]
pub enum TodoState {
    Open,
    Complete,
    Canceled,
}

impl Display for TodoState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A node on the note map: exactly one addressable content target.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapNode {
    pub nid: Nid,
    pub strength: Strength,
    /// Display label, empty until a collaborator supplies one.
    pub label: String,
}

impl MapNode {
    pub fn new(nid: Nid, strength: Strength) -> Self {
        MapNode {
            nid,
            strength,
            label: String::new(),
        }
    }

    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            self.nid.to_string()
        } else {
            self.label.clone()
        }
    }
}

/// A directed edge between two map nodes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub from: Nid,
    pub to: Nid,
    pub strength: Strength,
}

impl Display for Connection {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.strength)
    }
}
