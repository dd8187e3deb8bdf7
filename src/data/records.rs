//! Relational rows produced from the .osm document, one struct per output table.
//!
//! Field order in each struct is the column order of its CSV file; the loader
//! on the other side matches columns by position and name, so never reorder.
//! Only ids and references are parsed; other attributes keep their source text.

use serde::Serialize;

/// Value of the `type` column for every tag row.
pub const DEFAULT_TAG_TYPE: &str = "regular";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: i64,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayRecord {
    pub id: i64,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationRecord {
    pub id: i64,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

/// Key/value annotation owned by a node, way or relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub id: i64,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

/// Node reference of a way; `position` is the zero-based index in the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayNodeRecord {
    pub id: i64,
    pub node_id: i64,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationNodeRecord {
    pub id: i64,
    pub node_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationWayRecord {
    pub id: i64,
    pub way_id: i64,
}

/// All records extracted from a single entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedElement {
    Node {
        node: NodeRecord,
        tags: Vec<TagRecord>,
    },
    Way {
        way: WayRecord,
        tags: Vec<TagRecord>,
        nodes: Vec<WayNodeRecord>,
    },
    Relation {
        relation: RelationRecord,
        tags: Vec<TagRecord>,
        nodes: Vec<RelationNodeRecord>,
        ways: Vec<RelationWayRecord>,
    },
}

impl ShapedElement {
    pub fn id(&self) -> i64 {
        match self {
            ShapedElement::Node { node, .. } => node.id,
            ShapedElement::Way { way, .. } => way.id,
            ShapedElement::Relation { relation, .. } => relation.id,
        }
    }

    pub fn tags(&self) -> &[TagRecord] {
        match self {
            ShapedElement::Node { tags, .. }
            | ShapedElement::Way { tags, .. }
            | ShapedElement::Relation { tags, .. } => tags,
        }
    }
}

/// The nine output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Nodes,
    NodeTags,
    Ways,
    WayNodes,
    WayTags,
    Relations,
    RelationTags,
    RelationNodes,
    RelationWays,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::Nodes,
        RecordKind::NodeTags,
        RecordKind::Ways,
        RecordKind::WayNodes,
        RecordKind::WayTags,
        RecordKind::Relations,
        RecordKind::RelationTags,
        RecordKind::RelationNodes,
        RecordKind::RelationWays,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Nodes => "nodes.csv",
            RecordKind::NodeTags => "nodes_tags.csv",
            RecordKind::Ways => "ways.csv",
            RecordKind::WayNodes => "ways_nodes.csv",
            RecordKind::WayTags => "ways_tags.csv",
            RecordKind::Relations => "relations.csv",
            RecordKind::RelationTags => "relations_tags.csv",
            RecordKind::RelationNodes => "relations_nodes.csv",
            RecordKind::RelationWays => "relations_ways.csv",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        const TAG_FIELDS: &[&str] = &["id", "key", "value", "type"];
        const ENTITY_FIELDS: &[&str] = &["id", "user", "uid", "version", "changeset", "timestamp"];

        match self {
            RecordKind::Nodes => &["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"],
            RecordKind::NodeTags | RecordKind::WayTags | RecordKind::RelationTags => TAG_FIELDS,
            RecordKind::Ways | RecordKind::Relations => ENTITY_FIELDS,
            RecordKind::WayNodes => &["id", "node_id", "position"],
            RecordKind::RelationNodes => &["id", "node_id"],
            RecordKind::RelationWays => &["id", "way_id"],
        }
    }
}
