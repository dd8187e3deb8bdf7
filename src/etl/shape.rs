//! Turns one entity subtree into its relational rows.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::data::osm::{EntityKind, OsmElement};
use crate::data::records::{
    NodeRecord, RelationNodeRecord, RelationRecord, RelationWayRecord, ShapedElement, TagRecord,
    WayNodeRecord, WayRecord, DEFAULT_TAG_TYPE,
};
use crate::errors::Result;
use crate::normalize::{update_phone_number, update_street_name, PHONE_KEY, STREET_KEY};

/// Tag keys containing any of these are malformed and get dropped.
static PROBLEM_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#).expect("Invalid problem chars regex")
});

pub fn is_valid_tag_key(key: &str) -> bool {
    !PROBLEM_CHARS.is_match(key)
}

/// Shared metadata attributes of every entity.
struct EntityMeta {
    id: i64,
    user: Option<String>,
    uid: Option<String>,
    version: Option<String>,
    changeset: Option<String>,
    timestamp: Option<String>,
}

fn parse_attribute<T>(element: &OsmElement, key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err| {
        format!(
            "invalid {} '{}' on <{}> element {}: {}",
            key,
            value,
            element.name,
            element.attribute("id").unwrap_or("without id"),
            err,
        ).into()
    })
}

fn required_attribute<T>(element: &OsmElement, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match element.attribute(key) {
        Some(value) => parse_attribute(element, key, value),
        None => Err(format!("<{}> element is missing required attribute '{}'", element.name, key).into()),
    }
}

fn string_attribute(element: &OsmElement, key: &str) -> Option<String> {
    element.attribute(key).map(str::to_string)
}

fn parse_meta(element: &OsmElement) -> Result<EntityMeta> {
    Ok(EntityMeta {
        id: required_attribute(element, "id")?,
        user: string_attribute(element, "user"),
        uid: string_attribute(element, "uid"),
        version: string_attribute(element, "version"),
        changeset: string_attribute(element, "changeset"),
        timestamp: string_attribute(element, "timestamp"),
    })
}

/// Cleans a tag value according to its key. Only `phone` and `addr:street`
/// values are touched.
pub fn clean_tag_value(key: &str, value: &str) -> String {
    match key {
        PHONE_KEY => update_phone_number(value),
        STREET_KEY => update_street_name(value),
        _ => value.to_string(),
    }
}

fn parse_tags(element: &OsmElement, id: i64) -> Result<Vec<TagRecord>> {
    let mut tags = Vec::new();
    for tag in element.children_named("tag") {
        let key: String = required_attribute(tag, "k")?;
        if !is_valid_tag_key(&key) {
            continue;
        }
        let value: String = required_attribute(tag, "v")?;
        tags.push(TagRecord {
            id,
            value: clean_tag_value(&key, &value),
            key,
            tag_type: DEFAULT_TAG_TYPE.to_string(),
        });
    }
    Ok(tags)
}

fn parse_way_nodes(element: &OsmElement, id: i64) -> Result<Vec<WayNodeRecord>> {
    element.children_named("nd")
        .enumerate()
        .map(|(position, nd)| -> Result<WayNodeRecord> {
            Ok(WayNodeRecord {
                id,
                node_id: required_attribute(nd, "ref")?,
                position,
            })
        })
        .collect()
}

fn parse_members(element: &OsmElement, id: i64) -> Result<(Vec<RelationNodeRecord>, Vec<RelationWayRecord>)> {
    let mut nodes = Vec::new();
    let mut ways = Vec::new();
    for member in element.children_named("member") {
        match member.attribute("type") {
            Some("node") => nodes.push(RelationNodeRecord {
                id,
                node_id: required_attribute(member, "ref")?,
            }),
            Some("way") => ways.push(RelationWayRecord {
                id,
                way_id: required_attribute(member, "ref")?,
            }),
            // Nested relations and unknown member types are not exported.
            _ => (),
        }
    }
    Ok((nodes, ways))
}

fn shape_node(element: &OsmElement) -> Result<ShapedElement> {
    let meta = parse_meta(element)?;
    let tags = parse_tags(element, meta.id)?;
    let node = NodeRecord {
        id: meta.id,
        lat: string_attribute(element, "lat"),
        lon: string_attribute(element, "lon"),
        user: meta.user,
        uid: meta.uid,
        version: meta.version,
        changeset: meta.changeset,
        timestamp: meta.timestamp,
    };
    Ok(ShapedElement::Node { node, tags })
}

fn shape_way(element: &OsmElement) -> Result<ShapedElement> {
    let meta = parse_meta(element)?;
    let tags = parse_tags(element, meta.id)?;
    let nodes = parse_way_nodes(element, meta.id)?;
    let way = WayRecord {
        id: meta.id,
        user: meta.user,
        uid: meta.uid,
        version: meta.version,
        changeset: meta.changeset,
        timestamp: meta.timestamp,
    };
    Ok(ShapedElement::Way { way, tags, nodes })
}

fn shape_relation(element: &OsmElement) -> Result<ShapedElement> {
    let meta = parse_meta(element)?;
    let tags = parse_tags(element, meta.id)?;
    let (nodes, ways) = parse_members(element, meta.id)?;
    let relation = RelationRecord {
        id: meta.id,
        user: meta.user,
        uid: meta.uid,
        version: meta.version,
        changeset: meta.changeset,
        timestamp: meta.timestamp,
    };
    Ok(ShapedElement::Relation { relation, tags, nodes, ways })
}

/// Classifies a node, way or relation subtree and extracts its records.
///
/// Unknown attributes are ignored, malformed tag keys and unsupported member
/// types are dropped. Metadata and coordinates are copied as written. Fails on
/// anything that is not an entity and on a missing or non-numeric id or
/// reference.
pub fn shape_element(element: &OsmElement) -> Result<ShapedElement> {
    match element.entity_kind() {
        Some(EntityKind::Node) => shape_node(element),
        Some(EntityKind::Way) => shape_way(element),
        Some(EntityKind::Relation) => shape_relation(element),
        None => Err(format!("<{}> is not a node, way or relation", element.name).into()),
    }
}
