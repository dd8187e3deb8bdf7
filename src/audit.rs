//! Read-only reports over an .osm document, used to decide which cleaning
//! rules are worth writing. Nothing here feeds back into the CSV export.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use quick_xml::events::Event;
use serde_json::Value;

use crate::data::osm::{EntityKind, OsmElement};
use crate::errors::Result;
use crate::etl::reader::{create_osm_reader, parse_start, ElementCursor};
use crate::normalize::phone::audit_phone_format;
use crate::normalize::street::audit_street_type;
use crate::normalize::{PHONE_KEY, STREET_KEY};

/// Values grouped under a shared key, e.g. street names by suffix.
pub type GroupedValues = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AuditReport {
    /// Connector characters used between phone number digit blocks.
    PhoneFormats,
    /// Street names on ways grouped by an unexpected final word.
    StreetTypes,
    /// Tag key counts per entity kind.
    TagKeys,
    /// Child element names per element name.
    Children,
    /// Occurrences of every element name.
    TagCounts,
}

impl AuditReport {
    pub fn run<R: BufRead>(self, source: R) -> Result<Value> {
        let report = match self {
            AuditReport::PhoneFormats => serde_json::to_value(audit_phone_formats(source)?)?,
            AuditReport::StreetTypes => serde_json::to_value(audit_street_types(source)?)?,
            AuditReport::TagKeys => serde_json::to_value(tag_keys_by_entity(source)?)?,
            AuditReport::Children => serde_json::to_value(find_children_and_tags(source)?)?,
            AuditReport::TagCounts => serde_json::to_value(count_tags(source)?)?,
        };
        Ok(report)
    }
}

/// Number of occurrences of every element name, at any depth.
pub fn count_tags<R: BufRead>(source: R) -> Result<BTreeMap<String, usize>> {
    let mut reader = create_osm_reader(source);
    let mut buf = Vec::new();
    let mut tags: BTreeMap<String, usize> = BTreeMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let name = parse_start(&e)?.name;
                *tags.entry(name).or_default() += 1;
            },
            _ => (),
        }
        buf.clear();
    }
    Ok(tags)
}

/// For every element name, the distinct names of its direct children.
pub fn find_children_and_tags<R: BufRead>(source: R) -> Result<GroupedValues> {
    let mut reader = create_osm_reader(source);
    let mut buf = Vec::new();
    let mut current_path: Vec<String> = Vec::new();
    let mut tag_children = GroupedValues::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = parse_start(&e)?.name;
                if let Some(parent) = current_path.last() {
                    tag_children.entry(parent.clone()).or_default().insert(name.clone());
                }
                current_path.push(name);
            },
            Event::Empty(e) => {
                let name = parse_start(&e)?.name;
                if let Some(parent) = current_path.last() {
                    tag_children.entry(parent.clone()).or_default().insert(name);
                }
            },
            Event::End(_) => {
                current_path.pop();
            },
            _ => (),
        }
        buf.clear();
    }
    Ok(tag_children)
}

fn tags_of(element: &OsmElement) -> impl Iterator<Item = (&str, &str)> {
    element.children_named("tag")
        .filter_map(|tag| Some((tag.attribute("k")?, tag.attribute("v")?)))
}

/// Tag key counts for each of node, way and relation.
pub fn tag_keys_by_entity<R: BufRead>(source: R) -> Result<BTreeMap<String, BTreeMap<String, usize>>> {
    let mut keys_by_entity: BTreeMap<String, BTreeMap<String, usize>> = EntityKind::ALL.iter()
        .map(|kind| (kind.to_string(), BTreeMap::new()))
        .collect();

    for element in ElementCursor::new(source) {
        let element = element?;
        let Some(kind) = element.entity_kind() else {
            continue;
        };
        let counts = keys_by_entity.entry(kind.to_string()).or_default();
        for (key, _) in tags_of(&element) {
            *counts.entry(key.to_string()).or_default() += 1;
        }
    }
    Ok(keys_by_entity)
}

/// Raw `phone` values grouped by their connector pattern.
pub fn audit_phone_formats<R: BufRead>(source: R) -> Result<GroupedValues> {
    let mut phone_formats = GroupedValues::new();
    for element in ElementCursor::new(source) {
        let element = element?;
        for (_, value) in tags_of(&element).filter(|(key, _)| *key == PHONE_KEY) {
            audit_phone_format(&mut phone_formats, value);
        }
    }
    Ok(phone_formats)
}

/// `addr:street` values of ways grouped by an unexpected final word.
pub fn audit_street_types<R: BufRead>(source: R) -> Result<GroupedValues> {
    let mut street_types = GroupedValues::new();
    for element in ElementCursor::new(source) {
        let element = element?;
        if element.entity_kind() != Some(EntityKind::Way) {
            continue;
        }
        for (_, value) in tags_of(&element).filter(|(key, _)| *key == STREET_KEY) {
            audit_street_type(&mut street_types, value);
        }
    }
    Ok(street_types)
}
