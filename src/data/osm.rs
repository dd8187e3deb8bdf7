use std::fmt;

/// One element of the .osm document together with all of its nested children.
///
/// Attributes are kept in source order with their values already unescaped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<OsmElement>,
}

impl OsmElement {
    pub fn new(name: impl Into<String>) -> Self {
        OsmElement {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: OsmElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children with the given element name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OsmElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn entity_kind(&self) -> Option<EntityKind> {
        EntityKind::from_name(&self.name)
    }
}

/// The three top-level element kinds carrying map data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Node,
    Way,
    Relation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Node, EntityKind::Way, EntityKind::Relation];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "node" => Some(EntityKind::Node),
            "way" => Some(EntityKind::Way),
            "relation" => Some(EntityKind::Relation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Way => "way",
            EntityKind::Relation => "relation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_returns_first_match() {
        let el = OsmElement::new("node")
            .with_attribute("id", "1")
            .with_attribute("lat", "30.5");
        assert_eq!(el.attribute("lat"), Some("30.5"));
        assert_eq!(el.attribute("lon"), None);
    }

    #[test]
    fn test_entity_kind_from_name() {
        assert_eq!(EntityKind::from_name("way"), Some(EntityKind::Way));
        assert_eq!(EntityKind::from_name("bounds"), None);
        assert_eq!(EntityKind::from_name("Node"), None);
        assert_eq!(OsmElement::new("relation").entity_kind(), Some(EntityKind::Relation));
    }

    #[test]
    fn test_children_named_keeps_document_order() {
        let el = OsmElement::new("way")
            .with_child(OsmElement::new("nd").with_attribute("ref", "3"))
            .with_child(OsmElement::new("tag"))
            .with_child(OsmElement::new("nd").with_attribute("ref", "1"));
        let refs: Vec<_> = el.children_named("nd").filter_map(|nd| nd.attribute("ref")).collect();
        assert_eq!(refs, vec!["3", "1"]);
    }
}
