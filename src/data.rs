pub mod osm;
pub mod records;

pub use self::osm::{EntityKind, OsmElement};
pub use self::records::{
    NodeRecord, RecordKind, RelationNodeRecord, RelationRecord, RelationWayRecord, ShapedElement,
    TagRecord, WayNodeRecord, WayRecord,
};
