//! CSV writers for the nine output tables.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;

use crate::data::records::{RecordKind, ShapedElement};
use crate::errors::Result;

pub fn output_path(dir: &Path, kind: RecordKind) -> PathBuf {
    dir.join(kind.file_name())
}

/// Row counts per table, in [`RecordKind::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts([usize; 9]);

impl RowCounts {
    pub fn get(&self, kind: RecordKind) -> usize {
        self.0[kind as usize]
    }

    fn add(&mut self, kind: RecordKind, rows: usize) {
        self.0[kind as usize] += rows;
    }
}

/// One open writer per table, each already carrying its header row.
pub struct CsvOutput<W: Write> {
    nodes: csv::Writer<W>,
    node_tags: csv::Writer<W>,
    ways: csv::Writer<W>,
    way_nodes: csv::Writer<W>,
    way_tags: csv::Writer<W>,
    relations: csv::Writer<W>,
    relation_tags: csv::Writer<W>,
    relation_nodes: csv::Writer<W>,
    relation_ways: csv::Writer<W>,
    counts: RowCounts,
}

fn write_rows<W: Write, T: Serialize>(writer: &mut csv::Writer<W>, rows: &[T]) -> Result<usize> {
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(rows.len())
}

impl CsvOutput<fs::File> {
    /// Creates (or truncates) the nine CSV files in `dir`.
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Self::from_writers(|kind| Ok(fs::File::create(output_path(dir, kind))?))
    }
}

impl<W: Write> CsvOutput<W> {
    pub fn from_writers(mut open: impl FnMut(RecordKind) -> Result<W>) -> Result<Self> {
        let mut writer = |kind: RecordKind| -> Result<csv::Writer<W>> {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(open(kind)?);
            writer.write_record(kind.header())?;
            Ok(writer)
        };

        Ok(CsvOutput {
            nodes: writer(RecordKind::Nodes)?,
            node_tags: writer(RecordKind::NodeTags)?,
            ways: writer(RecordKind::Ways)?,
            way_nodes: writer(RecordKind::WayNodes)?,
            way_tags: writer(RecordKind::WayTags)?,
            relations: writer(RecordKind::Relations)?,
            relation_tags: writer(RecordKind::RelationTags)?,
            relation_nodes: writer(RecordKind::RelationNodes)?,
            relation_ways: writer(RecordKind::RelationWays)?,
            counts: RowCounts::default(),
        })
    }

    /// Appends every record of one entity: entity row, tags, then members.
    pub fn write(&mut self, element: &ShapedElement) -> Result<()> {
        match element {
            ShapedElement::Node { node, tags } => {
                self.nodes.serialize(node)?;
                self.counts.add(RecordKind::Nodes, 1);
                let rows = write_rows(&mut self.node_tags, tags)?;
                self.counts.add(RecordKind::NodeTags, rows);
            },
            ShapedElement::Way { way, tags, nodes } => {
                self.ways.serialize(way)?;
                self.counts.add(RecordKind::Ways, 1);
                let rows = write_rows(&mut self.way_tags, tags)?;
                self.counts.add(RecordKind::WayTags, rows);
                let rows = write_rows(&mut self.way_nodes, nodes)?;
                self.counts.add(RecordKind::WayNodes, rows);
            },
            ShapedElement::Relation { relation, tags, nodes, ways } => {
                self.relations.serialize(relation)?;
                self.counts.add(RecordKind::Relations, 1);
                let rows = write_rows(&mut self.relation_tags, tags)?;
                self.counts.add(RecordKind::RelationTags, rows);
                let rows = write_rows(&mut self.relation_nodes, nodes)?;
                self.counts.add(RecordKind::RelationNodes, rows);
                let rows = write_rows(&mut self.relation_ways, ways)?;
                self.counts.add(RecordKind::RelationWays, rows);
            },
        }
        Ok(())
    }

    /// Flushes and closes every table.
    pub fn finish(mut self) -> Result<RowCounts> {
        for writer in [
            &mut self.nodes,
            &mut self.node_tags,
            &mut self.ways,
            &mut self.way_nodes,
            &mut self.way_tags,
            &mut self.relations,
            &mut self.relation_tags,
            &mut self.relation_nodes,
            &mut self.relation_ways,
        ] {
            writer.flush()?;
        }
        Ok(self.counts)
    }
}
