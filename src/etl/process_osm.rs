use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use log::info;

use crate::config::UserConfig;
use crate::data::records::{RecordKind, ShapedElement};
use crate::errors::Result;
use crate::etl::csv_output::{output_path, CsvOutput, RowCounts};
use crate::etl::reader::{open_document, ElementCursor};
use crate::etl::shape::shape_element;
use crate::etl::Etl;

pub const ETL_NAME: &str = "process_osm";

/// Lazily shapes the entities of a document, one at a time.
///
/// Each element subtree is dropped right after its records are built, so only
/// one entity is ever held in memory.
pub struct ShapedElements<R: BufRead> {
    cursor: ElementCursor<R>,
}

impl<R: BufRead> ShapedElements<R> {
    pub fn new(cursor: ElementCursor<R>) -> Self {
        ShapedElements { cursor }
    }
}

impl<R: BufRead> Iterator for ShapedElements<R> {
    type Item = Result<ShapedElement>;

    fn next(&mut self) -> Option<Self::Item> {
        let element = match self.cursor.next_element() {
            Ok(Some(element)) => element,
            Ok(None) => return None,
            Err(err) => return Some(Err(err)),
        };
        Some(shape_element(&element))
    }
}

/// Writes every shaped element to `output`, stopping at the first error.
pub fn write_all<W, I>(output: &mut CsvOutput<W>, elements: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = Result<ShapedElement>>,
{
    for shaped in elements {
        output.write(&shaped?)?;
    }
    Ok(())
}

/// Shapes a whole document into the nine CSV files in `dir`.
pub fn process_map<R: BufRead>(source: R, dir: &Path) -> Result<RowCounts> {
    let mut output = CsvOutput::create(dir)?;
    write_all(&mut output, ShapedElements::new(ElementCursor::new(source)))?;
    output.finish()
}

pub struct ProcessOsmEtl<'a> {
    config: &'a UserConfig,
}

impl ProcessOsmEtl<'_> {
    pub fn new(config: &UserConfig) -> ProcessOsmEtl {
        ProcessOsmEtl {
            config
        }
    }
}

impl Etl for ProcessOsmEtl<'_> {
    type Input = ElementCursor<Box<dyn BufRead>>;
    type Output = ShapedElements<Box<dyn BufRead>>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        for kind in RecordKind::ALL {
            if !output_path(dir, kind).try_exists()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        for kind in RecordKind::ALL {
            let path = output_path(dir, kind);
            if path.try_exists()? {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let source = open_document(Path::new(&self.config.data_path))?;
        Ok(ElementCursor::new(source))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        Ok(ShapedElements::new(input))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let mut csv_output = CsvOutput::create(dir)?;
        if self.config.progress {
            write_all(&mut csv_output, tqdm::tqdm(output))?;
        } else {
            write_all(&mut csv_output, output)?;
        }
        let counts = csv_output.finish()?;

        info!(
            etl_name = self.etl_name(),
            nodes = counts.get(RecordKind::Nodes),
            ways = counts.get(RecordKind::Ways),
            relations = counts.get(RecordKind::Relations),
            node_tags = counts.get(RecordKind::NodeTags),
            way_tags = counts.get(RecordKind::WayTags),
            relation_tags = counts.get(RecordKind::RelationTags);
            "Wrote CSV tables"
        );
        Ok(())
    }
}
