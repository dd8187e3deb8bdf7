//! Pull-based cursor over the entities of an .osm document.
//!
//! Only the subtree of the entity currently being assembled lives in memory.
//! Each finished entity is handed out by value, so it is released as soon as the
//! caller drops it, and the event buffer is cleared after every event.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::OsmElement;
use crate::errors::{Error, Result};

/// Opens an .osm document, decompressing it on the fly when it ends in `.xz`.
pub fn open_document(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = fs::File::open(path)
        .map_err(|err| Error::from(format!("could not open {}: {}", path.display(), err)))?;
    let file_reader = BufReader::new(file);

    if path.extension().is_some_and(|ext| ext == "xz") {
        let xz_reader = XzDecoder::new(file_reader);
        Ok(Box::new(BufReader::new(xz_reader)))
    } else {
        Ok(Box::new(file_reader))
    }
}

pub fn create_osm_reader<R: BufRead>(source: R) -> Reader<R> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);
    reader
}

/// Reads the name and unescaped attributes of a start tag.
pub fn parse_start(el: &BytesStart) -> Result<OsmElement> {
    let name = str::from_utf8(el.name().as_ref())?.to_string();
    let mut element = OsmElement::new(name);
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

pub struct ElementCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// Open elements of the entity being assembled, outermost first.
    stack: Vec<OsmElement>,
    /// Elements open outside of any entity (`osm`, `bounds`, ...).
    outer_depth: usize,
    entities_read: usize,
    finished: bool,
}

impl<R: BufRead> ElementCursor<R> {
    pub fn new(source: R) -> Self {
        ElementCursor {
            reader: create_osm_reader(source),
            buf: Vec::new(),
            stack: Vec::new(),
            outer_depth: 0,
            entities_read: 0,
            finished: false,
        }
    }

    /// Number of entities handed out so far.
    pub fn entities_read(&self) -> usize {
        self.entities_read
    }

    /// Advances to the next complete node, way or relation.
    ///
    /// Returns `Ok(None)` once the document is exhausted. Any parse failure is
    /// fatal and ends the cursor.
    pub fn next_element(&mut self) -> Result<Option<OsmElement>> {
        if self.finished {
            return Ok(None);
        }
        match self.read_until_entity() {
            Ok(Some(element)) => {
                self.entities_read += 1;
                Ok(Some(element))
            },
            Ok(None) => {
                self.finished = true;
                Ok(None)
            },
            Err(err) => {
                self.finished = true;
                self.release();
                Err(err)
            },
        }
    }

    /// Drops any partially assembled subtree and the event buffer.
    pub fn release(&mut self) {
        self.stack.clear();
        self.buf.clear();
    }

    fn read_until_entity(&mut self) -> Result<Option<OsmElement>> {
        loop {
            let event = self.reader.read_event_into(&mut self.buf)
                .map_err(|err| Error::from(format!(
                    "malformed OSM document at byte {}: {}",
                    self.reader.buffer_position(),
                    err,
                )))?;

            let completed = match event {
                Event::Eof => {
                    if !self.stack.is_empty() || self.outer_depth > 0 {
                        return Err("malformed OSM document: unexpected end of document".into());
                    }
                    return Ok(None);
                },
                Event::Start(e) => {
                    let element = parse_start(&e)?;
                    if self.stack.is_empty() && element.entity_kind().is_none() {
                        self.outer_depth += 1;
                    } else {
                        self.stack.push(element);
                    }
                    None
                },
                Event::Empty(e) => {
                    let element = parse_start(&e)?;
                    close(&mut self.stack, element)
                },
                Event::End(_) => {
                    match self.stack.pop() {
                        Some(element) => close(&mut self.stack, element),
                        None => {
                            self.outer_depth = self.outer_depth.saturating_sub(1);
                            None
                        },
                    }
                },
                // Declarations, comments, text and the like carry no map data.
                _ => None,
            };
            self.buf.clear();

            if let Some(element) = completed {
                return Ok(Some(element));
            }
        }
    }
}

/// Attaches a finished element to its parent, or hands it out when it is a
/// complete entity.
fn close(stack: &mut [OsmElement], element: OsmElement) -> Option<OsmElement> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            None
        },
        None if element.entity_kind().is_some() => Some(element),
        None => None,
    }
}

impl<R: BufRead> Iterator for ElementCursor<R> {
    type Item = Result<OsmElement>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element().transpose()
    }
}
