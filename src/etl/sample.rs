use std::fs;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;

use crate::config::UserConfig;
use crate::data::osm::OsmElement;
use crate::errors::Result;
use crate::etl::reader::{create_osm_reader, open_document, parse_start, ElementCursor};
use crate::etl::Etl;

pub const ETL_NAME: &str = "sample_osm";
pub const OUTPUT_FILE_NAME: &str = "sample.osm";
const ROOT_ELEMENT: &str = "osm";
/// Root attribute recording the interval a sample was taken with.
const INTERVAL_ATTRIBUTE: &str = "sample_every";

/// Every `every`-th entity of a document, starting with the first one.
pub struct SampledElements<R: BufRead> {
    cursor: ElementCursor<R>,
    every: usize,
    index: usize,
}

impl<R: BufRead> SampledElements<R> {
    pub fn new(cursor: ElementCursor<R>, every: usize) -> Self {
        SampledElements {
            cursor,
            every: every.max(1),
            index: 0,
        }
    }

    pub fn every(&self) -> usize {
        self.every
    }
}

impl<R: BufRead> Iterator for SampledElements<R> {
    type Item = Result<OsmElement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let element = match self.cursor.next_element() {
                Ok(Some(element)) => element,
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            };
            let index = self.index;
            self.index += 1;
            if index % self.every == 0 {
                return Some(Ok(element));
            }
        }
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &OsmElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }
    Ok(())
}

/// Interval recorded on the root of an existing sample, if any.
pub fn recorded_interval(path: &Path) -> Result<Option<usize>> {
    let mut reader = create_osm_reader(open_document(path)?);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => return Ok(None),
            Event::Start(e) | Event::Empty(e) => {
                let root = parse_start(&e)?;
                let every = root.attribute(INTERVAL_ATTRIBUTE).and_then(|value| value.parse().ok());
                return Ok(every);
            },
            _ => (),
        }
        buf.clear();
    }
}

/// Writes `elements` as a standalone UTF-8 document under a single `<osm>` root
/// that records the sampling interval. Returns the number of entities written.
pub fn write_sample<W, I>(sink: W, every: usize, elements: I) -> Result<usize>
where
    W: Write,
    I: Iterator<Item = Result<OsmElement>>,
{
    let mut writer = Writer::new_with_indent(sink, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let every = every.to_string();
    let root = BytesStart::new(ROOT_ELEMENT).with_attributes([(INTERVAL_ATTRIBUTE, every.as_str())]);
    writer.write_event(Event::Start(root))?;

    let mut written = 0;
    for element in elements {
        write_element(&mut writer, &element?)?;
        written += 1;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    writer.into_inner().flush()?;
    Ok(written)
}

pub struct SampleEtl<'a> {
    config: &'a UserConfig,
}

impl SampleEtl<'_> {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new(config: &UserConfig) -> SampleEtl {
        SampleEtl {
            config
        }
    }
}

impl Etl for SampleEtl<'_> {
    type Input = ElementCursor<Box<dyn BufRead>>;
    type Output = SampledElements<Box<dyn BufRead>>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    /// Cached only when the existing sample was taken with the configured interval.
    fn is_cached(&self, dir: &Path) -> Result<bool> {
        let path = Self::output_path(dir);
        if !path.try_exists()? {
            return Ok(false);
        }
        Ok(recorded_interval(&path)? == Some(self.config.sample_every.max(1)))
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        fs::remove_file(Self::output_path(dir))?;
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let source = open_document(Path::new(&self.config.data_path))?;
        Ok(ElementCursor::new(source))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        Ok(SampledElements::new(input, self.config.sample_every))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        fs::create_dir_all(dir)?;
        let output_file = BufWriter::new(fs::File::create(Self::output_path(dir))?);
        let every = output.every();
        let written = write_sample(output_file, every, output)?;
        info!(etl_name = self.etl_name(), every = every, entities = written; "Wrote sample");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="30.1" minlon="-97.9" maxlat="30.5" maxlon="-97.5"/>
  <node id="1" lat="30.1" lon="-97.1"/>
  <node id="2" lat="30.2" lon="-97.2"><tag k="name" v="Joe&apos;s &lt;Diner&gt;"/></node>
  <node id="3" lat="30.3" lon="-97.3"/>
  <way id="4"><nd ref="1"/><nd ref="2"/></way>
  <relation id="5"><member type="way" ref="4" role="outer"/></relation>
</osm>"#;

    fn sample(every: usize) -> (usize, String) {
        let elements = SampledElements::new(ElementCursor::new(DOCUMENT.as_bytes()), every);
        let mut buf = Vec::new();
        let written = write_sample(&mut buf, every, elements).unwrap();
        (written, String::from_utf8(buf).unwrap())
    }

    fn ids(document: &str) -> Vec<String> {
        ElementCursor::new(document.as_bytes())
            .map(|el| el.unwrap().attribute("id").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_keeps_every_kth_entity() {
        let (written, document) = sample(2);
        assert_eq!(written, 3);
        assert_eq!(ids(&document), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_every_one_round_trips_entities() {
        let (_, document) = sample(1);
        let original: Vec<OsmElement> = ElementCursor::new(DOCUMENT.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        let sampled: Vec<OsmElement> = ElementCursor::new(document.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(sampled, original);
    }

    #[test]
    fn test_sample_is_wrapped_in_osm_root() {
        let (_, document) = sample(10);
        assert!(document.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(document.contains(r#"<osm sample_every="10">"#));
        assert!(document.trim_end().ends_with("</osm>"));
        assert_eq!(ids(&document), vec!["1"]);
    }

    #[test]
    fn test_zero_interval_behaves_like_one() {
        let elements = SampledElements::new(ElementCursor::new(DOCUMENT.as_bytes()), 0);
        assert_eq!(elements.count(), 5);
    }

    #[test]
    fn test_cache_follows_sampling_interval() {
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("map.osm");
        fs::write(&source, DOCUMENT).unwrap();
        let dest = work.path().join("out");

        let mut config = UserConfig::new(source.to_string_lossy(), dest.to_string_lossy());
        config.sample_every = 2;
        SampleEtl::new(&config).process(&dest).unwrap();
        assert!(SampleEtl::new(&config).is_cached(&dest).unwrap());
        assert_eq!(recorded_interval(&dest.join(OUTPUT_FILE_NAME)).unwrap(), Some(2));

        config.sample_every = 3;
        let mut etl = SampleEtl::new(&config);
        assert!(!etl.is_cached(&dest).unwrap());
        etl.process(&dest).unwrap();
        let document = fs::read_to_string(dest.join(OUTPUT_FILE_NAME)).unwrap();
        assert_eq!(ids(&document), vec!["1", "4"]);
    }

    #[test]
    fn test_sample_without_interval_is_not_cached() {
        let work = tempfile::tempdir().unwrap();
        fs::write(work.path().join(OUTPUT_FILE_NAME), DOCUMENT).unwrap();
        let config = UserConfig::new("unused.osm", work.path().to_string_lossy());
        assert!(!SampleEtl::new(&config).is_cached(work.path()).unwrap());
    }
}
