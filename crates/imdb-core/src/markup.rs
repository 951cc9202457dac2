//! XML export of records.
//!
//! The document root is named after the record kind and carries the id:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <movie id="0133093">
//!   <title>The Matrix</title>
//!   <year type="int">1999</year>
//!   <cast type="list">
//!     <person id="0000206">
//!       <name>Keanu Reeves</name>
//!     </person>
//!   </cast>
//! </movie>
//! ```
//!
//! Attribute keys become element names (`raw akas` → `raw-akas`); when that
//! changes the key, the original is kept in a `key` attribute.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ImdbError, Result};
use crate::record::{Record, Value};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Render a record and everything nested in it as an XML document.
pub fn to_markup(record: &Record) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_record(&mut writer, record)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| ImdbError::Markup(e.to_string()))
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ImdbError::Markup(e.to_string()))
}

fn write_record(writer: &mut XmlWriter, record: &Record) -> Result<()> {
    let tag = record.kind().as_str();
    let mut start = BytesStart::new(tag);
    start.push_attribute(("id", record.id().as_str()));
    emit(writer, Event::Start(start))?;

    for (key, value) in record.attributes() {
        write_value(writer, key, value)?;
    }

    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn write_value(writer: &mut XmlWriter, key: &str, value: &Value) -> Result<()> {
    let name = element_name(key);
    let mut start = BytesStart::new(name.as_str());
    if name != key {
        start.push_attribute(("key", xml_safe(key).as_str()));
    }
    match value {
        Value::Int(_) => start.push_attribute(("type", "int")),
        Value::Float(_) => start.push_attribute(("type", "float")),
        Value::List(_) => start.push_attribute(("type", "list")),
        Value::Map(_) => start.push_attribute(("type", "map")),
        Value::Text(_) | Value::Record(_) => {}
    }
    emit(writer, Event::Start(start))?;

    match value {
        Value::Text(text) => emit(writer, Event::Text(BytesText::new(&xml_safe(text))))?,
        Value::Int(n) => emit(writer, Event::Text(BytesText::new(&n.to_string())))?,
        Value::Float(f) => emit(writer, Event::Text(BytesText::new(&f.to_string())))?,
        Value::List(items) => {
            for item in items {
                match item {
                    Value::Record(record) => write_record(writer, record)?,
                    other => write_value(writer, "item", other)?,
                }
            }
        }
        Value::Map(map) => {
            for (child_key, child) in map {
                write_value(writer, child_key, child)?;
            }
        }
        Value::Record(record) => write_record(writer, record)?,
    }

    emit(writer, Event::End(BytesEnd::new(name.as_str())))
}

/// Turn an attribute key into a valid XML element name.
///
/// # Examples
/// ```
/// use imdb_core::markup::element_name;
///
/// assert_eq!(element_name("raw akas"), "raw-akas");
/// assert_eq!(element_name("cover url"), "cover-url");
/// assert_eq!(element_name("3d"), "_3d");
/// ```
pub fn element_name(key: &str) -> String {
    let mut name: String = key
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || name.to_ascii_lowercase().starts_with("xml") {
        name.insert(0, '_');
    }
    name
}

/// Drop characters XML 1.0 cannot carry (most control characters).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Kind, RecordId};
    use quick_xml::Reader;
    use std::collections::BTreeMap;

    fn id(raw: &str) -> RecordId {
        RecordId::parse(raw).unwrap()
    }

    /// Parse the document and return (element names in order, text nodes).
    fn parse(xml: &str) -> (Vec<String>, Vec<String>) {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut names = Vec::new();
        let mut texts = Vec::new();
        let mut depth = 0i32;
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    depth += 1;
                    names.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                }
                Ok(Event::End(_)) => depth -= 1,
                Ok(Event::Text(e)) => texts.push(e.unescape().unwrap().to_string()),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("invalid markup: {e}\n{xml}"),
            }
        }
        assert_eq!(depth, 0, "unbalanced markup:\n{xml}");
        (names, texts)
    }

    #[test]
    fn test_markup_of_movie_with_cast() {
        let movie = Record::new(Kind::Movie, id("0133093"))
            .with("title", "The Matrix")
            .with("year", 1999_i64)
            .with("rating", 8.7)
            .with(
                "cast",
                vec![Record::new(Kind::Person, id("0000206")).with("name", "Keanu Reeves")],
            );
        let xml = movie.to_markup().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<movie id=\"0133093\">"));
        assert!(xml.contains("<year type=\"int\">1999</year>"));
        assert!(xml.contains("<person id=\"0000206\">"));

        let (names, texts) = parse(&xml);
        assert_eq!(names[0], "movie");
        assert!(texts.contains(&"Keanu Reeves".to_string()));
    }

    #[test]
    fn test_markup_escapes_reserved_characters() {
        let movie = Record::new(Kind::Movie, id("0000001"))
            .with("title", "Tom & Jerry <\"Live\"> 'Special'");
        let xml = movie.to_markup().unwrap();

        assert!(!xml.contains("Tom & Jerry"));
        let (_, texts) = parse(&xml);
        assert_eq!(texts, vec!["Tom & Jerry <\"Live\"> 'Special'".to_string()]);
    }

    #[test]
    fn test_markup_non_ascii_and_control_characters() {
        let movie = Record::new(Kind::Movie, id("0211915"))
            .with("title", "Le fabuleux destin d'Amélie Poulain")
            .with(
                "akas from release info",
                vec![Value::from("Матрица::Russia"), Value::from("マトリックス\u{1}::Japan")],
            );
        let xml = movie.to_markup().unwrap();

        let (names, texts) = parse(&xml);
        assert!(names.contains(&"akas-from-release-info".to_string()));
        assert!(texts.contains(&"Le fabuleux destin d'Amélie Poulain".to_string()));
        assert!(texts.contains(&"マトリックス::Japan".to_string()));
    }

    #[test]
    fn test_markup_nested_maps_keep_original_keys() {
        let mut tech = BTreeMap::new();
        tech.insert("aspect ratio".to_string(), Value::from(vec![Value::from("2.39 : 1")]));
        let movie = Record::new(Kind::Movie, id("0133093")).with("tech", tech);
        let xml = movie.to_markup().unwrap();

        assert!(xml.contains("<tech type=\"map\">"));
        assert!(xml.contains("<aspect-ratio key=\"aspect ratio\" type=\"list\">"));
        parse(&xml);
    }

    #[test]
    fn test_markup_tv_series_root() {
        let show = Record::new(Kind::TvSeries, id("0903747"));
        let xml = show.to_markup().unwrap();
        let (names, _) = parse(&xml);
        assert_eq!(names, vec!["tv-series".to_string()]);
    }

    #[test]
    fn test_element_name_sanitizing() {
        assert_eq!(element_name("plot"), "plot");
        assert_eq!(element_name("advisories nudity"), "advisories-nudity");
        assert_eq!(element_name("xml"), "_xml");
        assert_eq!(element_name("Año"), "A-o");
        assert_eq!(element_name(""), "_");
    }

    #[test]
    fn test_xml_safe_strips_invalid_chars() {
        assert_eq!(xml_safe("a\u{0}b\u{1F}c\td"), "abc\td");
        assert_eq!(xml_safe("Amélie 🎬"), "Amélie 🎬");
    }
}
