use super::{coerce_measure, RecordExtractor};
use crate::constants::{FIELD_HEIGHT, FIELD_NAME, FIELD_WEIGHT, XML_RECORD_TAG};
use crate::errors::{AppError, AppResult};
use crate::models::{Dataset, Record, SourceFormat};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Nesting level of `<person>` elements (the root is level 1).
const RECORD_DEPTH: usize = 2;
/// Nesting level of the `<name>`/`<height>`/`<weight>` children.
const FIELD_DEPTH: usize = 3;

/// Reads documents whose root holds repeated `<person>` elements.
pub struct XmlExtractor;

impl RecordExtractor for XmlExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Xml
    }

    fn extract(&self, path: &Path) -> AppResult<Dataset> {
        let content = fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read XML file {}: {e}", path.display()))
        })?;
        parse_xml_bytes(&content, path)
    }
}

/// Represents the field currently being read within a person
#[derive(Clone, Copy)]
enum PersonField {
    Name,
    Height,
    Weight,
}

impl PersonField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"name" => Some(Self::Name),
            b"height" => Some(Self::Height),
            b"weight" => Some(Self::Weight),
            _ => None,
        }
    }
}

/// Collects the child texts of a single `<person>` element.
#[derive(Default)]
struct PersonBuilder {
    name: Option<String>,
    height: Option<String>,
    weight: Option<String>,
    current_field: Option<PersonField>,
    text: String,
}

impl PersonBuilder {
    fn start_field(&mut self, field: PersonField) {
        self.current_field = Some(field);
        self.text.clear();
    }

    fn is_reading_field(&self) -> bool {
        self.current_field.is_some()
    }

    fn push_text(&mut self, text: &str) {
        if self.current_field.is_some() {
            self.text.push_str(text);
        }
    }

    /// Stores the collected text. The first occurrence of a child wins.
    fn finish_field(&mut self) {
        let Some(field) = self.current_field.take() else {
            return;
        };
        let value = self.text.trim().to_string();
        self.text.clear();
        let slot = match field {
            PersonField::Name => &mut self.name,
            PersonField::Height => &mut self.height,
            PersonField::Weight => &mut self.weight,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn build(self, position: usize, path: &Path) -> AppResult<Record> {
        let missing =
            |tag: &str| AppError::format(path, format!("<person> #{position} is missing <{tag}>"));
        let name = self.name.ok_or_else(|| missing(FIELD_NAME))?;
        let height = self.height.ok_or_else(|| missing(FIELD_HEIGHT))?;
        let weight = self.weight.ok_or_else(|| missing(FIELD_WEIGHT))?;

        let height = coerce_measure(&height, FIELD_HEIGHT, &name)?;
        let weight = coerce_measure(&weight, FIELD_WEIGHT, &name)?;
        Ok(Record::new(name, height, weight))
    }
}

/// Parses XML content provided as bytes.
///
/// Only `<person>` elements that are direct children of the root are read;
/// deeper `<person>` elements are ignored. The whole document fails on the
/// first incomplete person, so no partial dataset is ever returned.
pub(crate) fn parse_xml_bytes(content: &[u8], path: &Path) -> AppResult<Dataset> {
    let mut reader = Reader::from_reader(Cursor::new(content));
    let mut buf = Vec::with_capacity(4096);
    let mut records = Vec::new();

    let mut depth = 0usize;
    let mut person: Option<PersonBuilder> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            AppError::format(
                path,
                format!("Malformed XML at byte {}: {e}", reader.error_position()),
            )
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let tag = e.name();
                match depth {
                    RECORD_DEPTH if tag.as_ref() == XML_RECORD_TAG => {
                        person = Some(PersonBuilder::default());
                    }
                    FIELD_DEPTH => {
                        if let (Some(builder), Some(field)) =
                            (person.as_mut(), PersonField::from_tag(tag.as_ref()))
                        {
                            builder.start_field(field);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let tag = e.name();
                match depth + 1 {
                    RECORD_DEPTH if tag.as_ref() == XML_RECORD_TAG => {
                        records.push(PersonBuilder::default().build(records.len() + 1, path)?);
                    }
                    FIELD_DEPTH => {
                        // <height/> is present but empty
                        if let (Some(builder), Some(field)) =
                            (person.as_mut(), PersonField::from_tag(tag.as_ref()))
                        {
                            builder.start_field(field);
                            builder.finish_field();
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) if depth == FIELD_DEPTH => {
                if let Some(builder) = person.as_mut().filter(|b| b.is_reading_field()) {
                    let text = e
                        .decode()
                        .map_err(|e| AppError::format(path, format!("Failed to decode text: {e}")))?;
                    builder.push_text(&text);
                }
            }
            Event::CData(e) if depth == FIELD_DEPTH => {
                if let Some(builder) = person.as_mut().filter(|b| b.is_reading_field()) {
                    let text = e
                        .decode()
                        .map_err(|e| AppError::format(path, format!("Failed to decode CDATA: {e}")))?;
                    builder.push_text(&text);
                }
            }
            Event::GeneralRef(e) if depth == FIELD_DEPTH => {
                if let Some(builder) = person.as_mut().filter(|b| b.is_reading_field()) {
                    let resolved = match e.resolve_char_ref() {
                        Ok(Some(ch)) => ch.to_string(),
                        Ok(None) => {
                            let name = e.decode().map_err(|err| {
                                AppError::format(path, format!("Failed to decode entity: {err}"))
                            })?;
                            quick_xml::escape::resolve_predefined_entity(&name)
                                .map(str::to_owned)
                                .ok_or_else(|| {
                                    AppError::format(path, format!("Unknown entity '&{name};'"))
                                })?
                        }
                        Err(err) => {
                            return Err(AppError::format(
                                path,
                                format!("Invalid character reference: {err}"),
                            ))
                        }
                    };
                    builder.push_text(&resolved);
                }
            }
            Event::End(_) => {
                match depth {
                    FIELD_DEPTH => {
                        if let Some(builder) = person.as_mut() {
                            builder.finish_field();
                        }
                    }
                    RECORD_DEPTH => {
                        if let Some(builder) = person.take() {
                            records.push(builder.build(records.len() + 1, path)?);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Dataset::from(records))
}
