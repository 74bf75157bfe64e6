//! Forward-only streaming over an XML document
//!
//! [`ElementStream`] reads events with quick-xml and only materializes the
//! subtrees of elements accepted by a [`ParentPattern`]. Each match is yielded
//! when its end tag is read, so memory stays proportional to one subtree.

use crate::error::{Error, Result};
use crate::extract::element::{Attribute, Fragment, FragmentBuilder, QualifiedName};
use crate::extract::path::ParentPattern;
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Iterator over the subtrees of matching elements, in end-tag order
pub struct ElementStream<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    pattern: ParentPattern,
    /// Names of the currently open elements, document element first
    open: Vec<QualifiedName>,
    builder: FragmentBuilder,
    source_name: String,
    done: bool,
}

impl ElementStream<BufReader<File>> {
    pub fn from_path(path: &Path, pattern: ParentPattern) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_reader(
            BufReader::new(file),
            pattern,
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead> ElementStream<R> {
    pub fn from_reader(reader: R, pattern: ParentPattern, source_name: impl Into<String>) -> Self {
        ElementStream {
            reader: NsReader::from_reader(reader),
            buf: Vec::new(),
            pattern,
            open: Vec::new(),
            builder: FragmentBuilder::new(),
            source_name: source_name.into(),
            done: false,
        }
    }

    fn xml_error(&self, source: quick_xml::Error) -> Error {
        Error::Xml {
            source_name: self.source_name.clone(),
            position: self.reader.buffer_position(),
            source,
        }
    }

    /// Read events until a matched element closes
    fn advance(&mut self) -> std::result::Result<Option<Fragment>, quick_xml::Error> {
        loop {
            self.buf.clear();
            let (resolved, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let namespace = namespace_of(resolved);

            match event {
                Event::Start(start) => {
                    let name = qualified_name(self.reader.decoder(), namespace, &start)?;
                    open_element(
                        &self.reader,
                        &self.pattern,
                        &mut self.open,
                        &mut self.builder,
                        name,
                        &start,
                    )?;
                }
                Event::Empty(start) => {
                    let name = qualified_name(self.reader.decoder(), namespace, &start)?;
                    open_element(
                        &self.reader,
                        &self.pattern,
                        &mut self.open,
                        &mut self.builder,
                        name,
                        &start,
                    )?;
                    if let Some(fragment) = self.close_element() {
                        return Ok(Some(fragment));
                    }
                }
                Event::End(_) => {
                    if let Some(fragment) = self.close_element() {
                        return Ok(Some(fragment));
                    }
                }
                Event::Text(text) => {
                    if self.builder.is_capturing() {
                        self.builder.text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if self.builder.is_capturing() {
                        self.builder.text(&self.reader.decoder().decode(&data)?);
                    }
                }
                Event::Eof => {
                    if let Some(unclosed) = self.open.last() {
                        return Err(quick_xml::Error::UnexpectedEof(format!(
                            "document ended inside <{}>",
                            unclosed
                        )));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    fn close_element(&mut self) -> Option<Fragment> {
        self.open.pop();
        if !self.builder.is_capturing() {
            return None;
        }
        let (id, matched) = self.builder.close()?;
        if !self.builder.is_capturing() {
            // the outermost captured element is always a match
            return Some(self.builder.finish());
        }
        matched.then(|| self.builder.snapshot(id))
    }
}

impl<R: BufRead> Iterator for ElementStream<R> {
    type Item = Result<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(fragment)) => Some(Ok(fragment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(self.xml_error(e)))
            }
        }
    }
}

fn namespace_of(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        // undeclared prefixes are kept as written, without a namespace
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

/// Decode raw bytes with the document's declared encoding
fn decode(decoder: Decoder, bytes: &[u8]) -> std::result::Result<String, quick_xml::Error> {
    Ok(decoder.decode(bytes)?.into_owned())
}

fn qualified_name(
    decoder: Decoder,
    namespace: Option<String>,
    start: &BytesStart,
) -> std::result::Result<QualifiedName, quick_xml::Error> {
    let prefix = match start.name().prefix() {
        Some(prefix) => Some(decode(decoder, prefix.as_ref())?),
        None => None,
    };
    Ok(QualifiedName {
        namespace,
        prefix,
        local: decode(decoder, start.local_name().as_ref())?,
    })
}

fn is_namespace_declaration(key: QName) -> bool {
    let key = key.as_ref();
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

fn decode_attributes<R>(
    reader: &NsReader<R>,
    start: &BytesStart,
) -> std::result::Result<Vec<Attribute>, quick_xml::Error> {
    let decoder = reader.decoder();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if is_namespace_declaration(attr.key) {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let prefix = match attr.key.prefix() {
            Some(prefix) => Some(decode(decoder, prefix.as_ref())?),
            None => None,
        };
        let name = QualifiedName {
            namespace: namespace_of(resolved),
            prefix,
            local: decode(decoder, local.as_ref())?,
        };
        let raw = decoder.decode(&attr.value)?;
        attributes.push(Attribute {
            name,
            value: unescape(&raw)?.into_owned(),
        });
    }
    Ok(attributes)
}

fn open_element<R>(
    reader: &NsReader<R>,
    pattern: &ParentPattern,
    open: &mut Vec<QualifiedName>,
    builder: &mut FragmentBuilder,
    name: QualifiedName,
    start: &BytesStart,
) -> std::result::Result<(), quick_xml::Error> {
    open.push(name.clone());
    let capturing = builder.is_capturing();
    let candidate = pattern.could_match(&name);
    if !capturing && !candidate {
        return Ok(());
    }

    let attributes = decode_attributes(reader, start)?;
    let matched = candidate && pattern.matches(open, &attributes);
    if capturing || matched {
        builder.open(name, attributes, matched);
    }
    Ok(())
}
