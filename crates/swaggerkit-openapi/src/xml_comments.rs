//! XML documentation comments
//!
//! Reads a doc file in the `<doc><members><member name="...">` layout and
//! exposes its entries by member name. Member names follow two prefixes:
//!
//! - `M:{controller}.{action}` (or `M:{action}`) documents an operation:
//!   `<summary>`, `<remarks>`, `<param name="...">`, `<response code="...">`;
//! - `T:{name}` documents a controller (its tag) or a component schema.
//!
//! Members that match nothing in the generated document are ignored.

use crate::error::XmlCommentsError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Documentation attached to one member
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberDoc {
    pub summary: Option<String>,
    pub remarks: Option<String>,
    pub returns: Option<String>,
    /// Parameter name to description
    pub params: BTreeMap<String, String>,
    /// Status code to description
    pub responses: BTreeMap<String, String>,
}

/// Parsed XML documentation file
#[derive(Debug, Clone, Default)]
pub struct XmlComments {
    members: HashMap<String, MemberDoc>,
}

enum Section {
    Summary,
    Remarks,
    Returns,
    Param(String),
    Response(String),
}

impl XmlComments {
    /// Parse an XML documentation document
    pub fn parse(xml: &str) -> Result<Self, XmlCommentsError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut members = HashMap::new();
        let mut current: Option<(String, MemberDoc)> = None;
        let mut section: Option<Section> = None;
        let mut text = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let opened = match e.name().as_ref() {
                        b"member" => {
                            current = attribute(&e, b"name")?.map(|name| (name, MemberDoc::default()));
                            None
                        }
                        b"summary" => Some(Section::Summary),
                        b"remarks" => Some(Section::Remarks),
                        b"returns" => Some(Section::Returns),
                        b"param" => attribute(&e, b"name")?.map(Section::Param),
                        b"response" => attribute(&e, b"code")?.map(Section::Response),
                        // inline markup (<para>, <c>, ...) keeps accumulating text
                        _ => None,
                    };
                    if opened.is_some() && current.is_some() {
                        section = opened;
                        text.clear();
                    }
                }
                Event::Empty(e) => {
                    // <see cref="T:Order"/> renders as its short name
                    if section.is_some() {
                        if let Some(cref) = attribute(&e, b"cref")? {
                            push_text(&mut text, short_name(&cref));
                        }
                    }
                }
                Event::Text(t) => {
                    if section.is_some() {
                        push_text(&mut text, &t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if section.is_some() {
                        push_text(&mut text, &String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"member" => {
                        if let Some((name, doc)) = current.take() {
                            members.insert(name, doc);
                        }
                    }
                    b"summary" | b"remarks" | b"returns" | b"param" | b"response" => {
                        if let (Some(done), Some((_, doc))) = (section.take(), current.as_mut()) {
                            let value = normalize(&text);
                            if !value.is_empty() {
                                match done {
                                    Section::Summary => doc.summary = Some(value),
                                    Section::Remarks => doc.remarks = Some(value),
                                    Section::Returns => doc.returns = Some(value),
                                    Section::Param(name) => {
                                        doc.params.insert(name, value);
                                    }
                                    Section::Response(code) => {
                                        doc.responses.insert(code, value);
                                    }
                                }
                            }
                        }
                        text.clear();
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { members })
    }

    /// Read and parse a documentation file; `Ok(None)` when it does not exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Option<Self>, XmlCommentsError> {
        let path = path.as_ref();
        let xml = match std::fs::read_to_string(path) {
            Ok(xml) => xml,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(XmlCommentsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&xml).map(Some)
    }

    /// `<exe-stem>.xml` in the directory of the running executable
    pub fn beside_current_exe() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        let stem = exe.file_stem()?.to_str()?.to_string();
        Some(exe.parent()?.join(format!("{}.xml", stem)))
    }

    /// Documentation for a member such as `M:OrderController.get_order`
    pub fn member(&self, name: &str) -> Option<&MemberDoc> {
        self.members.get(name)
    }

    /// Documentation for an operation, tried as `M:{controller}.{action}` then `M:{action}`
    pub fn operation(&self, controller: Option<&str>, action: &str) -> Option<&MemberDoc> {
        controller
            .and_then(|c| self.member(&format!("M:{}.{}", c, action)))
            .or_else(|| self.member(&format!("M:{}", action)))
    }

    /// Documentation for a type (`T:{name}`)
    pub fn type_doc(&self, name: &str) -> Option<&MemberDoc> {
        self.member(&format!("T:{}", name))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, XmlCommentsError> {
    match e.try_get_attribute(key)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn push_text(buffer: &mut String, fragment: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(fragment);
}

fn short_name(cref: &str) -> &str {
    let name = cref.split_once(':').map(|(_, rest)| rest).unwrap_or(cref);
    name.rsplit('.').next().unwrap_or(name)
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
