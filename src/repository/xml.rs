// src/repository/xml.rs

//! Minimal namespace-aware XML element tree
//!
//! Both `repomd.xml` and metalinks are tiny, so they are read into a tree of
//! [`Element`]s and queried by (namespace, local name) paths instead of being
//! processed as an event stream.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// Namespace of `repomd.xml`
pub const NS_REPOMD: &str = "http://linux.duke.edu/metadata/repo";
/// Namespace of Metalink 3.0
pub const NS_METALINK3: &str = "http://www.metalinker.org/";
/// Namespace of Metalink 4 (RFC 5854)
pub const NS_METALINK4: &str = "urn:ietf:params:xml:ns:metalink";
/// MirrorManager vendor extension namespace
pub const NS_MM0: &str = "http://fedorahosted.org/mirrormanager";

/// One XML element with resolved namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element
    pub fn parse(text: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(text);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_resolved_event()? {
                (ns, Event::Start(start)) => {
                    stack.push(Element::from_start(ns, &start)?);
                }
                (ns, Event::Empty(start)) => {
                    let element = Element::from_start(ns, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                (_, Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::ParseError("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                (_, Event::Text(text)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                (_, Event::CData(cdata)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::ParseError(format!(
                "unexpected end of document inside <{}>",
                stack[stack.len() - 1].name
            )));
        }
        root.ok_or_else(|| Error::ParseError("document has no root element".to_string()))
    }

    fn from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element> {
        let namespace = match ns {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(Error::ParseError(format!(
                    "unknown namespace prefix {:?}",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }

        Ok(Element {
            namespace,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// Whether this element has the given namespace and local name
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// Direct children with the given namespace and local name
    pub fn children_named<'a, 'n>(
        &'a self,
        namespace: &'n str,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// First direct child with the given namespace and local name
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children_named(namespace, name).next()
    }

    /// Elements reached by following `path` of (namespace, name) steps
    pub fn select<'a>(&'a self, path: &[(&str, &str)]) -> Vec<&'a Element> {
        let mut current = vec![self];
        for (namespace, name) in path {
            current = current
                .into_iter()
                .flat_map(|e| e.children_named(namespace, name))
                .collect();
        }
        current
    }

    /// Value of an unqualified attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Text content parsed as an unsigned integer
    pub fn text_u64(&self) -> Result<u64> {
        self.text.trim().parse().map_err(|e| {
            Error::ParseError(format!("<{}>: invalid integer {:?}: {e}", self.name, self.text))
        })
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::ParseError("multiple root elements".to_string())),
    }
    Ok(())
}
