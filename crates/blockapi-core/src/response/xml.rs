//! Flat XML reply model.
//!
//! Block API XML replies are tiny (`<error info="..."/>`, `<rated up="set"/>`,
//! a list of `<question>` records), so they are read into a flat list of
//! elements in document order, each remembering its parent.

use std::borrow::Cow;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::ResponseError;

/// One element of an XML reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// Concatenated direct text content, trimmed.
    pub text: String,
    /// Index of the enclosing element in [`XmlReply::elements`].
    pub parent: Option<usize>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parsed XML reply body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlReply {
    elements: Vec<XmlElement>,
}

impl XmlReply {
    pub fn parse(body: &str) -> Result<Self, ResponseError> {
        let mut reader = Reader::from_str(body);
        let mut elements: Vec<XmlElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = read_element(&e, open.last().copied())?;
                    elements.push(element);
                    open.push(elements.len() - 1);
                }
                Event::Empty(e) => {
                    let element = read_element(&e, open.last().copied())?;
                    elements.push(element);
                }
                Event::End(_) => {
                    if let Some(idx) = open.pop() {
                        let text = &mut elements[idx].text;
                        *text = text.trim().to_string();
                    }
                }
                Event::Text(t) => {
                    if let Some(&idx) = open.last() {
                        elements[idx].text.push_str(std::str::from_utf8(&t)?);
                    }
                }
                Event::CData(c) => {
                    if let Some(&idx) = open.last() {
                        elements[idx].text.push_str(std::str::from_utf8(&c)?);
                    }
                }
                Event::GeneralRef(r) => {
                    if let Some(&idx) = open.last() {
                        let name = std::str::from_utf8(&r)?;
                        let resolved = resolve_reference(name)?;
                        elements[idx].text.push_str(&resolved);
                    }
                }
                Event::Eof => {
                    if let Some(&idx) = open.last() {
                        return Err(ResponseError::Truncated(elements[idx].name.clone()));
                    }
                    break;
                }
                _ => {}
            }
        }

        if elements.is_empty() {
            return Err(ResponseError::NoRootElement);
        }
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[XmlElement] {
        &self.elements
    }

    /// First element with the given name.
    pub fn element(&self, name: &str) -> Option<&XmlElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// All elements with the given name, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (usize, &'a XmlElement)> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.name == name)
    }

    /// Direct children of the element at `idx`.
    pub fn children(&self, idx: usize) -> impl Iterator<Item = &XmlElement> + '_ {
        self.elements.iter().filter(move |e| e.parent == Some(idx))
    }

    /// Attribute `attr` of the first `name` element.
    pub fn attr(&self, name: &str, attr: &str) -> Option<&str> {
        self.element(name).and_then(|e| e.attr(attr))
    }

    /// True if the first `name` element carries a non-empty `attr`.
    pub fn flag(&self, name: &str, attr: &str) -> bool {
        self.attr(name, attr).is_some_and(|v| !v.is_empty())
    }
}

fn read_element(e: &BytesStart<'_>, parent: Option<usize>) -> Result<XmlElement, ResponseError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        attrs.push((key, unescape(raw)?.into_owned()));
    }
    Ok(XmlElement {
        name,
        attrs,
        text: String::new(),
        parent,
    })
}

/// Resolves `amp`, `lt`, ... and `#NN` / `#xNN` character references.
fn resolve_reference(name: &str) -> Result<Cow<'static, str>, ResponseError> {
    if let Some(s) = resolve_predefined_entity(name) {
        return Ok(Cow::Borrowed(s));
    }
    let code = match name.strip_prefix('#') {
        Some(num) => match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        },
        None => None,
    };
    code.and_then(char::from_u32)
        .map(|c| Cow::Owned(c.to_string()))
        .ok_or_else(|| ResponseError::Unexpected(format!("unknown entity &{name};")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_and_nesting() {
        let reply = XmlReply::parse(
            r#"<?xml version="1.0"?><questions><question><id>4</id><time>12</time></question></questions>"#,
        )
        .unwrap();
        let names: Vec<&str> = reply.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["questions", "question", "id", "time"]);
        let (q, _) = reply.elements_named("question").next().unwrap();
        let children: Vec<(&str, &str)> = reply
            .children(q)
            .map(|e| (e.name.as_str(), e.text.as_str()))
            .collect();
        assert_eq!(children, [("id", "4"), ("time", "12")]);
    }

    #[test]
    fn unescapes_attribute_values() {
        let reply = XmlReply::parse(r#"<error info="Title &amp; body &lt;required&gt;"/>"#).unwrap();
        assert_eq!(reply.attr("error", "info"), Some("Title & body <required>"));
    }

    #[test]
    fn resolves_text_references() {
        let reply = XmlReply::parse("<response>a &amp; b &#65;</response>").unwrap();
        assert_eq!(reply.element("response").unwrap().text, "a & b A");
    }

    #[test]
    fn flag_requires_non_empty_value() {
        let reply = XmlReply::parse(r#"<r><open set="1"/><visible set=""/></r>"#).unwrap();
        assert!(reply.flag("open", "set"));
        assert!(!reply.flag("visible", "set"));
        assert!(!reply.flag("missing", "set"));
    }

    #[test]
    fn unclosed_element_is_truncated() {
        let err = XmlReply::parse("<questions><question><id>4</id>").unwrap_err();
        assert!(matches!(err, ResponseError::Truncated(ref name) if name == "question"));
    }

    #[test]
    fn reply_without_root_is_error() {
        for body in ["", "  \n", r#"<?xml version="1.0"?>"#] {
            assert!(
                matches!(XmlReply::parse(body), Err(ResponseError::NoRootElement)),
                "body {body:?}"
            );
        }
    }

    #[test]
    fn mismatched_tags_are_errors() {
        assert!(XmlReply::parse("<a><b></a>").is_err());
    }
}
