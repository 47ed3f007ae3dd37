use crate::errors::{AppError, AppResult};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Generic XML element: a local name, its text content and its child elements.
///
/// Namespace prefixes are dropped and XML attributes are ignored; the provider carries
/// every value the tables need in element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the element reached by following `path` through first-match children.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        let mut current = self;
        for name in path {
            current = current.child(name)?;
        }
        current.text.as_deref()
    }

    fn push_text(&mut self, fragment: &str) {
        match self.text.as_mut() {
            Some(text) => text.push_str(fragment),
            None => self.text = Some(fragment.to_string()),
        }
    }

    /// Trims accumulated text; whitespace-only content becomes `None`.
    fn finish_text(&mut self) {
        if let Some(text) = self.text.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                self.text = Some(trimmed.to_string());
            }
        }
    }
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Parses XML content into an element tree rooted at the document element.
///
/// Text is accumulated verbatim (entities and CDATA included) and trimmed once the
/// element closes, so mixed whitespace around entity references is preserved.
pub fn parse_tree(content: &[u8]) -> AppResult<XmlElement> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::with_capacity(8192);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(AppError::MalformedResponseError(
                        "Content found after the document element".to_string(),
                    ));
                }
                stack.push(XmlElement::new(local_name(&e)));
            }
            Event::Empty(e) => {
                attach(&mut stack, &mut root, XmlElement::new(local_name(&e)))?;
            }
            Event::End(_) => {
                let mut element = stack.pop().ok_or_else(|| {
                    AppError::MalformedResponseError("Unbalanced closing tag".to_string())
                })?;
                element.finish_text();
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    let txt = e.decode().map_err(|e| {
                        AppError::MalformedResponseError(format!("Failed to decode XML text: {e}"))
                    })?;
                    top.push_text(&txt);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(top) = stack.last_mut() {
                    let char_ref = e.resolve_char_ref().map_err(|e| {
                        AppError::MalformedResponseError(format!(
                            "Invalid character reference: {e}"
                        ))
                    })?;
                    if let Some(ch) = char_ref {
                        top.push_text(ch.encode_utf8(&mut [0u8; 4]));
                    } else {
                        let name = e.decode().map_err(|e| {
                            AppError::MalformedResponseError(format!(
                                "Failed to decode entity reference: {e}"
                            ))
                        })?;
                        let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                            AppError::MalformedResponseError(format!(
                                "Unknown entity reference: &{name};"
                            ))
                        })?;
                        top.push_text(resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(AppError::MalformedResponseError(format!(
            "Unexpected end of document inside <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }

    root.ok_or_else(|| AppError::MalformedResponseError("Empty XML document".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> AppResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(AppError::MalformedResponseError(
                    "Multiple document elements".to_string(),
                ));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

/// Reads only as far as the document element and returns its local name.
///
/// Used to tell acknowledgement bodies from data documents without building a tree.
pub fn peek_root_name(content: &[u8]) -> AppResult<Option<String>> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => return Ok(Some(local_name(&e))),
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree_with_trimmed_text() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <mRID>abc</mRID>
  <TimeSeries>
    <businessType> A04 </businessType>
    <Period><resolution>PT60M</resolution></Period>
  </TimeSeries>
</GL_MarketDocument>"#;

        let root = parse_tree(xml).unwrap();
        assert_eq!(root.name, "GL_MarketDocument");
        assert_eq!(root.text, None);
        assert_eq!(root.text_at(&["mRID"]), Some("abc"));
        assert_eq!(root.text_at(&["TimeSeries", "businessType"]), Some("A04"));
        assert_eq!(
            root.text_at(&["TimeSeries", "Period", "resolution"]),
            Some("PT60M")
        );
    }

    #[test]
    fn namespace_prefixes_are_stripped() {
        let xml = br#"<ns:Publication_MarketDocument xmlns:ns="urn:x"><ns:type>A44</ns:type></ns:Publication_MarketDocument>"#;
        let root = parse_tree(xml).unwrap();
        assert_eq!(root.name, "Publication_MarketDocument");
        assert_eq!(root.text_at(&["type"]), Some("A44"));
    }

    #[test]
    fn entities_and_cdata_are_resolved() {
        let xml = br#"<Doc><text>Flow &amp; price &#x41; <![CDATA[<raw>]]></text></Doc>"#;
        let root = parse_tree(xml).unwrap();
        assert_eq!(root.text_at(&["text"]), Some("Flow & price A <raw>"));
    }

    #[test]
    fn empty_elements_become_leaves_without_text() {
        let root = parse_tree(b"<Doc><quantity/></Doc>").unwrap();
        let child = root.child("quantity").unwrap();
        assert!(child.is_leaf());
        assert_eq!(child.text, None);
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let result = parse_tree(b"<Doc><a>1</b></Doc>");
        assert!(matches!(result, Err(AppError::MalformedResponseError(_))));
    }

    #[test]
    fn truncated_document_is_malformed() {
        let result = parse_tree(b"<Doc><a>1</a>");
        assert!(matches!(result, Err(AppError::MalformedResponseError(_))));
    }

    #[test]
    fn empty_input_is_malformed() {
        let result = parse_tree(b"   ");
        assert!(matches!(result, Err(AppError::MalformedResponseError(_))));
    }

    #[test]
    fn peek_returns_root_name_only() {
        let xml = br#"<?xml version="1.0"?><Acknowledgement_MarketDocument><Reason/></Acknowledgement_MarketDocument>"#;
        assert_eq!(
            peek_root_name(xml).unwrap().as_deref(),
            Some("Acknowledgement_MarketDocument")
        );
        assert_eq!(peek_root_name(b"").unwrap(), None);
    }
}
