use std::io::{BufRead, Write};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use super::Element;
use crate::error::{ArbError, ArbResult};

impl Element {
    /// Parses a document and returns its root element.
    ///
    /// A text-only element keeps its text exactly. In an element with
    /// children, whitespace-only runs between tags are layout and dropped.
    pub fn from_xml_str(xml: &str) -> ArbResult<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Open> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Open {
                    element: element_from_start(&start)?,
                    text: Vec::new(),
                }),
                Event::Empty(start) => {
                    let el = element_from_start(&start)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let open = stack
                        .pop()
                        .ok_or_else(|| ArbError::Format("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, open.close())?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push(text.unescape()?.into_owned());
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push(std::str::from_utf8(&data)?.to_string());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ArbError::Format(format!(
                "unterminated element <{}>",
                open.element.name
            )));
        }
        root.ok_or_else(|| ArbError::Format("document has no root element".into()))
    }

    /// Reads a whole document from a buffered reader.
    pub fn read_from<R: BufRead>(mut input: R) -> ArbResult<Element> {
        let mut xml = String::new();
        input.read_to_string(&mut xml)?;
        Self::from_xml_str(&xml)
    }

    /// Writes this element as a complete document with an XML declaration.
    pub fn write_to<W: Write>(&self, out: W) -> ArbResult<()> {
        let mut writer = Writer::new_with_indent(out, b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_element(&mut writer, self)
    }

    /// Serializes this element as a complete document.
    pub fn to_xml_string(&self) -> ArbResult<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|err| ArbError::Format(err.to_string()))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> ArbResult<Element> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        el.attribs.insert(key, value);
    }
    Ok(el)
}

/// An element whose end tag has not been read yet.
struct Open {
    element: Element,
    text: Vec<String>,
}

impl Open {
    fn close(mut self) -> Element {
        let mixed = !self.element.children.is_empty();
        self.element.value = self
            .text
            .into_iter()
            .filter(|run| !mixed || !run.trim().is_empty())
            .collect();
        self.element
    }
}

fn attach(stack: &mut [Open], root: &mut Option<Element>, el: Element) -> ArbResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => return Err(ArbError::Format("multiple root elements".into())),
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, el: &Element) -> ArbResult<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attribs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() && el.value.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !el.value.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&el.value)))?;
    }
    for child in &el.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_document() {
        let xml = r#"<?xml version="1.0"?>
<AgilityBook Book="15.3">
	<Dog CallName="Tess &amp; Co">
		<Note>likes
 tunnels</Note>
		<Breed>Sheltie</Breed>
	</Dog>
</AgilityBook>"#;
        let root = Element::from_xml_str(xml).expect("parse");
        assert_eq!(root.name(), "AgilityBook");
        let dog = root.find_child("Dog").expect("dog");
        assert_eq!(dog.raw_attrib("CallName"), Some("Tess & Co"));
        assert_eq!(dog.children().len(), 2);
        assert_eq!(dog.find_child("Note").map(Element::value), Some("likes\n tunnels"));
    }

    #[test]
    fn writes_and_reads_back() {
        let mut root = Element::new("AgilityBook");
        root.add_attrib("Book", "15.3");
        let dog = root.add_element("Dog");
        dog.add_attrib("CallName", "<Rex>");
        dog.add_text_element("Note", "a \"quoted\" note");
        root.add_element("Empty");

        let text = root.to_xml_string().expect("write");
        let back = Element::from_xml_str(&text).expect("parse");
        assert_eq!(back, root);
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        let mut root = Element::new("Dog");
        root.add_text_element("Note", "  first line\n  indented\n");
        root.add_text_element("Breed", " Sheltie");
        root.add_text_element("Blank", "   ");
        root.add_element("Reg").add_attrib("Number", "1");

        let text = root.to_xml_string().expect("write");
        let back = Element::from_xml_str(&text).expect("parse");
        assert_eq!(back.find_child("Note").map(Element::value), Some("  first line\n  indented\n"));
        assert_eq!(back.find_child("Breed").map(Element::value), Some(" Sheltie"));
        assert_eq!(back.find_child("Blank").map(Element::value), Some("   "));
        assert_eq!(back.value(), "");
        assert_eq!(back, root);
    }

    #[test]
    fn mixed_content_keeps_its_own_text() {
        let mut root = Element::new("Calendar");
        root.set_value(" trial notes ");
        root.add_element("Child");
        root.add_element("Child");

        let text = root.to_xml_string().expect("write");
        let back = Element::from_xml_str(&text).expect("parse");
        assert_eq!(back.value(), " trial notes ");
        assert_eq!(back.children().len(), 2);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Element::from_xml_str("").is_err());
        assert!(Element::from_xml_str("<a><b></a>").is_err());
    }
}
