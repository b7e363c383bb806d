/*!
 * Minimal mutable XML tree on top of quick-xml.
 *
 * Only what the document walkers need: element names, child lists, text
 * nodes and faithful serialization. Attributes, declarations, comments and
 * processing instructions are kept as read and written back unchanged.
 */

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::escape::partial_escape;
use quick_xml::{Reader, Writer};

use crate::errors::XmlError;

/// One node of the tree
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Unescaped character data
    Text(String),
    /// Comments, CDATA, declarations and other events written back verbatim
    Misc(Event<'static>),
}

/// An element with its start tag and children
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    /// Written as `<name/>` when it still has no children
    empty: bool,
}

impl Element {
    /// New element without attributes or children
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
            empty: true,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Qualified name, prefix included (`w:p`)
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn push(&mut self, node: Node) {
        self.empty = false;
        self.children.push(node);
    }

    /// Concatenated direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the direct text children with `text`, placed before any child element
    pub fn set_text(&mut self, text: &str) {
        self.children.retain(|node| !matches!(node, Node::Text(_)));
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text.to_string()));
        }
        self.empty = false;
    }

    /// Pre-order visit of this element and every descendant element
    pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        if self.empty && self.children.is_empty() {
            return write_event(writer, Event::Empty(self.start.borrow()));
        }
        write_event(writer, Event::Start(self.start.borrow()))?;
        for child in &self.children {
            write_node(writer, child)?;
        }
        write_event(writer, Event::End(self.start.to_end()))
    }
}

/// A parsed XML fragment
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
}

impl XmlDocument {
    /// Parse UTF-8 XML text; a leading byte order mark is dropped
    pub fn parse(content: &str) -> Result<Self, XmlError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position: reader.error_position() as u64,
                message: e.to_string(),
            })?;

            let node = match event {
                Event::Eof => break,
                Event::Start(start) => {
                    stack.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        empty: false,
                    });
                    continue;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| XmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: "closing tag without an open element".to_string(),
                    })?;
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    empty: true,
                }),
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| XmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    Node::Text(text.into_owned())
                }
                other => Node::Misc(other.into_owned()),
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Malformed {
                position: reader.buffer_position() as u64,
                message: format!("unclosed element <{}>", String::from_utf8_lossy(open.name())),
            });
        }
        if !nodes.iter().any(|node| matches!(node, Node::Element(_))) {
            return Err(XmlError::MissingRoot);
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Serialize the document, declaration included
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(element) => element.write(writer),
        Node::Text(text) => write_event(writer, Event::Text(BytesText::from_escaped(partial_escape(text)))),
        Node::Misc(event) => write_event(writer, event.borrow()),
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}
