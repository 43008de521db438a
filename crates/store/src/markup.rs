//! Markup ingestion and serialization
//!
//! The composer exchanges content with the send workflow as HTML. Parsing is
//! lenient: unknown inline tags are unwrapped, unknown block tags become
//! paragraphs, and content that breaks the schema is moved to the nearest legal
//! place instead of failing. Serialization always writes the canonical form,
//! so `serialize(parse(serialize(doc)))` reproduces `serialize(doc)`.

use crate::Result;
use doc_model::{schema, Fragment, Mark, MarkSet, Node, NodeKind, NodeType};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse HTML into a document; an empty input yields one empty paragraph
pub fn parse_markup(input: &str) -> Result<Node> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut builder = TreeBuilder::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                builder.open(e)?;
            }
            Ok(Event::Empty(ref e)) => {
                if builder.open(e)? {
                    builder.close(&tag_name(e.name().as_ref()))?;
                }
            }
            Ok(Event::End(ref e)) => builder.close(&tag_name(e.name().as_ref()))?,
            Ok(Event::Text(ref e)) => {
                // Source line breaks are whitespace; only <br> is a hard break
                let raw = String::from_utf8_lossy(e).replace(['\r', '\n'], " ");
                builder.text(&html_escape::decode_html_entities(&raw));
            }
            Ok(Event::CData(ref e)) => builder.text(&String::from_utf8_lossy(e)),
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    "Stopping markup parse at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    builder.finish()
}

/// Serialize a document to canonical HTML
pub fn serialize_markup(doc: &Node) -> String {
    serialize_fragment(doc.content())
}

pub fn serialize_fragment(fragment: &Fragment) -> String {
    let mut out = String::new();
    for node in fragment {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    let wrap = |tag: &str, out: &mut String| {
        out.push_str(&format!("<{tag}>"));
        for child in node.children() {
            write_node(child, out);
        }
        out.push_str(&format!("</{tag}>"));
    };
    match node.kind() {
        NodeKind::Doc => node.children().iter().for_each(|c| write_node(c, out)),
        NodeKind::Paragraph => wrap("p", out),
        NodeKind::Heading { level } => wrap(&format!("h{level}"), out),
        NodeKind::Table => {
            out.push_str("<table><tbody>");
            node.children().iter().for_each(|c| write_node(c, out));
            out.push_str("</tbody></table>");
        }
        NodeKind::TableRow => wrap("tr", out),
        NodeKind::TableCell { header: true } => wrap("th", out),
        NodeKind::TableCell { header: false } => wrap("td", out),
        NodeKind::BulletList => wrap("ul", out),
        NodeKind::ListItem => wrap("li", out),
        NodeKind::Image { src } => {
            out.push_str(&format!(
                "<img src=\"{}\">",
                html_escape::encode_double_quoted_attribute(src)
            ));
        }
        NodeKind::HorizontalRule => out.push_str("<hr>"),
        NodeKind::Text { text, marks } => {
            for mark in marks.iter() {
                out.push_str(&open_mark(mark));
            }
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    out.push_str("<br>");
                }
                out.push_str(&html_escape::encode_text(line));
            }
            for mark in marks.iter().rev() {
                out.push_str(close_mark(mark));
            }
        }
    }
}

fn open_mark(mark: &Mark) -> String {
    match mark {
        Mark::Link { href } => format!(
            "<a href=\"{}\">",
            html_escape::encode_double_quoted_attribute(href)
        ),
        Mark::Bold => "<strong>".to_string(),
        Mark::Italic => "<em>".to_string(),
        Mark::Underline => "<u>".to_string(),
    }
}

fn close_mark(mark: &Mark) -> &'static str {
    match mark {
        Mark::Link { .. } => "</a>",
        Mark::Bold => "</strong>",
        Mark::Italic => "</em>",
        Mark::Underline => "</u>",
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    e.html_attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value);
            html_escape::decode_html_entities(&raw).into_owned()
        })
}

#[derive(Debug)]
enum FrameKind {
    Root,
    /// A schema node built when the element closes
    Block(NodeKind),
    /// An unknown block; its loose text becomes paragraphs
    Container,
    /// Unwrapped on close; marks it carries apply to its text
    Inline,
    /// Content is discarded (head, script, style)
    Skip,
}

enum Element {
    Frame(FrameKind, Option<Mark>),
    Void(Option<Node>),
    LineBreak,
}

fn classify(tag: &str, e: &BytesStart) -> Element {
    match tag {
        "p" => Element::Frame(FrameKind::Block(NodeKind::Paragraph), None),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse().unwrap_or(1);
            Element::Frame(FrameKind::Block(NodeKind::Heading { level }), None)
        }
        "table" => Element::Frame(FrameKind::Block(NodeKind::Table), None),
        "tr" => Element::Frame(FrameKind::Block(NodeKind::TableRow), None),
        "td" => Element::Frame(FrameKind::Block(NodeKind::TableCell { header: false }), None),
        "th" => Element::Frame(FrameKind::Block(NodeKind::TableCell { header: true }), None),
        "ul" | "ol" => Element::Frame(FrameKind::Block(NodeKind::BulletList), None),
        "li" => Element::Frame(FrameKind::Block(NodeKind::ListItem), None),
        "strong" | "b" => Element::Frame(FrameKind::Inline, Some(Mark::Bold)),
        "em" | "i" => Element::Frame(FrameKind::Inline, Some(Mark::Italic)),
        "u" => Element::Frame(FrameKind::Inline, Some(Mark::Underline)),
        "a" => Element::Frame(FrameKind::Inline, attribute(e, "href").map(Mark::link)),
        "img" => Element::Void(attribute(e, "src").map(Node::image)),
        "hr" => Element::Void(Some(Node::horizontal_rule())),
        "br" => Element::LineBreak,
        "meta" | "link" | "input" | "col" | "wbr" | "area" | "base" | "source" | "embed"
        | "param" | "track" => Element::Void(None),
        "head" | "script" | "style" | "title" | "template" => {
            Element::Frame(FrameKind::Skip, None)
        }
        "div" | "blockquote" | "pre" | "section" | "article" | "header" | "footer" | "aside"
        | "main" | "nav" | "figure" | "figcaption" | "address" | "dl" | "dt" | "dd"
        | "center" => Element::Frame(FrameKind::Container, None),
        _ => Element::Frame(FrameKind::Inline, None),
    }
}

/// Whether opening `element` ends the open element `top`, as HTML end tags may be omitted
fn implies_close(element: &Element, top: &FrameKind) -> bool {
    let FrameKind::Block(top) = top else {
        return false;
    };
    match element {
        Element::Frame(FrameKind::Container, _) | Element::Void(Some(_)) => {
            top.node_type().is_textblock()
        }
        Element::Frame(FrameKind::Block(open), _) => match (open.node_type(), top.node_type()) {
            (_, t) if t.is_textblock() => true,
            (NodeType::ListItem, NodeType::ListItem) => true,
            (NodeType::TableCell, NodeType::TableCell) => true,
            (NodeType::TableRow, NodeType::TableRow | NodeType::TableCell) => true,
            _ => false,
        },
        _ => false,
    }
}

struct Frame {
    tag: String,
    kind: FrameKind,
    marks: MarkSet,
    children: Vec<Node>,
}

struct TreeBuilder {
    frames: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            frames: vec![Frame {
                tag: String::new(),
                kind: FrameKind::Root,
                marks: MarkSet::new(),
                children: Vec::new(),
            }],
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Handle an opening tag; returns whether a frame was pushed
    fn open(&mut self, e: &BytesStart) -> Result<bool> {
        let tag = tag_name(e.name().as_ref());
        let element = classify(&tag, e);
        if matches!(self.top().kind, FrameKind::Skip) {
            if let Element::Frame(..) = element {
                self.frames.push(Frame {
                    tag,
                    kind: FrameKind::Skip,
                    marks: MarkSet::new(),
                    children: Vec::new(),
                });
                return Ok(true);
            }
            return Ok(false);
        }
        while self.frames.len() > 1 && implies_close(&element, &self.top().kind) {
            self.fold_top()?;
        }
        let top = self.top();
        match element {
            Element::Frame(kind, mark) => {
                let marks = match mark {
                    Some(mark) => top.marks.with(mark),
                    None => top.marks.clone(),
                };
                self.frames.push(Frame {
                    tag,
                    kind,
                    marks,
                    children: Vec::new(),
                });
                Ok(true)
            }
            Element::Void(node) => {
                top.children.extend(node);
                Ok(false)
            }
            Element::LineBreak => {
                let marks = top.marks.clone();
                top.children.push(Node::text_with_marks("\n", marks));
                Ok(false)
            }
        }
    }

    /// Close the innermost open element named `tag`; stray end tags are ignored
    fn close(&mut self, tag: &str) -> Result<()> {
        let Some(index) = self.frames.iter().rposition(|f| f.tag == tag) else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }
        while self.frames.len() > index {
            self.fold_top()?;
        }
        Ok(())
    }

    fn fold_top(&mut self) -> Result<()> {
        if let Some(frame) = self.frames.pop() {
            let nodes = finish_frame(frame)?;
            self.top().children.extend(nodes);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let top = self.top();
        if matches!(top.kind, FrameKind::Skip) {
            return;
        }
        let marks = top.marks.clone();
        top.children.push(Node::text_with_marks(text, marks));
    }

    fn finish(mut self) -> Result<Node> {
        while self.frames.len() > 1 {
            self.fold_top()?;
        }
        let root = self.frames.pop().map(|f| f.children).unwrap_or_default();
        let mut blocks = fit(NodeType::Doc, root)?;
        if blocks.is_empty() {
            blocks.push(Node::paragraph(Vec::new())?);
        }
        Ok(Node::doc(blocks)?)
    }
}

fn finish_frame(frame: Frame) -> Result<Vec<Node>> {
    Ok(match frame.kind {
        FrameKind::Block(kind) => {
            let children = fit(kind.node_type(), frame.children)?;
            vec![Node::new(kind, children)?]
        }
        FrameKind::Container => block_content(NodeType::Doc, frame.children)?,
        FrameKind::Inline => frame.children,
        FrameKind::Skip | FrameKind::Root => Vec::new(),
    })
}

fn is_blank(node: &Node) -> bool {
    node.text().is_some_and(|t| t.trim().is_empty())
}

/// Rearrange parsed children so they are legal inside `parent`
fn fit(parent: NodeType, children: Vec<Node>) -> Result<Vec<Node>> {
    match parent {
        NodeType::Paragraph | NodeType::Heading => {
            Ok(children.into_iter().flat_map(inline_content).collect())
        }
        NodeType::Doc | NodeType::TableCell | NodeType::ListItem => {
            block_content(parent, children)
        }
        NodeType::Table => table_rows(children),
        NodeType::TableRow => row_cells(children),
        NodeType::BulletList => list_items(children),
        NodeType::Image | NodeType::HorizontalRule | NodeType::Text => Ok(Vec::new()),
    }
}

fn inline_content(node: Node) -> Vec<Node> {
    if node.is_text() {
        vec![node]
    } else {
        node.children().iter().cloned().flat_map(inline_content).collect()
    }
}

fn block_content(parent: NodeType, children: Vec<Node>) -> Result<Vec<Node>> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for child in children {
        if child.is_text() {
            run.push(child);
            continue;
        }
        flush_text_run(&mut run, &mut out)?;
        if schema::allows_child(parent, child.node_type()) {
            out.push(child);
        } else if child.node_type() == NodeType::ListItem
            && schema::allows_child(parent, NodeType::BulletList)
        {
            out.push(Node::bullet_list(vec![child])?);
        } else {
            out.extend(block_content(parent, child.children().to_vec())?);
        }
    }
    flush_text_run(&mut run, &mut out)?;
    Ok(out)
}

fn flush_text_run(run: &mut Vec<Node>, out: &mut Vec<Node>) -> Result<()> {
    if !run.iter().all(is_blank) {
        out.push(Node::paragraph(std::mem::take(run))?);
    }
    run.clear();
    Ok(())
}

fn table_rows(children: Vec<Node>) -> Result<Vec<Node>> {
    let mut rows = Vec::new();
    let mut loose = Vec::new();
    for child in children {
        match child.node_type() {
            NodeType::TableRow => {
                if !loose.is_empty() {
                    rows.push(Node::table_row(std::mem::take(&mut loose))?);
                }
                rows.push(child);
            }
            NodeType::Table => rows.extend(child.children().iter().cloned()),
            _ if is_blank(&child) => {}
            _ => loose.extend(row_cells(vec![child])?),
        }
    }
    if !loose.is_empty() {
        rows.push(Node::table_row(loose)?);
    }
    Ok(rows)
}

fn row_cells(children: Vec<Node>) -> Result<Vec<Node>> {
    let mut cells = Vec::new();
    for child in children {
        match child.node_type() {
            NodeType::TableCell => cells.push(child),
            NodeType::TableRow => cells.extend(child.children().iter().cloned()),
            _ if is_blank(&child) => {}
            _ => cells.push(Node::table_cell(
                false,
                block_content(NodeType::TableCell, vec![child])?,
            )?),
        }
    }
    Ok(cells)
}

fn list_items(children: Vec<Node>) -> Result<Vec<Node>> {
    let mut items = Vec::new();
    for child in children {
        match child.node_type() {
            NodeType::ListItem => items.push(child),
            _ if is_blank(&child) => {}
            _ => items.push(Node::list_item(block_content(
                NodeType::ListItem,
                vec![child],
            )?)?),
        }
    }
    Ok(items)
}
