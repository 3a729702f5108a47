// ABOUTME: Parsed HTML document with XPath evaluation and markup serialization of matched nodes.
// ABOUTME: Builds an sxd tree from scraper's html5ever parse; removals only ever run on private copies.

//! Document model consumed by the element selector.
//!
//! A [`Document`] is parsed once with scraper (html5ever, so it tolerates the
//! same malformed markup a browser does) and then imported into an
//! `sxd-document` package so that site configs can address nodes with XPath
//! 1.0 expressions. The tree is never mutated after construction: removal
//! expressions run against a deep copy of each matched element.

use encoding_rs::Encoding;
use scraper::Html;
use sxd_document::dom::{self, ChildOfElement, ChildOfRoot};
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};
use tracing::debug;
use url::Url;

use crate::error::ExtractError;

/// An immutable parsed page with its base URL and text encoding.
#[derive(Debug)]
pub struct Document {
    url: Url,
    encoding: &'static Encoding,
    package: Package,
}

impl Document {
    /// Parses an already-decoded HTML string.
    pub fn parse(html: &str, url: &str) -> Result<Self, ExtractError> {
        Self::build(html, url, encoding_rs::UTF_8)
    }

    /// Decodes a raw response body and parses it.
    ///
    /// The charset from `content_type` wins when it names a known encoding,
    /// otherwise the encoding is sniffed from the bytes.
    pub fn from_bytes(
        body: &[u8],
        content_type: Option<&str>,
        url: &str,
    ) -> Result<Self, ExtractError> {
        let (html, encoding) = decode_body(body, content_type);
        Self::build(&html, url, encoding)
    }

    fn build(html: &str, url: &str, encoding: &'static Encoding) -> Result<Self, ExtractError> {
        let parsed_url = Url::parse(url).map_err(|e| {
            ExtractError::document(
                url,
                "ParseDocument",
                Some(anyhow::anyhow!("invalid URL: {}", e)),
            )
        })?;
        let parsed = Html::parse_document(html);
        Ok(Self {
            url: parsed_url,
            encoding,
            package: import_html(&parsed),
        })
    }

    /// The URL the document was fetched from.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Canonical name of the encoding the body was decoded with.
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    /// Evaluates `expression` from the document root and serializes each
    /// match in document order.
    ///
    /// Elements serialize to markup, text nodes to their text and attributes
    /// to their value. Scalar results (`count(...)`, `boolean(...)`) become a
    /// single item. Each `remove_expressions` entry is evaluated against a
    /// private copy of every matched element and its hits are detached before
    /// serialization.
    pub fn select(
        &self,
        expression: &str,
        remove_expressions: &[String],
    ) -> Result<Vec<String>, ExtractError> {
        let xpath = compile(expression)?;
        let removals = compile_removals(remove_expressions);

        let document = self.package.as_document();
        let context = Context::new();
        let value = xpath
            .evaluate(&context, document.root())
            .map_err(|e| {
                ExtractError::expression(
                    expression,
                    "EvaluateXPath",
                    Some(anyhow::anyhow!("{}", e)),
                )
            })?;

        let items = match value {
            Value::Nodeset(nodes) => nodes
                .document_order()
                .into_iter()
                .filter_map(|node| serialize_match(node, &removals))
                .collect(),
            Value::String(s) => vec![s],
            Value::Number(n) => vec![format_number(n)],
            Value::Boolean(b) => vec![if b { "1" } else { "0" }.to_string()],
        };
        Ok(items)
    }
}

fn compile(expression: &str) -> Result<XPath, ExtractError> {
    let built = Factory::new().build(expression).map_err(|e| {
        ExtractError::expression(expression, "CompileXPath", Some(anyhow::anyhow!("{}", e)))
    })?;
    built.ok_or_else(|| {
        ExtractError::expression(
            expression,
            "CompileXPath",
            Some(anyhow::anyhow!("empty expression")),
        )
    })
}

/// Expands each removal expression into the forms it is tried in.
///
/// Site configs are written against the page as a browser shows it, so an
/// expression may or may not include the implicit `<html><body>` wrapper.
/// Expressions starting with `//` already match at any depth.
fn removal_variants(expression: &str) -> Vec<String> {
    if expression.starts_with("//") {
        vec![expression.to_string()]
    } else {
        vec![
            expression.to_string(),
            format!("/html{}", expression),
            format!("/html/body{}", expression),
        ]
    }
}

fn compile_removals(remove_expressions: &[String]) -> Vec<XPath> {
    let mut compiled = Vec::new();
    for expression in remove_expressions {
        for variant in removal_variants(expression) {
            match compile(&variant) {
                Ok(xpath) => compiled.push(xpath),
                Err(err) => debug!(expression = %variant, error = %err, "skipping removal expression"),
            }
        }
    }
    compiled
}

fn serialize_match(node: Node<'_>, removals: &[XPath]) -> Option<String> {
    match node {
        Node::Element(element) if !removals.is_empty() => {
            Some(markup_without(element, removals))
        }
        Node::Element(element) => {
            let mut out = String::new();
            write_element(element, &mut out);
            Some(out)
        }
        Node::Root(root) => {
            let mut out = String::new();
            for child in root.children() {
                match child {
                    ChildOfRoot::Element(element) => write_element(element, &mut out),
                    ChildOfRoot::Comment(comment) => write_comment(comment.text(), &mut out),
                    ChildOfRoot::ProcessingInstruction(_) => {}
                }
            }
            Some(out)
        }
        Node::Text(text) => Some(text.text().to_string()),
        Node::Attribute(attribute) => Some(attribute.value().to_string()),
        Node::Comment(comment) => {
            let mut out = String::new();
            write_comment(comment.text(), &mut out);
            Some(out)
        }
        Node::Namespace(_) | Node::ProcessingInstruction(_) => None,
    }
}

/// Serializes a deep copy of `element` after detaching every removal hit.
fn markup_without(element: dom::Element<'_>, removals: &[XPath]) -> String {
    let package = Package::new();
    let document = package.as_document();
    let top = copy_element(document, element);
    document.root().append_child(top);

    let context = Context::new();
    for xpath in removals {
        match xpath.evaluate(&context, top) {
            Ok(Value::Nodeset(hits)) => {
                for hit in hits.document_order() {
                    detach(hit, top);
                }
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "removal expression failed"),
        }
    }

    let mut out = String::new();
    write_element(top, &mut out);
    out
}

fn detach(node: Node<'_>, top: dom::Element<'_>) {
    match node {
        // The copied element itself has no parent worth detaching from.
        Node::Element(element) if element != top => element.remove_from_parent(),
        Node::Text(text) => text.remove_from_parent(),
        Node::Comment(comment) => comment.remove_from_parent(),
        Node::Attribute(attribute) => attribute.remove_from_parent(),
        _ => {}
    }
}

fn copy_element<'d>(target: dom::Document<'d>, source: dom::Element<'_>) -> dom::Element<'d> {
    let copy = target.create_element(source.name().local_part());
    for attribute in source.attributes() {
        copy.set_attribute_value(attribute.name().local_part(), attribute.value());
    }
    for child in source.children() {
        match child {
            ChildOfElement::Element(el) => copy.append_child(copy_element(target, el)),
            ChildOfElement::Text(text) => copy.append_child(target.create_text(text.text())),
            ChildOfElement::Comment(comment) => {
                copy.append_child(target.create_comment(comment.text()))
            }
            ChildOfElement::ProcessingInstruction(_) => {}
        }
    }
    copy
}

/// Imports the html5ever tree into a fresh sxd package.
///
/// Doctypes and processing instructions are dropped; element and attribute
/// names keep their local part only, so `//div` matches HTML elements
/// without namespace prefixes.
fn import_html(html: &Html) -> Package {
    let package = Package::new();
    {
        let document = package.as_document();
        for child in html.tree.root().children() {
            match child.value() {
                scraper::Node::Element(el) => {
                    let imported = import_element(document, child, el);
                    document.root().append_child(imported);
                }
                scraper::Node::Comment(comment) => {
                    document.root().append_child(document.create_comment(comment));
                }
                _ => {}
            }
        }
    }
    package
}

fn import_element<'d>(
    document: dom::Document<'d>,
    node: ego_tree::NodeRef<'_, scraper::Node>,
    element: &scraper::node::Element,
) -> dom::Element<'d> {
    let imported = document.create_element(element.name());
    for (name, value) in element.attrs() {
        imported.set_attribute_value(name, value);
    }
    for child in node.children() {
        match child.value() {
            scraper::Node::Element(el) => {
                imported.append_child(import_element(document, child, el));
            }
            scraper::Node::Text(text) => {
                imported.append_child(document.create_text(text));
            }
            scraper::Node::Comment(comment) => {
                imported.append_child(document.create_comment(comment));
            }
            _ => {}
        }
    }
    imported
}

fn write_element(element: dom::Element<'_>, out: &mut String) {
    let name = element.name().local_part();
    out.push('<');
    out.push_str(name);
    for attribute in element.attributes() {
        out.push(' ');
        out.push_str(attribute.name().local_part());
        out.push_str("=\"");
        out.push_str(&escape_attr(attribute.value()));
        out.push('"');
    }
    out.push('>');

    if is_void_element(name) {
        return;
    }

    let raw_text = is_raw_text_element(name);
    for child in element.children() {
        match child {
            ChildOfElement::Element(el) => write_element(el, out),
            ChildOfElement::Text(text) if raw_text => out.push_str(text.text()),
            ChildOfElement::Text(text) => out.push_str(&escape_text(text.text())),
            ChildOfElement::Comment(comment) => write_comment(comment.text(), out),
            ChildOfElement::ProcessingInstruction(_) => {}
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_comment(text: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub(crate) fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Decode a response body using the Content-Type charset, falling back to detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> (String, &'static Encoding) {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = Encoding::for_label(charset.as_bytes()) {
                let (decoded, used, _) = encoding.decode(body);
                return (decoded.into_owned(), used);
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, used, _) = encoding.decode(body);
    (decoded.into_owned(), used)
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}
