use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{Element, Node, is_raw_text_element};

pub(super) fn write_nodes(out: &mut String, nodes: &[Node], raw_text: bool) {
    for node in nodes {
        write_node(out, node, raw_text);
    }
}

fn write_node(out: &mut String, node: &Node, raw_text: bool) {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&encode_text(text)),
        Node::Raw(html) => out.push_str(html),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(value));
            out.push('"');
        }
    }
    out.push('>');

    if element.is_void() {
        return;
    }

    write_nodes(out, &element.children, is_raw_text_element(&element.name));
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
