//! Tree builder over the `html5gum` tokenizer.

use html5gum::{State, Token, Tokenizer};

use super::{Document, DomError, Element, Node, is_void_element};

pub(super) fn parse(source: &str) -> Result<Document, DomError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    while let Some(token_result) = tokenizer.next() {
        let token = token_result.map_err(|_| DomError::Tokenizer)?;

        match token {
            Token::StartTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                let mut element = Element::new(name.clone());
                for (key, value) in &tag.attributes {
                    element.attrs.push((
                        String::from_utf8_lossy(key).into_owned(),
                        String::from_utf8_lossy(value).into_owned(),
                    ));
                }

                if tag.self_closing || is_void_element(&name) {
                    attach(&mut stack, &mut roots, Node::Element(element));
                } else {
                    match name.as_str() {
                        "script" | "style" => tokenizer.set_state(State::ScriptData),
                        "textarea" | "title" => tokenizer.set_state(State::RcData),
                        _ => {}
                    }
                    stack.push(element);
                }
            }
            Token::EndTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                // Stray end tags are dropped.
                if let Some(index) = stack.iter().rposition(|el| el.name == name) {
                    close_until(&mut stack, &mut roots, index);
                }
            }
            Token::String(text) => {
                let text = String::from_utf8_lossy(&text);
                push_text(&mut stack, &mut roots, &text);
            }
            Token::Comment(comment) => {
                let comment = String::from_utf8_lossy(&comment).into_owned();
                attach(&mut stack, &mut roots, Node::Comment(comment));
            }
            Token::Doctype(doctype) => {
                let name = String::from_utf8_lossy(&doctype.name).into_owned();
                attach(&mut stack, &mut roots, Node::Doctype(name));
            }
            Token::Error(_) => {}
        }
    }

    close_until(&mut stack, &mut roots, 0);
    Ok(Document::new(roots))
}

fn siblings<'a>(stack: &'a mut [Element], roots: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    }
}

fn attach(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    siblings(stack, roots).push(node);
}

/// Append text, merging with a preceding text node.
fn push_text(stack: &mut [Element], roots: &mut Vec<Node>, text: &str) {
    let nodes = siblings(stack, roots);
    match nodes.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

/// Close every open element from the top of the stack down to `index`.
fn close_until(stack: &mut Vec<Element>, roots: &mut Vec<Node>, index: usize) {
    while stack.len() > index {
        let Some(element) = stack.pop() else {
            break;
        };
        attach(stack, roots, Node::Element(element));
    }
}
