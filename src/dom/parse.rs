use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::dom::{Data, Document, NodeId};
use crate::{Error, Result};

/// Parses `markup` and appends the resulting nodes to `parent`.
///
/// Whitespace-only text is dropped, comments and declarations are skipped.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, markup: &str) -> Result<()> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut stack = vec![parent];
    loop {
        let top = *stack.last().unwrap_or(&parent);
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = element(doc, &e)?;
                doc.attach(top, element);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = element(doc, &e)?;
                doc.attach(top, element);
            }
            Ok(Event::End(e)) => {
                if stack.len() == 1 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(markup_error(format!("unexpected closing tag `</{name}>`")));
                }
                stack.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| markup_error(format!("invalid text: {err}")))?;
                if !text.trim().is_empty() {
                    append_text(doc, top, text.into_owned());
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_text(doc, top, text);
            }
            Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(markup_error(format!(
                    "{err} at byte {}",
                    reader.error_position()
                )));
            }
        }
    }

    if let [_, .., last] = stack.as_slice() {
        let tag = match &doc.node(*last).data {
            Data::Element { tag, .. } => tag.clone(),
            Data::Text(_) => String::new(),
        };
        return Err(markup_error(format!("unclosed element `<{tag}>`")));
    }
    Ok(())
}

fn element(doc: &mut Document, e: &BytesStart<'_>) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.html_attributes() {
        let attr = attr.map_err(|err| markup_error(format!("invalid attribute: {err}")))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| markup_error(format!("invalid attribute value: {err}")))?
            .into_owned();
        attrs.push((name, value));
    }
    Ok(doc.alloc(Data::Element {
        tag,
        attrs,
        hidden: false,
    }))
}

fn append_text(doc: &mut Document, parent: NodeId, text: String) {
    let node = doc.alloc(Data::Text(text));
    doc.attach(parent, node);
}

fn markup_error(msg: String) -> Error {
    Error::new(format!("invalid markup: {msg}"))
}
