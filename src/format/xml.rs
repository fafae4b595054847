use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

type XmlResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Re-indents an XML document with two spaces per level.
/// Input that is not a well-formed document comes back unchanged.
pub fn format_xml(text: &str) -> String {
    match reindent(text) {
        Ok(pretty) => pretty,
        Err(e) => {
            tracing::debug!("Falling back to raw text for malformed XML: {}", e);
            text.to_string()
        }
    }
}

fn reindent(text: &str) -> XmlResult<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut depth: usize = 0;
    let mut saw_element = false;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Start(_) => {
                depth += 1;
                saw_element = true;
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or("unbalanced end tag")?;
            }
            Event::Empty(_) => saw_element = true,
            _ => {}
        }
        writer.write_event(event)?;
    }

    if !saw_element || depth != 0 {
        return Err("not a well-formed XML document".into());
    }

    Ok(String::from_utf8(writer.into_inner())?)
}
