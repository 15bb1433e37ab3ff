//! `word/styles.xml`: style id -> display name.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;
use wordbook_shared::{Result, WordbookError};

use crate::xml::{attr, decode_part, split_qname};

/// Paragraph style names keyed by style id.
#[derive(Debug, Default, Clone)]
pub struct StyleSheet {
    names: HashMap<String, String>,
}

impl StyleSheet {
    pub fn parse(part: &str, bytes: &[u8]) -> Result<Self> {
        let content = decode_part(part, bytes)?;
        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut names = HashMap::new();
        let mut current: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = e.name();
                    match split_qname(name.as_ref()) {
                        (b"w", b"style") => {
                            let kind = attr(&e, b"type");
                            current = match kind.as_deref() {
                                None | Some("paragraph") => attr(&e, b"styleId"),
                                Some(_) => None,
                            };
                        }
                        (b"w", b"name") => {
                            if let (Some(id), Some(display)) = (current.as_ref(), attr(&e, b"val")) {
                                names.insert(id.clone(), normalize_name(&display));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(e)) => {
                    if split_qname(e.name().as_ref()) == (&b"w"[..], &b"style"[..]) {
                        current = None;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(WordbookError::xml(part, e)),
                _ => {}
            }
        }

        Ok(Self { names })
    }

    /// Build a sheet from `(id, name)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            names: pairs
                .into_iter()
                .map(|(id, name)| (id.to_string(), normalize_name(name)))
                .collect(),
        }
    }

    /// Display name for a style id.
    pub fn name_of(&self, style_id: &str) -> Option<&str> {
        self.names.get(style_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Word stores built-in style names in lower case (`heading 1`, `title`)
/// while its UI shows them capitalized.
fn normalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() && name.is_ascii() => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="1"><w:name w:val="标题 1"/></w:style>
  <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
</w:styles>"#;

    #[test]
    fn resolves_paragraph_style_names() {
        let sheet = StyleSheet::parse("word/styles.xml", STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.name_of("Normal"), Some("Normal"));
        assert_eq!(sheet.name_of("Heading1"), Some("Heading 1"));
        assert_eq!(sheet.name_of("1"), Some("标题 1"));
        assert_eq!(sheet.len(), 3);
    }

    #[test]
    fn character_styles_are_ignored() {
        let sheet = StyleSheet::parse("word/styles.xml", STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.name_of("Strong"), None);
    }

    #[test]
    fn malformed_styles_surface_as_xml_errors() {
        let err = StyleSheet::parse("word/styles.xml", b"<w:styles><w:style></w:styles>").unwrap_err();
        assert!(matches!(err, WordbookError::Xml { .. }));
    }
}
