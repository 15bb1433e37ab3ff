//! `[Content_Types].xml`: media types by extension and by part name.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;
use wordbook_shared::{Result, WordbookError};

use crate::xml::{attr, decode_part, local_name};

pub(crate) const PART_NAME: &str = "[Content_Types].xml";

const UNKNOWN: &str = "application/octet-stream";

#[derive(Debug, Default, Clone)]
pub(crate) struct ContentTypes {
    /// Lower-cased extension -> media type.
    defaults: HashMap<String, String>,
    /// Lower-cased part name without the leading `/` -> media type.
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        let content = decode_part(PART_NAME, bytes)?;
        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut types = Self::default();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attr(&e, b"Extension"), attr(&e, b"ContentType"))
                            {
                                types.defaults.insert(ext.to_ascii_lowercase(), ct);
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) =
                                (attr(&e, b"PartName"), attr(&e, b"ContentType"))
                            {
                                let key = part.trim_start_matches('/').to_ascii_lowercase();
                                types.overrides.insert(key, ct);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(WordbookError::xml(PART_NAME, e)),
                _ => {}
            }
        }
        Ok(types)
    }

    /// Media type of a part (path inside the package, no leading `/`).
    pub(crate) fn lookup(&self, part: &str) -> &str {
        let key = part.trim_start_matches('/').to_ascii_lowercase();
        if let Some(ct) = self.overrides.get(&key) {
            return ct;
        }
        key.rsplit_once('.')
            .and_then(|(_, ext)| self.defaults.get(ext))
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="PNG" ContentType="image/png"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/media/chart.bin" ContentType="image/x-emf"/>
</Types>"#;

    #[test]
    fn overrides_win_over_defaults() {
        let types = ContentTypes::parse(TYPES.as_bytes()).unwrap();
        assert!(types.lookup("word/document.xml").contains("document.main"));
        assert_eq!(types.lookup("word/media/chart.bin"), "image/x-emf");
    }

    #[test]
    fn defaults_match_extension_case_insensitively() {
        let types = ContentTypes::parse(TYPES.as_bytes()).unwrap();
        assert_eq!(types.lookup("word/media/image1.png"), "image/png");
        assert_eq!(types.lookup("word/media/IMAGE2.Png"), "image/png");
        assert_eq!(types.lookup("word/media/clip.wav"), UNKNOWN);
    }
}
