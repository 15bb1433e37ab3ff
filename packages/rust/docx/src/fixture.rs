//! In-memory `.docx` writer for tests.
//!
//! Produces the smallest package [`DocxPackage`](crate::DocxPackage) accepts:
//! content types, root relationships, the main document with its
//! relationships, a style sheet, and any media parts.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use wordbook_shared::{Result, WordbookError};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const STYLES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

struct Media {
    rel_id: String,
    name: String,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
}

/// Builder for a minimal word-processing package.
#[derive(Default)]
pub struct DocxFixture {
    body: String,
    styles: Vec<(String, String)>,
    media: Vec<Media>,
    links: Vec<(String, String)>,
    omit_styles: bool,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a paragraph style.
    pub fn style(mut self, id: &str, name: &str) -> Self {
        if !self.styles.iter().any(|(existing, _)| existing == id) {
            self.styles.push((id.to_string(), name.to_string()));
        }
        self
    }

    /// Leave `word/styles.xml` out of the package.
    pub fn without_styles(mut self) -> Self {
        self.omit_styles = true;
        self
    }

    /// Append raw body XML (prefixes `w`, `r`, `a`, `v` are declared).
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// `Heading N` paragraph using Word's built-in `HeadingN` style.
    pub fn heading(self, level: u32, text: &str) -> Self {
        let id = format!("Heading{level}");
        let name = format!("heading {level}");
        self.style(&id, &name).raw(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{id}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ))
    }

    /// Paragraph with an arbitrary style id (not declared in the style sheet).
    pub fn styled_paragraph(self, style_id: &str, text: &str) -> Self {
        self.raw(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(style_id),
            escape(text)
        ))
    }

    /// Unstyled single-run paragraph.
    pub fn paragraph(self, text: &str) -> Self {
        self.raw(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(text)
        ))
    }

    /// Paragraph whose only run holds a `w:drawing` image.
    pub fn image_paragraph(self, rel_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        self.media(rel_id, name, bytes).raw(&format!(
            r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ))
    }

    /// Paragraph whose only run holds a legacy `w:pict` image.
    pub fn picture_paragraph(self, rel_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        self.media(rel_id, name, bytes).raw(&format!(
            r#"<w:p><w:r><w:pict><v:shape><v:imagedata r:id="{rel_id}" o:title=""/></v:shape></w:pict></w:r></w:p>"#
        ))
    }

    /// Table whose cells each hold one paragraph.
    pub fn table(self, rows: &[&[&str]]) -> Self {
        let mut xml = String::from("<w:tbl><w:tblPr/>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str("<w:tc>");
                for line in cell.split('\n') {
                    xml.push_str(&format!(
                        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                        escape(line)
                    ));
                }
                xml.push_str("</w:tc>");
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        self.raw(&xml)
    }

    /// Image part related to the document but not referenced from the body.
    pub fn media(mut self, rel_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        self.media.push(Media {
            rel_id: rel_id.to_string(),
            name: name.to_string(),
            content_type: None,
            bytes: Some(bytes),
        });
        self
    }

    /// Media part with an explicit declared content type.
    pub fn media_typed(mut self, rel_id: &str, name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.media.push(Media {
            rel_id: rel_id.to_string(),
            name: name.to_string(),
            content_type: Some(content_type.to_string()),
            bytes: Some(bytes),
        });
        self
    }

    /// Relationship to an image part that is absent from the archive.
    pub fn missing_media(mut self, rel_id: &str, name: &str) -> Self {
        self.media.push(Media {
            rel_id: rel_id.to_string(),
            name: name.to_string(),
            content_type: None,
            bytes: None,
        });
        self
    }

    /// External hyperlink relationship.
    pub fn external_link(mut self, rel_id: &str, url: &str) -> Self {
        self.links.push((rel_id.to_string(), url.to_string()));
        self
    }

    /// Write the package into memory.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut files: Vec<(String, Vec<u8>)> = vec![
            ("[Content_Types].xml".into(), self.content_types().into_bytes()),
            ("_rels/.rels".into(), ROOT_RELS.as_bytes().to_vec()),
            ("word/document.xml".into(), self.document().into_bytes()),
            ("word/_rels/document.xml.rels".into(), self.document_rels().into_bytes()),
        ];
        if !self.omit_styles {
            files.push(("word/styles.xml".into(), self.styles_xml().into_bytes()));
        }
        for media in &self.media {
            if let Some(bytes) = &media.bytes {
                files.push((format!("word/media/{}", media.name), bytes.clone()));
            }
        }

        for (name, bytes) in files {
            zip.start_file(name.as_str(), options)
                .map_err(|e| WordbookError::package(format!("{name}: {e}")))?;
            zip.write_all(&bytes)
                .map_err(|e| WordbookError::package(format!("{name}: {e}")))?;
        }
        let cursor = zip
            .finish()
            .map_err(|e| WordbookError::package(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Default Extension="jpeg" ContentType="image/jpeg"/>
<Default Extension="jpg" ContentType="image/jpeg"/>
<Default Extension="gif" ContentType="image/gif"/>
<Default Extension="bmp" ContentType="image/bmp"/>
<Default Extension="tiff" ContentType="image/tiff"/>
<Default Extension="emf" ContentType="image/x-emf"/>
<Default Extension="bin" ContentType="application/octet-stream"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
"#,
        );
        for media in &self.media {
            if let Some(ct) = &media.content_type {
                xml.push_str(&format!(
                    "<Override PartName=\"/word/media/{}\" ContentType=\"{}\"/>\n",
                    escape(&media.name),
                    escape(ct)
                ));
            }
        }
        xml.push_str("</Types>");
        xml
    }

    fn document(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office">
<w:body>{}<w:sectPr/></w:body>
</w:document>"#,
            self.body
        )
    }

    fn document_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        if !self.omit_styles {
            xml.push_str(&format!(
                "<Relationship Id=\"rIdStyles\" Type=\"{STYLES_REL}\" Target=\"styles.xml\"/>\n"
            ));
        }
        for media in &self.media {
            xml.push_str(&format!(
                "<Relationship Id=\"{}\" Type=\"{IMAGE_REL}\" Target=\"media/{}\"/>\n",
                escape(&media.rel_id),
                escape(&media.name)
            ));
        }
        for (rel_id, url) in &self.links {
            xml.push_str(&format!(
                "<Relationship Id=\"{}\" Type=\"{HYPERLINK_REL}\" Target=\"{}\" TargetMode=\"External\"/>\n",
                escape(rel_id),
                escape(url)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn styles_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
"#,
        );
        for (id, name) in &self.styles {
            xml.push_str(&format!(
                "<w:style w:type=\"paragraph\" w:styleId=\"{}\"><w:name w:val=\"{}\"/></w:style>\n",
                escape(id),
                escape(name)
            ));
        }
        xml.push_str("</w:styles>");
        xml
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;
