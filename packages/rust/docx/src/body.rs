//! Main document part parser: `w:body` -> ordered [`BodyElement`]s.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;
use wordbook_shared::{Result, WordbookError};

use crate::model::{BodyElement, EmbeddingShape, ImageRef, Paragraph, Run, Table};
use crate::styles::StyleSheet;
use crate::xml::{attr, decode_part, resolve_entity, split_qname};

/// Parse the main document part and resolve paragraph style names.
pub(crate) fn parse_body(part: &str, bytes: &[u8], styles: &StyleSheet) -> Result<Vec<BodyElement>> {
    let content = decode_part(part, bytes)?;
    let mut reader = Reader::from_str(&content);
    // `w:t` content keeps its whitespace; indentation between tags is never
    // inside a `w:t` so it is ignored by the state machine.
    reader.config_mut().trim_text(false);

    let mut state = BodyState::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => state.open(&e, false),
            Ok(Event::Empty(e)) => state.open(&e, true),
            Ok(Event::End(e)) => {
                let name = e.name();
                let (prefix, local) = split_qname(name.as_ref());
                state.close(prefix, local);
            }
            Ok(Event::Text(e)) => state.text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => state.text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    state.text(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(WordbookError::xml(part, e)),
            _ => {}
        }
    }

    let mut elements = state.elements;
    for element in &mut elements {
        if let BodyElement::Paragraph(para) = element {
            para.style_name = para
                .style_id
                .as_deref()
                .and_then(|id| styles.name_of(id))
                .map(str::to_string);
        }
    }
    trace!(part, elements = elements.len(), "parsed document body");
    Ok(elements)
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    /// Paragraph texts of the open cell.
    cell: Option<Vec<String>>,
    cell_paragraph: Option<String>,
}

#[derive(Default)]
struct BodyState {
    elements: Vec<BodyElement>,
    in_body: bool,
    /// Depth inside `w:txbxContent` subtrees, which are not body content.
    skip_depth: usize,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    drawing_depth: usize,
    pict_depth: usize,
    table: Option<TableState>,
    table_depth: usize,
}

impl BodyState {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.name();
        let (prefix, local) = split_qname(name.as_ref());

        if self.skip_depth > 0 {
            if !empty {
                self.skip_depth += 1;
            }
            return;
        }
        if (prefix, local) == (&b"w"[..], &b"body"[..]) {
            self.in_body = !empty;
            return;
        }
        if !self.in_body {
            return;
        }
        if (prefix, local) == (&b"w"[..], &b"txbxContent"[..]) {
            if !empty {
                self.skip_depth = 1;
            }
            return;
        }

        if self.drawing_depth > 0 || self.pict_depth > 0 {
            self.open_embedded(prefix, local, e, empty);
            return;
        }

        match (prefix, local) {
            (b"w", b"tbl") => {
                if empty {
                    return;
                }
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(TableState::default());
                }
            }
            (b"w", b"tr") if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    if empty {
                        table.rows.push(Vec::new());
                    } else {
                        table.row = Some(Vec::new());
                    }
                }
            }
            (b"w", b"tc") if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut() {
                    if empty {
                        if let Some(row) = table.row.as_mut() {
                            row.push(String::new());
                        }
                    } else {
                        table.cell = Some(Vec::new());
                    }
                }
            }
            (b"w", b"p") => self.open_paragraph(empty),
            (b"w", b"pPr") if !empty => self.in_ppr = true,
            (b"w", b"pStyle") if self.in_ppr => {
                if let Some(para) = self.paragraph.as_mut() {
                    para.style_id = attr(e, b"val");
                }
            }
            (b"w", b"r") if !empty && !self.in_ppr => {
                if self.paragraph.is_some() {
                    self.run = Some(Run::default());
                }
            }
            (b"w", b"rPr") if !empty => self.in_rpr = true,
            (b"w", b"b") | (b"w", b"i") | (b"w", b"u") if self.in_rpr && !self.in_ppr => {
                if let Some(run) = self.run.as_mut() {
                    let on = toggle_value(local, attr(e, b"val").as_deref());
                    match local {
                        b"b" => run.bold = on,
                        b"i" => run.italic = on,
                        _ => run.underline = on,
                    }
                }
            }
            (b"w", b"t") if !empty => self.in_text = true,
            (b"w", b"tab") if !self.in_ppr => self.push_text("\t"),
            (b"w", b"br") if !self.in_ppr => {
                if attr(e, b"type").as_deref() != Some("page") {
                    self.push_text("\n");
                }
            }
            (b"w", b"cr") if !self.in_ppr => self.push_text("\n"),
            (b"w", b"drawing") if !empty => self.drawing_depth = 1,
            (b"w", b"pict") if !empty => self.pict_depth = 1,
            (b"a", b"blip") => {
                if let Some(rel_id) = attr(e, b"embed") {
                    self.push_image(rel_id, EmbeddingShape::BareEmbed);
                }
            }
            _ => {}
        }
    }

    /// Elements inside `w:drawing` / `w:pict`: only image references count.
    fn open_embedded(&mut self, prefix: &[u8], local: &[u8], e: &BytesStart<'_>, empty: bool) {
        match (prefix, local) {
            (b"w", b"drawing") if !empty => self.drawing_depth += 1,
            (b"w", b"pict") if !empty => self.pict_depth += 1,
            (b"a", b"blip") => {
                if let Some(rel_id) = attr(e, b"embed") {
                    let shape = if self.drawing_depth > 0 {
                        EmbeddingShape::Drawing
                    } else {
                        EmbeddingShape::BareEmbed
                    };
                    self.push_image(rel_id, shape);
                }
            }
            (b"v", b"imagedata") if self.pict_depth > 0 => {
                if let Some(rel_id) = attr(e, b"id") {
                    self.push_image(rel_id, EmbeddingShape::LegacyPicture);
                }
            }
            _ => {}
        }
    }

    fn open_paragraph(&mut self, empty: bool) {
        if let Some(table) = self.table.as_mut() {
            if let Some(cell) = table.cell.as_mut() {
                if empty {
                    cell.push(String::new());
                } else {
                    table.cell_paragraph = Some(String::new());
                }
            }
            return;
        }
        if self.table_depth > 0 {
            return;
        }
        if empty {
            self.elements.push(BodyElement::Paragraph(Paragraph::default()));
        } else {
            self.paragraph = Some(Paragraph::default());
        }
    }

    fn close(&mut self, prefix: &[u8], local: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        if (prefix, local) == (&b"w"[..], &b"body"[..]) {
            self.in_body = false;
            return;
        }
        if !self.in_body {
            return;
        }

        if self.drawing_depth > 0 || self.pict_depth > 0 {
            match (prefix, local) {
                (b"w", b"drawing") if self.drawing_depth > 0 => self.drawing_depth -= 1,
                (b"w", b"pict") if self.pict_depth > 0 => self.pict_depth -= 1,
                _ => {}
            }
            return;
        }

        match (prefix, local) {
            (b"w", b"t") => self.in_text = false,
            (b"w", b"pPr") => self.in_ppr = false,
            (b"w", b"rPr") => self.in_rpr = false,
            (b"w", b"r") => {
                if let (Some(run), Some(para)) = (self.run.take(), self.paragraph.as_mut()) {
                    para.runs.push(run);
                }
            }
            (b"w", b"p") => {
                if let Some(table) = self.table.as_mut() {
                    if let (Some(text), Some(cell)) =
                        (table.cell_paragraph.take(), table.cell.as_mut())
                    {
                        cell.push(text);
                    }
                } else if let Some(para) = self.paragraph.take() {
                    self.elements.push(BodyElement::Paragraph(para));
                }
                self.run = None;
            }
            (b"w", b"tc") if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut()
                    && let Some(cell) = table.cell.take()
                {
                    let text = cell.join("\n");
                    if let Some(row) = table.row.as_mut() {
                        row.push(text);
                    }
                }
            }
            (b"w", b"tr") if self.table_depth == 1 => {
                if let Some(table) = self.table.as_mut()
                    && let Some(row) = table.row.take()
                {
                    table.rows.push(row);
                }
            }
            (b"w", b"tbl") if self.table_depth > 0 => {
                self.table_depth -= 1;
                if self.table_depth == 0
                    && let Some(table) = self.table.take()
                {
                    self.elements.push(BodyElement::Table(Table::new(table.rows)));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.skip_depth == 0 && self.drawing_depth == 0 && self.pict_depth == 0 {
            self.push_text(text);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(table) = self.table.as_mut() {
            if let Some(buf) = table.cell_paragraph.as_mut() {
                buf.push_str(text);
            }
        } else if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn push_image(&mut self, rel_id: String, shape: EmbeddingShape) {
        if self.table.is_none()
            && let Some(run) = self.run.as_mut()
        {
            run.images.push(ImageRef::new(rel_id, shape));
        }
    }
}

/// OOXML on/off property: absent value means on.
fn toggle_value(local: &[u8], val: Option<&str>) -> bool {
    match val {
        None => true,
        Some(v) if local == b"u" => !v.eq_ignore_ascii_case("none"),
        Some(v) => !matches!(v, "0" | "false" | "off"),
    }
}
