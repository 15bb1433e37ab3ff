//! Small helpers shared by the part parsers.

use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;
use wordbook_shared::{Result, WordbookError};

/// Strip a UTF-8 BOM if present.
pub(crate) fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Decode a part's bytes as UTF-8 text.
pub(crate) fn decode_part(part: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(strip_bom(bytes).to_vec()).map_err(|e| WordbookError::xml(part, e))
}

/// Split a qualified name into `(prefix, local)`; the prefix is empty when absent.
pub(crate) fn split_qname(name: &[u8]) -> (&[u8], &[u8]) {
    match name.iter().position(|&b| b == b':') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => (&[], name),
    }
}

/// Extract the local name from a namespaced XML name (`w:p` -> `p`).
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Value of the first attribute whose local name matches, with entities resolved.
pub(crate) fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == local)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            match unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            }
        })
}

/// Resolve an XML entity reference (`amp`, `#x4E2D`, `#20013`).
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_bom_only_removes_prefix() {
        assert_eq!(strip_bom(&[0xEF, 0xBB, 0xBF, b'a']), b"a");
        assert_eq!(strip_bom(b"abc"), b"abc");
    }

    #[test]
    fn split_qname_handles_prefixless_names() {
        assert_eq!(split_qname(b"w:p"), (&b"w"[..], &b"p"[..]));
        assert_eq!(split_qname(b"Relationship"), (&b""[..], &b"Relationship"[..]));
    }

    #[test]
    fn resolve_entity_covers_named_and_numeric() {
        assert_eq!(resolve_entity("amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity("#x4E2D").as_deref(), Some("中"));
        assert_eq!(resolve_entity("#65").as_deref(), Some("A"));
        assert_eq!(resolve_entity("nbsp"), None);
    }
}
