//! Locale-dependent strings used in generated output.

/// Fixed strings for one output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    /// Title of the synthesized entry when a document has no usable heading.
    pub placeholder_title: &'static str,
    /// Heading of the readme's "about" section.
    pub about_heading: &'static str,
    /// Body of the readme's "about" section.
    pub about_body: &'static str,
    /// Prefix of the readme's generation timestamp line.
    pub generated_at: &'static str,
}

const ENGLISH: Labels = Labels {
    placeholder_title: "Document Content",
    about_heading: "About This Document",
    about_body: "This document was converted automatically from a Word document and is laid out for GitBook.",
    generated_at: "Generated at",
};

const CHINESE: Labels = Labels {
    placeholder_title: "文档内容",
    about_heading: "关于本文档",
    about_body: "本文档由Word文档自动转换生成，使用GitBook格式展示。",
    generated_at: "本文档生成时间",
};

impl Labels {
    /// Pick labels for a locale tag; any `zh` tag gets Chinese, the rest English.
    pub fn for_language(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("zh") {
            CHINESE
        } else {
            ENGLISH
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        ENGLISH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_tags() {
        assert_eq!(Labels::for_language("zh-hans").placeholder_title, "文档内容");
        assert_eq!(Labels::for_language("ZH_TW").placeholder_title, "文档内容");
    }

    #[test]
    fn everything_else_is_english() {
        assert_eq!(Labels::for_language("en").placeholder_title, "Document Content");
        assert_eq!(Labels::for_language("").placeholder_title, "Document Content");
        assert_eq!(Labels::for_language("zhx").placeholder_title, "Document Content");
    }
}
