//! Fixed stylesheet and settings parts.

use super::xml::XML_DECLARATION;

pub(crate) const WORDPROCESSING_NS: &str =
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const WP_DRAWING_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const PICTURE_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Character-style color applied to hyperlink runs.
pub(crate) const HYPERLINK_COLOR: &str = "0563C1";

/// Produce `word/styles.xml`: document defaults plus the fixed style set.
pub(crate) fn styles_xml() -> String {
    let mut out = String::with_capacity(2048);
    out.push_str(XML_DECLARATION);
    out.push_str(&format!("<w:styles xmlns:w=\"{}\">", WORDPROCESSING_NS));

    out.push_str(
        "<w:docDefaults>\
         <w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:cs=\"Calibri\"/>\
         <w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/>\
         </w:rPr></w:rPrDefault>\
         <w:pPrDefault><w:pPr>\
         <w:spacing w:after=\"160\" w:line=\"259\" w:lineRule=\"auto\"/>\
         </w:pPr></w:pPrDefault>\
         </w:docDefaults>",
    );

    out.push_str(
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">\
         <w:name w:val=\"Normal\"/><w:qFormat/>\
         </w:style>",
    );

    out.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"Heading1\">\
         <w:name w:val=\"heading 1\"/><w:basedOn w:val=\"Normal\"/><w:qFormat/>\
         <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"0\"/></w:pPr>\
         <w:rPr><w:b/><w:sz w:val=\"32\"/><w:szCs w:val=\"32\"/></w:rPr>\
         </w:style>",
    );

    out.push_str(
        "<w:style w:type=\"paragraph\" w:styleId=\"Heading2\">\
         <w:name w:val=\"heading 2\"/><w:basedOn w:val=\"Normal\"/><w:qFormat/>\
         <w:pPr><w:keepNext/><w:spacing w:before=\"200\" w:after=\"100\"/><w:outlineLvl w:val=\"1\"/></w:pPr>\
         <w:rPr><w:b/><w:sz w:val=\"28\"/><w:szCs w:val=\"28\"/></w:rPr>\
         </w:style>",
    );

    out.push_str(&format!(
        "<w:style w:type=\"character\" w:styleId=\"Hyperlink\">\
         <w:name w:val=\"Hyperlink\"/>\
         <w:rPr><w:color w:val=\"{HYPERLINK_COLOR}\"/><w:u w:val=\"single\"/></w:rPr>\
         </w:style>",
    ));

    out.push_str(
        "<w:style w:type=\"table\" w:default=\"1\" w:styleId=\"TableNormal\">\
         <w:name w:val=\"Normal Table\"/>\
         <w:tblPr>\
         <w:tblCellMar>\
         <w:top w:w=\"0\" w:type=\"dxa\"/><w:left w:w=\"108\" w:type=\"dxa\"/>\
         <w:bottom w:w=\"0\" w:type=\"dxa\"/><w:right w:w=\"108\" w:type=\"dxa\"/>\
         </w:tblCellMar>\
         </w:tblPr>\
         </w:style>",
    );

    out.push_str("</w:styles>");
    out
}

/// Produce `word/settings.xml`: compatibility mode and tab defaults.
pub(crate) fn settings_xml() -> String {
    let mut out = String::with_capacity(512);
    out.push_str(XML_DECLARATION);
    out.push_str(&format!("<w:settings xmlns:w=\"{}\">", WORDPROCESSING_NS));
    out.push_str("<w:defaultTabStop w:val=\"708\"/>");
    out.push_str(
        "<w:compat>\
         <w:compatSetting w:name=\"compatibilityMode\" \
         w:uri=\"http://schemas.microsoft.com/office/word\" w:val=\"15\"/>\
         </w:compat>",
    );
    out.push_str("</w:settings>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_contains_fixed_style_set() {
        let xml = styles_xml();
        for id in ["Normal", "Heading1", "Heading2", "Hyperlink", "TableNormal"] {
            assert!(xml.contains(&format!("w:styleId=\"{id}\"")), "missing {id}");
        }
    }

    #[test]
    fn test_settings_has_tab_stop_and_compat() {
        let xml = settings_xml();
        assert!(xml.contains("defaultTabStop"));
        assert!(xml.contains("compatibilityMode"));
    }
}
