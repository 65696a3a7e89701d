use serde::Serialize;

use crate::templates::tree::Rgb;

/// One of the fixed visual templates a resume can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateSpec {
    pub id: u8,
    pub name: &'static str,
    /// Accent colour used for headers, rules and sidebars.
    pub preview_color: Rgb,
    pub text_color: Rgb,
    /// Font family name; the rasterizer resolves it against its font directory.
    pub font: &'static str,
}

pub const DEFAULT_TEMPLATE_ID: u8 = 1;

const fn spec(
    id: u8,
    name: &'static str,
    preview_color: u32,
    text_color: u32,
    font: &'static str,
) -> TemplateSpec {
    TemplateSpec {
        id,
        name,
        preview_color: Rgb::hex(preview_color),
        text_color: Rgb::hex(text_color),
        font,
    }
}

pub static TEMPLATES: [TemplateSpec; 15] = [
    spec(1, "Classic", 0x1f2937, 0x111827, "Georgia"),
    spec(2, "Modern", 0x2563eb, 0x1e293b, "Inter"),
    spec(3, "Minimal", 0x6b7280, 0x1f2937, "Helvetica"),
    spec(4, "Sidebar", 0x0f766e, 0x0f172a, "Lato"),
    spec(5, "Two Column", 0x7c3aed, 0x1f2937, "Inter"),
    spec(6, "Timeline", 0xdb2777, 0x1f2937, "Roboto"),
    spec(7, "Executive", 0x1e3a8a, 0x0f172a, "Garamond"),
    spec(8, "Creative", 0xea580c, 0x292524, "Montserrat"),
    spec(9, "Technical", 0x16a34a, 0x14532d, "JetBrains Mono"),
    spec(10, "Banner", 0x0369a1, 0x0c4a6e, "Open Sans"),
    spec(11, "Compact", 0x475569, 0x1e293b, "Arial"),
    spec(12, "Academic", 0x7f1d1d, 0x1c1917, "Times New Roman"),
    spec(13, "Bold", 0xb91c1c, 0x111827, "Oswald"),
    spec(14, "Elegant", 0xa16207, 0x292524, "Playfair Display"),
    spec(15, "Monochrome", 0x000000, 0x000000, "Source Sans"),
];

pub fn find_template(id: u8) -> Option<&'static TemplateSpec> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn default_template() -> &'static TemplateSpec {
    &TEMPLATES[0]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fifteen_unique_ids() {
        let ids: HashSet<u8> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 15);
        assert!(ids.iter().all(|id| (1..=15).contains(id)));
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template(6).map(|t| t.name), Some("Timeline"));
        assert!(find_template(0).is_none());
        assert!(find_template(16).is_none());
    }

    #[test]
    fn test_default_template_matches_constant() {
        assert_eq!(default_template().id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn test_colors_serialize_as_hex() {
        let json = serde_json::to_value(find_template(2).unwrap()).unwrap();
        assert_eq!(json["preview_color"], "#2563eb");
        assert_eq!(json["font"], "Inter");
    }
}
