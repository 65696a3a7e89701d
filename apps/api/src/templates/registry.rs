use std::collections::HashMap;

use serde::Serialize;

use crate::models::resume::ResumeDocument;
use crate::templates::catalog::{default_template, find_template, TemplateSpec, TEMPLATES};
use crate::templates::layouts::{self, LayoutFn, Palette};
use crate::templates::tree::{Node, Rgb, Theme};

/// Output of the template renderer: everything the rasterizer needs, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPreview {
    pub template_id: u8,
    pub template_name: &'static str,
    pub font: &'static str,
    pub theme: Theme,
    pub background: Rgb,
    pub root: Node,
}

/// Maps template ids to layout functions.
///
/// Adding a template is one `register` call; the render path never changes.
#[derive(Clone)]
pub struct TemplateRegistry {
    layouts: HashMap<u8, LayoutFn>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            layouts: HashMap::new(),
        }
    }

    /// Registry with a layout for every catalog template.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let layouts: [(u8, LayoutFn); 15] = [
            (1, layouts::classic),
            (2, layouts::modern),
            (3, layouts::clean),
            (4, layouts::sidebar),
            (5, layouts::two_column),
            (6, layouts::timeline),
            (7, layouts::executive),
            (8, layouts::creative),
            (9, layouts::technical),
            (10, layouts::banner),
            (11, layouts::compact),
            (12, layouts::academic),
            (13, layouts::bold),
            (14, layouts::elegant),
            (15, layouts::monochrome),
        ];
        for (id, layout) in layouts {
            registry.register(id, layout);
        }
        registry
    }

    pub fn register(&mut self, id: u8, layout: LayoutFn) {
        self.layouts.insert(id, layout);
    }

    pub fn has_layout(&self, id: u8) -> bool {
        self.layouts.contains_key(&id)
    }

    /// Renders `doc` with template `template_id`.
    ///
    /// Ids without a registered layout use the minimal layout; ids outside the catalog
    /// also take the default template's colours and font.
    pub fn render(&self, doc: &ResumeDocument, template_id: u8, theme: Theme) -> RenderedPreview {
        let spec: &TemplateSpec = find_template(template_id).unwrap_or_else(default_template);
        let palette = Palette::new(spec, theme);
        let layout = self
            .layouts
            .get(&template_id)
            .copied()
            .unwrap_or(layouts::minimal as LayoutFn);

        RenderedPreview {
            template_id: spec.id,
            template_name: spec.name,
            font: spec.font,
            theme,
            background: palette.page,
            root: layout(doc, &palette),
        }
    }

    /// Every catalog entry paired with whether it has a dedicated layout.
    pub fn catalog(&self) -> Vec<(&'static TemplateSpec, bool)> {
        TEMPLATES
            .iter()
            .map(|t| (t, self.has_layout(t.id)))
            .collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ExperienceEntry, PersonalInfo};

    fn make_doc() -> ResumeDocument {
        let mut doc = ResumeDocument {
            personal: PersonalInfo {
                name: "Jane Doe".into(),
                title: "Engineer".into(),
                location: "Oslo".into(),
                email: "jane@example.com".into(),
                phone: "123".into(),
                about: "About me".into(),
            },
            skills: "Rust, Go".into(),
            ..Default::default()
        };
        doc.experience.push(ExperienceEntry {
            position: "Engineer".into(),
            company: "Acme".into(),
            start_date: "2020".into(),
            end_date: "2023".into(),
            description: Some("Built the billing pipeline".into()),
        });
        doc
    }

    #[test]
    fn test_every_catalog_template_has_layout() {
        let registry = TemplateRegistry::builtin();
        assert!(registry.catalog().iter().all(|(_, has)| *has));
    }

    #[test]
    fn test_render_is_deterministic() {
        let registry = TemplateRegistry::builtin();
        let doc = make_doc();
        assert_eq!(
            registry.render(&doc, 4, Theme::Light),
            registry.render(&doc, 4, Theme::Light)
        );
    }

    #[test]
    fn test_render_does_not_mutate_document() {
        let registry = TemplateRegistry::builtin();
        let doc = make_doc();
        let before = doc.clone();
        for spec in TEMPLATES.iter() {
            let _ = registry.render(&doc, spec.id, Theme::Dark);
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_every_layout_shows_core_content() {
        let registry = TemplateRegistry::builtin();
        let doc = make_doc();
        for spec in TEMPLATES.iter() {
            let preview = registry.render(&doc, spec.id, Theme::Light);
            let text = preview.root.texts().join("\n");
            assert!(text.contains("Jane Doe"), "template {} lost the name", spec.id);
            assert!(
                text.contains("Built the billing pipeline"),
                "template {} lost experience",
                spec.id
            );
            assert!(text.contains("Rust"), "template {} lost skills", spec.id);
        }
    }

    #[test]
    fn test_unknown_id_falls_back_to_minimal() {
        let registry = TemplateRegistry::builtin();
        let doc = make_doc();
        let preview = registry.render(&doc, 99, Theme::Light);
        assert_eq!(preview.template_id, default_template().id);
        let palette = Palette::new(default_template(), Theme::Light);
        assert_eq!(preview.root, layouts::minimal(&doc, &palette));
    }

    #[test]
    fn test_unregistered_catalog_id_uses_minimal_with_own_colours() {
        let registry = TemplateRegistry::empty();
        let doc = make_doc();
        let preview = registry.render(&doc, 6, Theme::Light);
        assert_eq!(preview.template_id, 6);
        let palette = Palette::new(find_template(6).unwrap(), Theme::Light);
        assert_eq!(preview.root, layouts::minimal(&doc, &palette));
    }

    #[test]
    fn test_theme_changes_background_only_through_palette() {
        let registry = TemplateRegistry::builtin();
        let doc = make_doc();
        let light = registry.render(&doc, 2, Theme::Light);
        let dark = registry.render(&doc, 2, Theme::Dark);
        assert_ne!(light.background, dark.background);
        assert_eq!(light.root.texts(), dark.root.texts());
    }
}
