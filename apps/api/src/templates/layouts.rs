//! Layout functions, one per template. Each is a pure function of the document and palette.
//!
//! All layouts draw from the same section builders in `Blocks`; they differ only in
//! arrangement, heading treatment and type scale. Empty sections are omitted.

use std::collections::HashSet;

use crate::models::resume::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeDocument};
use crate::templates::catalog::TemplateSpec;
use crate::templates::tree::{Align, BoxStyle, Node, Rgb, TextStyle, Theme};

// ────────────────────────────────────────────────────────────────────────────
// Palette
// ────────────────────────────────────────────────────────────────────────────

/// Resolved colours for one (template, theme) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub page: Rgb,
    pub ink: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    /// Tinted background for panels and sidebars.
    pub surface: Rgb,
    /// Text drawn on top of `accent`.
    pub on_accent: Rgb,
}

const DARK_PAGE: Rgb = Rgb::hex(0x111827);

impl Palette {
    pub fn new(template: &TemplateSpec, theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                page: Rgb::WHITE,
                ink: template.text_color,
                muted: template.text_color.mix(Rgb::WHITE, 0.45),
                accent: template.preview_color,
                surface: template.preview_color.mix(Rgb::WHITE, 0.88),
                on_accent: Rgb::WHITE,
            },
            Theme::Dark => {
                let ink = template.text_color.mix(Rgb::WHITE, 0.9);
                let accent = template.preview_color.mix(Rgb::WHITE, 0.35);
                Palette {
                    page: DARK_PAGE,
                    ink,
                    muted: ink.mix(DARK_PAGE, 0.35),
                    accent,
                    surface: accent.mix(DARK_PAGE, 0.82),
                    on_accent: DARK_PAGE,
                }
            }
        }
    }
}

pub type LayoutFn = fn(&ResumeDocument, &Palette) -> Node;

// ────────────────────────────────────────────────────────────────────────────
// Shared section builders
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Sizes {
    name: f32,
    title: f32,
    heading: f32,
    body: f32,
    small: f32,
    gap: f32,
}

const REGULAR: Sizes = Sizes {
    name: 26.0,
    title: 14.0,
    heading: 13.0,
    body: 11.0,
    small: 10.0,
    gap: 14.0,
};

const COMPACT: Sizes = Sizes {
    name: 20.0,
    title: 12.0,
    heading: 11.0,
    body: 9.5,
    small: 8.5,
    gap: 8.0,
};

const LARGE: Sizes = Sizes {
    name: 34.0,
    title: 16.0,
    heading: 15.0,
    body: 11.0,
    small: 10.0,
    gap: 16.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    /// Upper-case title over a hairline rule.
    Ruled,
    Plain,
    /// Title inside a tinted band.
    Filled,
    /// Title over a heavy accent bar.
    Heavy,
    /// Centred muted title between rules.
    Centered,
}

struct Blocks<'a> {
    doc: &'a ResumeDocument,
    p: &'a Palette,
    s: Sizes,
    heading: Heading,
}

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

/// `start - end`, or whichever side is present.
fn date_range(start: &str, end: &str) -> String {
    match (non_empty(start), non_empty(end)) {
        (Some(s), Some(e)) => format!("{s} - {e}"),
        (Some(s), None) => s.to_string(),
        (None, Some(e)) => e.to_string(),
        (None, None) => String::new(),
    }
}

/// Skill tokens in the order the user typed them, first occurrence wins.
fn ordered_skills(raw: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect()
}

/// Flattens optional blocks into a column.
fn stack(gap: f32, parts: Vec<Option<Node>>) -> Node {
    Node::column(gap, parts.into_iter().flatten().collect())
}

impl<'a> Blocks<'a> {
    fn new(doc: &'a ResumeDocument, p: &'a Palette, s: Sizes, heading: Heading) -> Self {
        Self { doc, p, s, heading }
    }

    /// Same content, different ink. Used for text placed on accent backgrounds.
    fn recolored<'b>(&self, palette: &'b Palette) -> Blocks<'b>
    where
        'a: 'b,
    {
        Blocks::new(self.doc, palette, self.s, self.heading)
    }

    fn body(&self) -> TextStyle {
        TextStyle::new(self.s.body, self.p.ink)
    }

    fn small(&self) -> TextStyle {
        TextStyle::new(self.s.small, self.p.muted)
    }

    fn strong(&self) -> TextStyle {
        TextStyle::new(self.s.body + 1.0, self.p.ink).bold()
    }

    fn heading_node(&self, title: &str) -> Node {
        let style = TextStyle::new(self.s.heading, self.p.accent).bold();
        match self.heading {
            Heading::Ruled => Node::column(
                3.0,
                vec![
                    Node::text(title.to_uppercase(), style),
                    Node::rule(self.p.accent, 1.0),
                ],
            ),
            Heading::Plain => Node::text(title, style),
            Heading::Filled => Node::panel(
                BoxStyle {
                    gap: 0.0,
                    padding: 4.0,
                    background: Some(self.p.surface),
                },
                vec![Node::text(title.to_uppercase(), style)],
            ),
            Heading::Heavy => Node::column(
                2.0,
                vec![
                    Node::text(title.to_uppercase(), style.bold()),
                    Node::rule(self.p.accent, 3.0),
                ],
            ),
            Heading::Centered => Node::column(
                3.0,
                vec![
                    Node::rule(self.p.muted, 0.5),
                    Node::text(
                        title.to_uppercase(),
                        TextStyle::new(self.s.heading, self.p.muted).aligned(Align::Center),
                    ),
                    Node::rule(self.p.muted, 0.5),
                ],
            ),
        }
    }

    fn section(&self, title: &str, items: Vec<Node>) -> Option<Node> {
        if items.is_empty() {
            return None;
        }
        let mut children = vec![self.heading_node(title)];
        children.extend(items);
        Some(Node::column(self.s.gap * 0.5, children))
    }

    fn contacts(&self) -> Vec<&'a str> {
        let p = &self.doc.personal;
        [p.email.as_str(), p.phone.as_str(), p.location.as_str()]
            .into_iter()
            .filter_map(non_empty)
            .collect()
    }

    /// Name and headline without contact details.
    fn title_block(&self, align: Align) -> Vec<Node> {
        let p = &self.doc.personal;
        let mut children = Vec::new();
        if let Some(name) = non_empty(&p.name) {
            children.push(Node::text(
                name,
                TextStyle::new(self.s.name, self.p.ink).bold().aligned(align),
            ));
        }
        if let Some(title) = non_empty(&p.title) {
            children.push(Node::text(
                title,
                TextStyle::new(self.s.title, self.p.accent).aligned(align),
            ));
        }
        children
    }

    fn header(&self, align: Align) -> Node {
        let mut children = self.title_block(align);
        let contacts = self.contacts();
        if !contacts.is_empty() {
            children.push(Node::text(contacts.join("  |  "), self.small().aligned(align)));
        }
        Node::column(4.0, children)
    }

    /// Contacts one per line, for narrow columns.
    fn contact_list(&self) -> Option<Node> {
        let items: Vec<Node> = self
            .contacts()
            .into_iter()
            .map(|c| Node::text(c, self.body()))
            .collect();
        self.section("Contact", items)
    }

    fn about(&self) -> Option<Node> {
        non_empty(&self.doc.personal.about)
            .and_then(|about| self.section("About", vec![Node::text(about, self.body())]))
    }

    fn education_entry(&self, e: &EducationEntry) -> (String, Vec<Node>) {
        let mut body = Vec::new();
        let degree = match (non_empty(&e.degree), non_empty(&e.field_of_study)) {
            (Some(d), Some(f)) => format!("{d} in {f}"),
            (Some(d), None) => d.to_string(),
            (None, Some(f)) => f.to_string(),
            (None, None) => String::new(),
        };
        if !degree.is_empty() {
            body.push(Node::text(degree, self.strong()));
        }
        if let Some(inst) = non_empty(&e.institution) {
            body.push(Node::text(inst, self.body()));
        }
        if let Some(grade) = e.grade.as_deref().and_then(non_empty) {
            body.push(Node::text(format!("Grade: {grade}"), self.small()));
        }
        if let Some(desc) = e.description.as_deref().and_then(non_empty) {
            body.push(Node::text(desc, self.body()));
        }
        (date_range(&e.start_date, &e.end_date), body)
    }

    fn experience_entry(&self, e: &ExperienceEntry) -> (String, Vec<Node>) {
        let mut body = Vec::new();
        if let Some(position) = non_empty(&e.position) {
            body.push(Node::text(position, self.strong()));
        }
        if let Some(company) = non_empty(&e.company) {
            body.push(Node::text(company, TextStyle::new(self.s.body, self.p.accent)));
        }
        if let Some(desc) = e.description.as_deref().and_then(non_empty) {
            body.push(Node::text(desc, self.body()));
        }
        (date_range(&e.start_date, &e.end_date), body)
    }

    fn project_entry(&self, pr: &ProjectEntry) -> Vec<Node> {
        let mut body = Vec::new();
        if let Some(title) = non_empty(&pr.title) {
            body.push(Node::text(title, self.strong()));
        }
        if let Some(desc) = non_empty(&pr.description) {
            body.push(Node::text(desc, self.body()));
        }
        if let Some(tech) = pr.technologies.as_deref().and_then(non_empty) {
            body.push(Node::text(format!("Technologies: {tech}"), self.small()));
        }
        if let Some(url) = pr.url.as_deref().and_then(non_empty) {
            body.push(Node::text(url, TextStyle::new(self.s.small, self.p.accent)));
        }
        body
    }

    /// Dated entry with the date printed under the body.
    fn stacked(&self, date: String, mut body: Vec<Node>) -> Node {
        if !date.is_empty() {
            body.push(Node::text(date, self.small()));
        }
        Node::column(2.0, body)
    }

    /// Dated entry with the date in a left gutter.
    fn gutter(&self, date: String, body: Vec<Node>) -> Node {
        Node::row(
            12.0,
            vec![
                (
                    0.24,
                    Node::text(date, TextStyle::new(self.s.small, self.p.accent).bold()),
                ),
                (0.76, Node::column(2.0, body)),
            ],
        )
    }

    fn education(&self, timeline: bool) -> Option<Node> {
        let items = self
            .doc
            .education
            .values()
            .map(|e| self.education_entry(e))
            .map(|(date, body)| {
                if timeline {
                    self.gutter(date, body)
                } else {
                    self.stacked(date, body)
                }
            })
            .collect();
        self.section("Education", items)
    }

    fn experience(&self, timeline: bool) -> Option<Node> {
        let items = self
            .doc
            .experience
            .values()
            .map(|e| self.experience_entry(e))
            .map(|(date, body)| {
                if timeline {
                    self.gutter(date, body)
                } else {
                    self.stacked(date, body)
                }
            })
            .collect();
        self.section("Experience", items)
    }

    fn projects(&self) -> Option<Node> {
        let items = self
            .doc
            .projects
            .values()
            .map(|pr| Node::column(2.0, self.project_entry(pr)))
            .collect();
        self.section("Projects", items)
    }

    /// Skills inline on one wrapped line, or one per line for narrow columns.
    fn skills(&self, one_per_line: bool) -> Option<Node> {
        let tokens = ordered_skills(&self.doc.skills);
        if tokens.is_empty() {
            return None;
        }
        let items = if one_per_line {
            tokens.into_iter().map(|t| Node::text(t, self.body())).collect()
        } else {
            vec![Node::text(tokens.join("  \u{2022}  "), self.body())]
        };
        self.section("Skills", items)
    }
}

fn page(padding: f32, gap: f32, children: Vec<Option<Node>>) -> Node {
    Node::panel(
        BoxStyle {
            gap,
            padding,
            background: None,
        },
        children.into_iter().flatten().collect(),
    )
}

fn band(background: Rgb, padding: f32, children: Vec<Node>) -> Node {
    Node::panel(
        BoxStyle {
            gap: 4.0,
            padding,
            background: Some(background),
        },
        children,
    )
}

/// Palette for text laid over the accent colour.
fn inverted(p: &Palette) -> Palette {
    Palette {
        ink: p.on_accent,
        muted: p.on_accent.mix(p.accent, 0.25),
        accent: p.on_accent,
        ..*p
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layouts
// ────────────────────────────────────────────────────────────────────────────

/// Fallback for ids without a registered layout: header then sections, no decoration.
pub fn minimal(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Plain);
    page(
        32.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            b.education(false),
            b.experience(false),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn classic(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Ruled);
    page(
        40.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Center)),
            b.about(),
            b.experience(false),
            b.education(false),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn modern(doc: &ResumeDocument, p: &Palette) -> Node {
    let inv = inverted(p);
    let b = Blocks::new(doc, p, REGULAR, Heading::Plain);
    let banner = band(p.accent, 28.0, vec![b.recolored(&inv).header(Align::Left)]);
    Node::column(
        0.0,
        vec![
            banner,
            page(
                32.0,
                REGULAR.gap,
                vec![
                    b.about(),
                    b.experience(false),
                    b.education(false),
                    b.projects(),
                    b.skills(false),
                ],
            ),
        ],
    )
}

pub fn clean(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Plain);
    page(
        48.0,
        REGULAR.gap * 1.5,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            b.experience(false),
            b.education(false),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn sidebar(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Ruled);
    let side = Node::panel(
        BoxStyle {
            gap: REGULAR.gap,
            padding: 20.0,
            background: Some(p.surface),
        },
        vec![b.contact_list(), b.skills(true), b.education(false)]
            .into_iter()
            .flatten()
            .collect(),
    );
    let main = page(
        24.0,
        REGULAR.gap,
        vec![
            Some(Node::column(4.0, b.title_block(Align::Left))),
            b.about(),
            b.experience(false),
            b.projects(),
        ],
    );
    Node::row(0.0, vec![(0.34, side), (0.66, main)])
}

pub fn two_column(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Ruled);
    let left = stack(REGULAR.gap, vec![b.experience(false), b.projects()]);
    let right = stack(REGULAR.gap, vec![b.education(false), b.skills(true)]);
    page(
        32.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            Some(Node::row(24.0, vec![(0.5, left), (0.5, right)])),
        ],
    )
}

pub fn timeline(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Heavy);
    page(
        36.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            b.experience(true),
            b.education(true),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn executive(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Ruled);
    page(
        44.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Center)),
            Some(Node::column(
                2.0,
                vec![
                    Node::rule(p.accent, 2.0),
                    Node::spacer(1.0),
                    Node::rule(p.accent, 0.5),
                ],
            )),
            b.about(),
            b.experience(true),
            b.education(false),
            b.skills(false),
            b.projects(),
        ],
    )
}

pub fn creative(doc: &ResumeDocument, p: &Palette) -> Node {
    let inv = inverted(p);
    let b = Blocks::new(doc, p, REGULAR, Heading::Filled);
    let on_accent = b.recolored(&inv);
    let side = Node::panel(
        BoxStyle {
            gap: REGULAR.gap,
            padding: 20.0,
            background: Some(p.accent),
        },
        vec![
            Some(on_accent.header(Align::Left)),
            on_accent.skills(true),
        ]
        .into_iter()
        .flatten()
        .collect(),
    );
    let main = page(
        24.0,
        REGULAR.gap,
        vec![b.about(), b.experience(false), b.projects(), b.education(false)],
    );
    Node::row(0.0, vec![(0.64, main), (0.36, side)])
}

pub fn technical(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Filled);
    page(
        32.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Left)),
            b.skills(false),
            b.projects(),
            b.experience(false),
            b.education(false),
            b.about(),
        ],
    )
}

pub fn banner(doc: &ResumeDocument, p: &Palette) -> Node {
    let inv = inverted(p);
    let b = Blocks::new(doc, p, REGULAR, Heading::Ruled);
    let top = band(p.accent, 32.0, vec![b.recolored(&inv).header(Align::Center)]);
    let left = stack(REGULAR.gap, vec![b.about(), b.experience(false)]);
    let right = stack(
        REGULAR.gap,
        vec![b.education(false), b.skills(true), b.projects()],
    );
    Node::column(
        0.0,
        vec![
            top,
            page(
                28.0,
                REGULAR.gap,
                vec![Some(Node::row(20.0, vec![(0.6, left), (0.4, right)]))],
            ),
        ],
    )
}

pub fn compact(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, COMPACT, Heading::Ruled);
    page(
        20.0,
        COMPACT.gap,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            b.experience(true),
            b.education(true),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn academic(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Centered);
    page(
        44.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Center)),
            b.education(false),
            b.experience(false),
            b.projects(),
            b.skills(false),
            b.about(),
        ],
    )
}

pub fn bold(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, LARGE, Heading::Heavy);
    page(
        36.0,
        LARGE.gap,
        vec![
            Some(b.header(Align::Left)),
            Some(Node::rule(p.accent, 6.0)),
            b.about(),
            b.experience(false),
            b.projects(),
            b.education(false),
            b.skills(false),
        ],
    )
}

pub fn elegant(doc: &ResumeDocument, p: &Palette) -> Node {
    let b = Blocks::new(doc, p, REGULAR, Heading::Centered);
    page(
        52.0,
        REGULAR.gap * 1.25,
        vec![
            Some(b.header(Align::Center)),
            b.about(),
            b.experience(false),
            b.education(false),
            b.projects(),
            b.skills(false),
        ],
    )
}

pub fn monochrome(doc: &ResumeDocument, p: &Palette) -> Node {
    let mono = Palette {
        accent: p.ink,
        surface: p.ink.mix(p.page, 0.9),
        ..*p
    };
    let b = Blocks::new(doc, &mono, REGULAR, Heading::Ruled);
    page(
        40.0,
        REGULAR.gap,
        vec![
            Some(b.header(Align::Left)),
            b.about(),
            b.experience(true),
            b.education(true),
            b.projects(),
            b.skills(false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalInfo;
    use crate::templates::catalog::find_template;

    fn make_doc() -> ResumeDocument {
        let mut doc = ResumeDocument {
            personal: PersonalInfo {
                name: "Jane Doe".into(),
                title: "Backend Engineer".into(),
                location: "Lisbon".into(),
                email: "jane@example.com".into(),
                phone: "+351 123".into(),
                about: "Ships reliable services.".into(),
            },
            skills: "Rust, SQL, Rust, Kafka".into(),
            ..Default::default()
        };
        doc.education.push(EducationEntry {
            institution: "IST".into(),
            degree: "MSc".into(),
            field_of_study: "Computer Science".into(),
            start_date: "2015".into(),
            end_date: "2017".into(),
            grade: Some("18/20".into()),
            description: None,
        });
        doc.experience.push(ExperienceEntry {
            position: "Engineer".into(),
            company: "Acme".into(),
            start_date: "2018".into(),
            end_date: "".into(),
            description: None,
        });
        doc.projects.push(ProjectEntry {
            title: "queue-rs".into(),
            description: "A durable queue".into(),
            technologies: None,
            url: Some("https://example.com/q".into()),
        });
        doc
    }

    fn palette() -> Palette {
        Palette::new(find_template(1).unwrap(), Theme::Light)
    }

    #[test]
    fn test_date_range_variants() {
        assert_eq!(date_range("2015", "2017"), "2015 - 2017");
        assert_eq!(date_range("2018", " "), "2018");
        assert_eq!(date_range("", "2020"), "2020");
        assert_eq!(date_range("", ""), "");
    }

    #[test]
    fn test_ordered_skills_keeps_input_order() {
        assert_eq!(ordered_skills("Rust, SQL, Rust, , Kafka"), vec!["Rust", "SQL", "Kafka"]);
    }

    #[test]
    fn test_classic_contains_all_sections() {
        let texts = classic(&make_doc(), &palette()).texts().join("\n");
        for expected in [
            "Jane Doe",
            "EXPERIENCE",
            "EDUCATION",
            "PROJECTS",
            "SKILLS",
            "MSc in Computer Science",
            "Grade: 18/20",
            "https://example.com/q",
        ] {
            assert!(texts.contains(expected), "missing {expected:?} in\n{texts}");
        }
    }

    #[test]
    fn test_empty_document_renders_without_sections() {
        let doc = ResumeDocument::default();
        let tree = classic(&doc, &palette());
        assert!(tree.texts().is_empty());
    }

    #[test]
    fn test_missing_optional_fields_are_skipped() {
        let mut doc = make_doc();
        doc.projects = Default::default();
        let texts = minimal(&doc, &palette()).texts().join("\n");
        assert!(!texts.contains("Projects"));
        assert!(!texts.contains("Technologies"));
    }

    #[test]
    fn test_timeline_puts_dates_in_gutter() {
        let tree = timeline(&make_doc(), &palette());
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains("\"kind\":\"row\""));
        assert!(tree.texts().contains(&"2015 - 2017"));
    }

    #[test]
    fn test_dark_palette_differs_from_light() {
        let spec = find_template(2).unwrap();
        let light = Palette::new(spec, Theme::Light);
        let dark = Palette::new(spec, Theme::Dark);
        assert_eq!(light.page, Rgb::WHITE);
        assert_eq!(dark.page, DARK_PAGE);
        assert_ne!(light.ink, dark.ink);
    }
}
