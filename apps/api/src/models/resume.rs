use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Entry identity
// ────────────────────────────────────────────────────────────────────────────

/// Stable identity of a list entry, assigned when the entry is created.
///
/// Positions shift on removal; keys never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(pub Uuid);

impl EntryKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Raised when a field name does not exist on the addressed entry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

/// Entry types whose fields can be replaced one at a time by name.
pub trait EntryFields: Default {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), UnknownField>;
}

/// Blank optional fields are stored as absent.
fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub about: String,
}

impl PersonalInfo {
    /// `(field name, value)` pairs in form order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("name", self.name.as_str()),
            ("title", self.title.as_str()),
            ("location", self.location.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("about", self.about.as_str()),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|(_, v)| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntryFields for EducationEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), UnknownField> {
        match field {
            "institution" => self.institution = value,
            "degree" => self.degree = value,
            "field_of_study" => self.field_of_study = value,
            "start_date" => self.start_date = value,
            "end_date" => self.end_date = value,
            "grade" => self.grade = optional(value),
            "description" => self.description = optional(value),
            other => return Err(UnknownField(other.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntryFields for ExperienceEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), UnknownField> {
        match field {
            "position" => self.position = value,
            "company" => self.company = value,
            "start_date" => self.start_date = value,
            "end_date" => self.end_date = value,
            "description" => self.description = optional(value),
            other => return Err(UnknownField(other.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EntryFields for ProjectEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), UnknownField> {
        match field {
            "title" => self.title = value,
            "description" => self.description = value,
            "technologies" => self.technologies = optional(value),
            "url" => self.url = optional(value),
            other => return Err(UnknownField(other.to_string())),
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keyed, insertion-ordered list
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub key: EntryKey,
    #[serde(flatten)]
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryList<T> {
    entries: Vec<Keyed<T>>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> EntryList<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyed<T>> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|e| &e.value)
    }

    /// Appends an entry and returns its freshly minted key.
    pub fn push(&mut self, value: T) -> EntryKey {
        let key = EntryKey::new();
        self.entries.push(Keyed { key, value });
        key
    }

    #[cfg(test)]
    pub fn get(&self, key: EntryKey) -> Option<&T> {
        self.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: EntryKey) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.value)
    }

    pub fn position(&self, key: EntryKey) -> Option<usize> {
        self.iter().position(|e| e.key == key)
    }

    /// Removes the entry with `key`; later entries shift down one position.
    pub fn remove(&mut self, key: EntryKey) -> Option<T> {
        let index = self.position(key)?;
        self.remove_at(index).map(|e| e.value)
    }

    /// Positional removal. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<Keyed<T>> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }
}

impl<T: EntryFields> EntryList<T> {
    pub fn add_blank(&mut self) -> EntryKey {
        self.push(T::default())
    }

    /// Replaces one field of one entry. `Ok(false)` when the key is unknown.
    pub fn update(
        &mut self,
        key: EntryKey,
        field: &str,
        value: String,
    ) -> Result<bool, UnknownField> {
        match self.get_mut(key) {
            Some(entry) => entry.set_field(field, value).map(|_| true),
            None => Ok(false),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// The list-valued sections of a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Education,
    Experience,
    Projects,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Projects => "projects",
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(Section::Education),
            "experience" => Ok(Section::Experience),
            "projects" => Ok(Section::Projects),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

/// In-memory resume being edited in a builder session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub personal: PersonalInfo,
    pub education: EntryList<EducationEntry>,
    pub experience: EntryList<ExperienceEntry>,
    pub projects: EntryList<ProjectEntry>,
    pub skills: String,
}

impl ResumeDocument {
    pub fn add_entry(&mut self, section: Section) -> EntryKey {
        match section {
            Section::Education => self.education.add_blank(),
            Section::Experience => self.experience.add_blank(),
            Section::Projects => self.projects.add_blank(),
        }
    }

    pub fn update_entry(
        &mut self,
        section: Section,
        key: EntryKey,
        field: &str,
        value: String,
    ) -> Result<bool, UnknownField> {
        match section {
            Section::Education => self.education.update(key, field, value),
            Section::Experience => self.experience.update(key, field, value),
            Section::Projects => self.projects.update(key, field, value),
        }
    }

    /// Returns whether an entry was removed.
    pub fn remove_entry(&mut self, section: Section, key: EntryKey) -> bool {
        match section {
            Section::Education => self.education.remove(key).is_some(),
            Section::Experience => self.experience.remove(key).is_some(),
            Section::Projects => self.projects.remove(key).is_some(),
        }
    }

    /// Distinct trimmed skill tokens, ignoring empty segments.
    pub fn skill_tokens(&self) -> BTreeSet<&str> {
        parse_skills(&self.skills)
    }
}

pub fn parse_skills(raw: &str) -> BTreeSet<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(titles: &[&str]) -> EntryList<ProjectEntry> {
        let mut list = EntryList::default();
        for t in titles {
            list.push(ProjectEntry {
                title: t.to_string(),
                ..Default::default()
            });
        }
        list
    }

    fn titles(list: &EntryList<ProjectEntry>) -> Vec<String> {
        list.values().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_add_blank_appends_in_order() {
        let mut doc = ResumeDocument::default();
        let a = doc.add_entry(Section::Education);
        let b = doc.add_entry(Section::Education);
        assert_ne!(a, b);
        assert_eq!(doc.education.position(a), Some(0));
        assert_eq!(doc.education.position(b), Some(1));
        assert_eq!(doc.education.get(a), Some(&EducationEntry::default()));
    }

    #[test]
    fn test_remove_at_shifts_following_entries() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        let removed = list.remove_at(1).map(|e| e.value.title);
        assert_eq!(removed.as_deref(), Some("b"));
        assert_eq!(titles(&list), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_remove_at_out_of_range_is_noop() {
        let mut list = list_of(&["a"]);
        assert!(list.remove_at(3).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_by_key_keeps_other_keys_stable() {
        let mut list = list_of(&["a", "b", "c"]);
        let keys: Vec<EntryKey> = list.iter().map(|e| e.key).collect();
        assert_eq!(list.remove(keys[0]).map(|p| p.title).as_deref(), Some("a"));
        assert_eq!(list.get(keys[1]).map(|p| p.title.as_str()), Some("b"));
        assert_eq!(list.position(keys[2]), Some(1));
        assert!(list.remove(keys[0]).is_none());
    }

    #[test]
    fn test_update_single_field() {
        let mut doc = ResumeDocument::default();
        let key = doc.add_entry(Section::Experience);
        let updated = doc
            .update_entry(Section::Experience, key, "company", "Acme".to_string())
            .unwrap();
        assert!(updated);
        let entry = doc.experience.get(key).unwrap();
        assert_eq!(entry.company, "Acme");
        assert!(entry.position.is_empty());
    }

    #[test]
    fn test_update_unknown_key_reports_false() {
        let mut doc = ResumeDocument::default();
        let updated = doc
            .update_entry(Section::Projects, EntryKey::new(), "title", "x".to_string())
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_update_unknown_field_is_error() {
        let mut doc = ResumeDocument::default();
        let key = doc.add_entry(Section::Education);
        let err = doc
            .update_entry(Section::Education, key, "gpa", "4.0".to_string())
            .unwrap_err();
        assert_eq!(err, UnknownField("gpa".to_string()));
    }

    #[test]
    fn test_blank_optional_field_becomes_absent() {
        let mut entry = EducationEntry::default();
        entry.set_field("grade", "A".to_string()).unwrap();
        assert_eq!(entry.grade.as_deref(), Some("A"));
        entry.set_field("grade", "   ".to_string()).unwrap();
        assert!(entry.grade.is_none());
    }

    #[test]
    fn test_skill_tokens_trimmed_and_deduplicated() {
        let doc = ResumeDocument {
            skills: " Rust, SQL ,, Rust,Go ".to_string(),
            ..Default::default()
        };
        let tokens: Vec<&str> = doc.skill_tokens().into_iter().collect();
        assert_eq!(tokens, vec!["Go", "Rust", "SQL"]);
    }

    #[test]
    fn test_personal_completeness() {
        let mut p = PersonalInfo {
            name: "Jane Doe".into(),
            title: "Engineer".into(),
            location: "Berlin".into(),
            email: "jane@example.com".into(),
            phone: "+49 30 1234".into(),
            about: "Builds things".into(),
        };
        assert!(p.is_complete());
        p.phone = "  ".into();
        assert!(!p.is_complete());
    }

    #[test]
    fn test_entry_list_serializes_key_inline() {
        let list = list_of(&["a"]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json[0]["key"].is_string());
        assert_eq!(json[0]["title"], "a");
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("projects".parse::<Section>(), Ok(Section::Projects));
        assert!("skills".parse::<Section>().is_err());
    }
}
