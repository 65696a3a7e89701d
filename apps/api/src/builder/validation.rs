//! Field validators gating forward navigation through the wizard.
//!
//! Each gated step has its own schema. Validators run only when the user tries to
//! advance, never on individual edits, and produce one message per failing field.
//! Failures are data (a `FieldErrors` map), not errors.

use std::collections::BTreeMap;

use crate::builder::wizard::Step;
use crate::models::resume::{EducationEntry, EntryList, ExperienceEntry, PersonalInfo, ResumeDocument};

/// Field key → human-readable message. Entry fields are keyed `section.<index>.<field>`.
pub type FieldErrors = BTreeMap<String, String>;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn required(field: &str) -> String {
    format!("{} is required", label(field))
}

/// Accepts `local@domain.tld`: exactly one `@`, no whitespace, non-empty local part,
/// and a domain of at least two non-empty dot-separated labels.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

pub fn validate_personal(info: &PersonalInfo) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, value) in info.fields() {
        if is_blank(value) {
            errors.insert(field.to_string(), required(field));
        }
    }
    if !is_blank(&info.email) && !is_valid_email(&info.email) {
        errors.insert(
            "email".to_string(),
            "Enter a valid email address".to_string(),
        );
    }
    errors
}

/// Checks the required fields of every entry; each entry is judged on its own.
fn validate_entries<T>(
    section: &str,
    list: &EntryList<T>,
    required_fields: fn(&T) -> Vec<(&'static str, &str)>,
    errors: &mut FieldErrors,
) {
    for (index, entry) in list.values().enumerate() {
        for (field, value) in required_fields(entry) {
            if is_blank(value) {
                errors.insert(format!("{section}.{index}.{field}"), required(field));
            }
        }
    }
}

fn education_required(e: &EducationEntry) -> Vec<(&'static str, &str)> {
    vec![
        ("institution", e.institution.as_str()),
        ("degree", e.degree.as_str()),
        ("field_of_study", e.field_of_study.as_str()),
        ("start_date", e.start_date.as_str()),
        ("end_date", e.end_date.as_str()),
    ]
}

fn experience_required(e: &ExperienceEntry) -> Vec<(&'static str, &str)> {
    vec![
        ("position", e.position.as_str()),
        ("company", e.company.as_str()),
        ("start_date", e.start_date.as_str()),
        ("end_date", e.end_date.as_str()),
    ]
}

pub fn validate_education(list: &EntryList<EducationEntry>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_entries("education", list, education_required, &mut errors);
    errors
}

pub fn validate_experience(list: &EntryList<ExperienceEntry>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_entries("experience", list, experience_required, &mut errors);
    errors
}

pub fn validate_skills(skills: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if is_blank(skills) {
        errors.insert(
            "skills".to_string(),
            "Add at least one skill".to_string(),
        );
    }
    errors
}

/// Runs the validator registered for `step`. Ungated steps always pass.
pub fn validate_step(step: Step, doc: &ResumeDocument) -> FieldErrors {
    match step {
        Step::PersonalInfo => validate_personal(&doc.personal),
        Step::Education => validate_education(&doc.education),
        Step::Experience => validate_experience(&doc.experience),
        Step::Skills => validate_skills(&doc.skills),
        Step::Projects | Step::Template | Step::Preview => FieldErrors::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ProjectEntry;

    fn make_personal() -> PersonalInfo {
        PersonalInfo {
            name: "Jane Doe".into(),
            title: "Engineer".into(),
            location: "Berlin".into(),
            email: "jane@example.com".into(),
            phone: "+49 30 1234".into(),
            about: "Builds things".into(),
        }
    }

    fn make_education() -> EducationEntry {
        EducationEntry {
            institution: "TU Berlin".into(),
            degree: "BSc".into(),
            field_of_study: "Informatics".into(),
            start_date: "2014".into(),
            end_date: "2017".into(),
            grade: None,
            description: None,
        }
    }

    #[test]
    fn test_valid_emails() {
        for email in ["a@b.co", "jane.doe+cv@mail.example.org", " jane@example.com "] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "not-an-email",
            "@example.com",
            "jane@",
            "jane@example",
            "jane@@example.com",
            "jane@exa mple.com",
            "jane@example..com",
            "jane@.com",
        ] {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn test_complete_personal_passes() {
        assert!(validate_personal(&make_personal()).is_empty());
    }

    #[test]
    fn test_each_empty_personal_field_reported() {
        let errors = validate_personal(&PersonalInfo::default());
        assert_eq!(errors.len(), 6);
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["about"], "About is required");
    }

    #[test]
    fn test_malformed_email_reported_once() {
        let mut p = make_personal();
        p.email = "not-an-email".into();
        let errors = validate_personal(&p);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["email"], "Enter a valid email address");
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let mut p = make_personal();
        p.phone = "   ".into();
        assert!(validate_personal(&p).contains_key("phone"));
    }

    #[test]
    fn test_education_errors_keyed_by_index() {
        let mut list = EntryList::default();
        list.push(make_education());
        list.push(EducationEntry {
            degree: "".into(),
            end_date: "".into(),
            ..make_education()
        });
        let errors = validate_education(&list);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["education.1.degree"], "Degree is required");
        assert_eq!(errors["education.1.end_date"], "End date is required");
    }

    #[test]
    fn test_optional_education_fields_not_required() {
        let mut list = EntryList::default();
        list.push(make_education());
        assert!(validate_education(&list).is_empty());
    }

    #[test]
    fn test_blank_education_entry_reports_five_fields() {
        let mut list: EntryList<EducationEntry> = EntryList::default();
        list.add_blank();
        let errors = validate_education(&list);
        assert_eq!(errors.len(), 5);
        assert!(errors.contains_key("education.0.field_of_study"));
    }

    #[test]
    fn test_experience_blank_entry_reports_four_fields() {
        let mut list: EntryList<ExperienceEntry> = EntryList::default();
        list.add_blank();
        let errors = validate_experience(&list);
        let keys: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "experience.0.company",
                "experience.0.end_date",
                "experience.0.position",
                "experience.0.start_date",
            ]
        );
    }

    #[test]
    fn test_empty_lists_pass() {
        assert!(validate_education(&EntryList::default()).is_empty());
        assert!(validate_experience(&EntryList::default()).is_empty());
    }

    #[test]
    fn test_skills_required() {
        assert!(validate_skills("  ").contains_key("skills"));
        assert!(validate_skills("Rust").is_empty());
    }

    #[test]
    fn test_projects_step_never_gated() {
        let mut doc = ResumeDocument::default();
        doc.projects.push(ProjectEntry::default());
        assert!(validate_step(Step::Projects, &doc).is_empty());
        assert!(validate_step(Step::Template, &doc).is_empty());
        assert!(validate_step(Step::Preview, &doc).is_empty());
    }

    #[test]
    fn test_label_formatting() {
        assert_eq!(label("field_of_study"), "Field of study");
        assert_eq!(label("name"), "Name");
    }
}
