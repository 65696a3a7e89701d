//! Completeness score: a heuristic signal of how filled-in a resume is.
//!
//! Rewards volume of entries, not their quality. Each section's contribution is capped,
//! and the total is clamped to `MAX_SCORE`.

use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeDocument;

pub const MAX_SCORE: u32 = 150;

const PERSONAL_POINTS: u32 = 10;
const EDUCATION_PER_ENTRY: u32 = 20;
const EDUCATION_CAP: u32 = 40;
const EXPERIENCE_PER_ENTRY: u32 = 20;
const EXPERIENCE_CAP: u32 = 60;
const SKILLS_BASE: u32 = 10;
const SKILLS_PER_TOKEN: u32 = 2;
const SKILLS_TOKEN_CAP: u32 = 20;
const PROJECT_PER_ENTRY: u32 = 15;
const PROJECT_CAP: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub personal: u32,
    pub education: u32,
    pub experience: u32,
    pub skills: u32,
    pub projects: u32,
    pub total: u32,
}

fn capped(count: usize, per_entry: u32, cap: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(per_entry)
        .min(cap)
}

pub fn estimate_score(doc: &ResumeDocument) -> ScoreBreakdown {
    let personal = if doc.personal.is_complete() {
        PERSONAL_POINTS
    } else {
        0
    };
    let education = capped(doc.education.len(), EDUCATION_PER_ENTRY, EDUCATION_CAP);
    let experience = capped(doc.experience.len(), EXPERIENCE_PER_ENTRY, EXPERIENCE_CAP);
    let skills = if doc.skills.trim().is_empty() {
        0
    } else {
        SKILLS_BASE + capped(doc.skill_tokens().len(), SKILLS_PER_TOKEN, SKILLS_TOKEN_CAP)
    };
    let projects = capped(doc.projects.len(), PROJECT_PER_ENTRY, PROJECT_CAP);

    let total = (personal + education + experience + skills + projects).min(MAX_SCORE);

    ScoreBreakdown {
        personal,
        education,
        experience,
        skills,
        projects,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry};

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

    fn make_doc(edu: usize, exp: usize, projects: usize, skills: &str) -> ResumeDocument {
        let mut doc = ResumeDocument {
            personal: make_personal(),
            skills: skills.to_string(),
            ..Default::default()
        };
        for i in 0..edu {
            doc.education.push(EducationEntry {
                institution: format!("School {i}"),
                ..Default::default()
            });
        }
        for i in 0..exp {
            doc.experience.push(ExperienceEntry {
                company: format!("Company {i}"),
                ..Default::default()
            });
        }
        for i in 0..projects {
            doc.projects.push(ProjectEntry {
                title: format!("Project {i}"),
                ..Default::default()
            });
        }
        doc
    }

    #[test]
    fn test_empty_document_scores_zero() {
        assert_eq!(estimate_score(&ResumeDocument::default()).total, 0);
    }

    #[test]
    fn test_worked_example() {
        // 10 personal + 20 education + 20 experience + (10 + 2×2) skills + 0 projects
        let score = estimate_score(&make_doc(1, 1, 0, "JavaScript, React"));
        assert_eq!(score.skills, 14);
        assert_eq!(score.total, 64);
    }

    #[test]
    fn test_education_caps_at_forty() {
        assert_eq!(estimate_score(&make_doc(3, 0, 0, "")).education, 40);
    }

    #[test]
    fn test_experience_and_project_caps() {
        let score = estimate_score(&make_doc(0, 5, 9, ""));
        assert_eq!(score.experience, 60);
        assert_eq!(score.projects, 45);
    }

    #[test]
    fn test_skill_token_cap() {
        let many: Vec<String> = (0..30).map(|i| format!("skill{i}")).collect();
        let score = estimate_score(&make_doc(0, 0, 0, &many.join(",")));
        assert_eq!(score.skills, 30);
    }

    #[test]
    fn test_duplicate_skills_count_once() {
        let score = estimate_score(&make_doc(0, 0, 0, "Rust, Rust, rust"));
        assert_eq!(score.skills, 10 + 2 * 2);
    }

    #[test]
    fn test_blank_skills_score_nothing() {
        assert_eq!(estimate_score(&make_doc(0, 0, 0, "   ")).skills, 0);
    }

    #[test]
    fn test_incomplete_personal_scores_nothing() {
        let mut doc = make_doc(0, 0, 0, "");
        doc.personal.about.clear();
        assert_eq!(estimate_score(&doc).personal, 0);
    }

    #[test]
    fn test_total_never_exceeds_max() {
        let many: Vec<String> = (0..30).map(|i| format!("s{i}")).collect();
        let score = estimate_score(&make_doc(10, 10, 10, &many.join(",")));
        assert_eq!(score.total, MAX_SCORE);
    }

    #[test]
    fn test_monotone_in_list_length() {
        let mut previous = 0;
        for n in 0..6 {
            let total = estimate_score(&make_doc(n, n, n, "Rust")).total;
            assert!(total >= previous, "score dropped at n={n}");
            previous = total;
        }
    }

    #[test]
    fn test_reordering_entries_does_not_change_score() {
        let doc = make_doc(2, 3, 2, "Rust, Go");
        let mut reordered = doc.clone();
        let first = reordered.experience.remove_at(0).unwrap();
        reordered.experience.push(first.value);
        let first = reordered.projects.remove_at(0).unwrap();
        reordered.projects.push(first.value);
        assert_eq!(estimate_score(&doc), estimate_score(&reordered));
    }
}
