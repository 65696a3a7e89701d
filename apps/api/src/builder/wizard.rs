//! Step Controller: the builder's linear wizard as an explicit state machine.
//!
//! # Transitions
//! ```text
//! (step, Advance(Valid))   -> step + 1   (saturates at Preview)
//! (step, Advance(Invalid)) -> step
//! (step, Retreat)          -> step - 1   (floors at PersonalInfo)
//! ```
//! There is no jump. Template selection and export do not move the wizard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::builder::score::{estimate_score, ScoreBreakdown};
use crate::builder::validation::{validate_step, FieldErrors};
use crate::models::resume::{EntryKey, PersonalInfo, ResumeDocument, Section};
use crate::templates::catalog::{find_template, DEFAULT_TEMPLATE_ID};
use crate::templates::registry::{RenderedPreview, TemplateRegistry};
use crate::templates::tree::Theme;

// ────────────────────────────────────────────────────────────────────────────
// States and events
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PersonalInfo,
    Education,
    Experience,
    /// Optional; never gated.
    Projects,
    Skills,
    Template,
    Preview,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::PersonalInfo,
        Step::Education,
        Step::Experience,
        Step::Projects,
        Step::Skills,
        Step::Template,
        Step::Preview,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Step::from_index)
    }
}

/// Result of running a step's validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Advance(Verdict),
    Retreat,
}

/// The complete transition table.
pub fn transition(step: Step, event: Event) -> Step {
    match event {
        Event::Advance(Verdict::Valid) => step.next().unwrap_or(step),
        Event::Advance(Verdict::Invalid) => step,
        Event::Retreat => step.prev().unwrap_or(step),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors and outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("operation requires the {expected:?} step but the wizard is on {actual:?}")]
    WrongStep { expected: Step, actual: Step },

    #[error("no {section} entry with key {key}")]
    UnknownEntry { section: &'static str, key: EntryKey },

    #[error("{section} entries have no field '{field}'")]
    UnknownField { section: &'static str, field: String },

    #[error("unknown template id {0}")]
    UnknownTemplate(u8),
}

/// Returned by `advance`. A failed validation is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub advanced: bool,
    pub step: Step,
    pub errors: FieldErrors,
}

// ────────────────────────────────────────────────────────────────────────────
// Wizard
// ────────────────────────────────────────────────────────────────────────────

/// One user's resume-building session: document, position and per-step errors.
#[derive(Debug, Clone)]
pub struct Wizard {
    document: ResumeDocument,
    step: Step,
    template_id: u8,
    errors: BTreeMap<Step, FieldErrors>,
    exporting: bool,
    exported: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            document: ResumeDocument::default(),
            step: Step::PersonalInfo,
            template_id: DEFAULT_TEMPLATE_ID,
            errors: BTreeMap::new(),
            exporting: false,
            exported: false,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn template_id(&self) -> u8 {
        self.template_id
    }

    pub fn errors(&self) -> &BTreeMap<Step, FieldErrors> {
        &self.errors
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn score(&self) -> ScoreBreakdown {
        estimate_score(&self.document)
    }

    // ── navigation ──────────────────────────────────────────────────────────

    /// Validates the current step and moves forward on success.
    ///
    /// On failure the step's error map is replaced and the wizard stays put. On
    /// success the step's errors are cleared. At the last step nothing happens.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.step.next().is_none() {
            return AdvanceOutcome {
                advanced: false,
                step: self.step,
                errors: FieldErrors::new(),
            };
        }

        let errors = validate_step(self.step, &self.document);
        let verdict = if errors.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid
        };

        let from = self.step;
        self.step = transition(from, Event::Advance(verdict));
        match verdict {
            Verdict::Valid => {
                self.errors.remove(&from);
            }
            Verdict::Invalid => {
                self.errors.insert(from, errors.clone());
            }
        }
        debug!(?from, to = ?self.step, ?verdict, "wizard advance");

        AdvanceOutcome {
            advanced: verdict == Verdict::Valid,
            step: self.step,
            errors,
        }
    }

    /// Moves back one step without validating. Error maps are left untouched.
    pub fn retreat(&mut self) -> Step {
        self.step = transition(self.step, Event::Retreat);
        self.step
    }

    // ── document edits ──────────────────────────────────────────────────────

    pub fn set_personal(&mut self, personal: PersonalInfo) {
        self.document.personal = personal;
    }

    pub fn set_skills(&mut self, skills: String) {
        self.document.skills = skills;
    }

    pub fn add_entry(&mut self, section: Section) -> EntryKey {
        self.document.add_entry(section)
    }

    pub fn update_entry(
        &mut self,
        section: Section,
        key: EntryKey,
        field: &str,
        value: String,
    ) -> Result<(), WizardError> {
        let found = self
            .document
            .update_entry(section, key, field, value)
            .map_err(|e| WizardError::UnknownField {
                section: section.as_str(),
                field: e.0,
            })?;
        if found {
            Ok(())
        } else {
            Err(WizardError::UnknownEntry {
                section: section.as_str(),
                key,
            })
        }
    }

    pub fn remove_entry(&mut self, section: Section, key: EntryKey) -> Result<(), WizardError> {
        if self.document.remove_entry(section, key) {
            Ok(())
        } else {
            Err(WizardError::UnknownEntry {
                section: section.as_str(),
                key,
            })
        }
    }

    // ── template & export ───────────────────────────────────────────────────

    fn require_step(&self, expected: Step) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Only legal on the template step. Does not move the wizard or touch the document.
    pub fn select_template(&mut self, id: u8) -> Result<(), WizardError> {
        self.require_step(Step::Template)?;
        find_template(id).ok_or(WizardError::UnknownTemplate(id))?;
        self.template_id = id;
        Ok(())
    }

    pub fn render(&self, registry: &TemplateRegistry, theme: Theme) -> RenderedPreview {
        registry.render(&self.document, self.template_id, theme)
    }

    /// The preview only exists once the wizard reaches the last step.
    pub fn preview_ready(&self) -> bool {
        self.step == Step::Preview
    }

    /// Raises the busy flag. Returns `false` if an export is already running.
    pub fn try_begin_export(&mut self) -> bool {
        if self.exporting {
            return false;
        }
        self.exporting = true;
        true
    }

    /// Clears the busy flag; records a successful export.
    pub fn finish_export(&mut self, succeeded: bool) {
        self.exporting = false;
        if succeeded {
            self.exported = true;
        }
    }
}
