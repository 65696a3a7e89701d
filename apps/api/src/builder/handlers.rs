//! Axum route handlers for the builder API.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::builder::score::{ScoreBreakdown, MAX_SCORE};
use crate::builder::session::Session;
use crate::builder::validation::FieldErrors;
use crate::builder::wizard::{AdvanceOutcome, Step, Wizard};
use crate::errors::AppError;
use crate::export::{content_disposition, export_session};
use crate::extract::{AppJson, AppPath};
use crate::models::resume::{EntryKey, PersonalInfo, ResumeDocument, Section};
use crate::state::AppState;
use crate::templates::{RenderedPreview, TemplateSpec, Theme, DEFAULT_TEMPLATE_ID};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Everything a client needs to draw the builder for one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub document: ResumeDocument,
    pub step: Step,
    pub step_index: usize,
    pub step_count: usize,
    pub errors: BTreeMap<Step, FieldErrors>,
    pub score: ScoreBreakdown,
    pub max_score: u32,
    pub template_id: u8,
    pub preview_ready: bool,
    pub exporting: bool,
    pub exported: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    fn new(id: Uuid, session: &Session) -> Self {
        let wizard = &session.wizard;
        Self {
            id,
            document: wizard.document().clone(),
            step: wizard.step(),
            step_index: wizard.step().index(),
            step_count: Step::ALL.len(),
            errors: wizard.errors().clone(),
            score: wizard.score(),
            max_score: MAX_SCORE,
            template_id: wizard.template_id(),
            preview_ready: wizard.preview_ready(),
            exporting: wizard.is_exporting(),
            exported: wizard.is_exported(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    #[serde(flatten)]
    pub spec: &'static TemplateSpec,
    pub has_layout: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub default_template_id: u8,
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub skills: String,
}

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub key: EntryKey,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub outcome: AdvanceOutcome,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template_id: u8,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub theme: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Applies `f` to the session's wizard and snapshots the result under the same lock.
async fn mutate<T>(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut Wizard) -> T,
) -> Result<(T, SessionView), AppError> {
    state
        .sessions
        .update_session(id, |session| {
            let out = f(&mut session.wizard);
            (out, SessionView::new(id, session))
        })
        .await
}

fn parse_section(raw: &str) -> Result<Section, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn parse_key(raw: &str) -> Result<EntryKey, AppError> {
    raw.parse::<Uuid>()
        .map(EntryKey)
        .map_err(|_| AppError::Validation(format!("'{raw}' is not a valid entry key")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    let templates = state
        .templates
        .catalog()
        .into_iter()
        .map(|(spec, has_layout)| TemplateSummary { spec, has_layout })
        .collect();
    Json(TemplatesResponse {
        default_template_id: DEFAULT_TEMPLATE_ID,
        templates,
    })
}

/// POST /api/v1/builder/sessions
///
/// Starts a session with an empty document on the first step.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let id = state.sessions.create().await?;
    let view = state
        .sessions
        .read(id, |session| SessionView::new(id, session))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/builder/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .read(id, |session| SessionView::new(id, session))
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/builder/sessions/:id
///
/// Leaving the builder discards everything; there is no persistence.
pub async fn handle_discard_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.discard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/builder/sessions/:id/personal
pub async fn handle_set_personal(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(personal): AppJson<PersonalInfo>,
) -> Result<Json<SessionView>, AppError> {
    let ((), view) = mutate(&state, id, |w| w.set_personal(personal)).await?;
    Ok(Json(view))
}

/// PUT /api/v1/builder/sessions/:id/skills
pub async fn handle_set_skills(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<SkillsRequest>,
) -> Result<Json<SessionView>, AppError> {
    let ((), view) = mutate(&state, id, |w| w.set_skills(request.skills)).await?;
    Ok(Json(view))
}

/// POST /api/v1/builder/sessions/:id/:section
///
/// Appends a blank entry and returns its key.
pub async fn handle_add_entry(
    State(state): State<AppState>,
    AppPath((id, section)): AppPath<(Uuid, String)>,
) -> Result<(StatusCode, Json<AddEntryResponse>), AppError> {
    let section = parse_section(&section)?;
    let (key, session) = mutate(&state, id, |w| w.add_entry(section)).await?;
    Ok((StatusCode::CREATED, Json(AddEntryResponse { key, session })))
}

/// PATCH /api/v1/builder/sessions/:id/:section/:key
pub async fn handle_update_entry(
    State(state): State<AppState>,
    AppPath((id, section, key)): AppPath<(Uuid, String, String)>,
    AppJson(request): AppJson<UpdateFieldRequest>,
) -> Result<Json<SessionView>, AppError> {
    let section = parse_section(&section)?;
    let key = parse_key(&key)?;
    let (result, view) = mutate(&state, id, |w| {
        w.update_entry(section, key, &request.field, request.value)
    })
    .await?;
    result?;
    Ok(Json(view))
}

/// DELETE /api/v1/builder/sessions/:id/:section/:key
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    AppPath((id, section, key)): AppPath<(Uuid, String, String)>,
) -> Result<Json<SessionView>, AppError> {
    let section = parse_section(&section)?;
    let key = parse_key(&key)?;
    let (result, view) = mutate(&state, id, |w| w.remove_entry(section, key)).await?;
    result?;
    Ok(Json(view))
}

/// POST /api/v1/builder/sessions/:id/advance
///
/// A failed validation is still 200: the outcome carries `advanced: false` and the
/// field errors for the current step.
pub async fn handle_advance(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let (outcome, session) = mutate(&state, id, Wizard::advance).await?;
    Ok(Json(AdvanceResponse { outcome, session }))
}

/// POST /api/v1/builder/sessions/:id/retreat
pub async fn handle_retreat(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let (_, view) = mutate(&state, id, Wizard::retreat).await?;
    Ok(Json(view))
}

/// PUT /api/v1/builder/sessions/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<SelectTemplateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let (result, view) = mutate(&state, id, |w| w.select_template(request.template_id)).await?;
    result?;
    Ok(Json(view))
}

/// GET /api/v1/builder/sessions/:id/preview?theme=light|dark
///
/// Renders the current document with the selected template at any step; the
/// template step uses this for its live preview.
pub async fn handle_preview(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<RenderedPreview>, AppError> {
    let theme = match query.theme.as_deref() {
        None => state.config.default_theme,
        Some(raw) => raw.parse::<Theme>().map_err(AppError::Validation)?,
    };
    let templates = state.templates.clone();
    let preview = state
        .sessions
        .read(id, |session| session.wizard.render(&templates, theme))
        .await?;
    Ok(Json(preview))
}

/// POST /api/v1/builder/sessions/:id/export
///
/// Returns the PDF as an attachment named after the person, or `resume.pdf`.
pub async fn handle_export(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let file = export_session(&state.sessions, &state.templates, &state.exporter, id).await?;
    let disposition = HeaderValue::from_str(&content_disposition(&file.file_name))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
