//! Roster assignment flows built on the shared selection modal.

use crate::api::{ApiClient, Batch, Role, Student};
use crate::config::AppConfig;
use crate::error::{LiveroomError, Result};
use crate::selection::{prompt, Candidate, SelectionController};
use crate::session::SessionContext;
use crate::ui::{toast, MessageSeverity};
use std::collections::BTreeSet;

impl Candidate for Student {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        if let Some(roll) = &self.roll_number {
            fields.push(roll);
        }
        fields
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn detail(&self) -> Option<String> {
        Some(match &self.roll_number {
            Some(roll) => format!("{} · {}", roll, self.email),
            None => self.email.clone(),
        })
    }
}

impl Candidate for Batch {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(subject) = &self.subject {
            fields.push(subject);
        }
        fields
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn detail(&self) -> Option<String> {
        let students = format!(
            "{} student{}",
            self.student_count,
            if self.student_count == 1 { "" } else { "s" }
        );
        Some(match &self.subject {
            Some(subject) => format!("{} · {}", subject, students),
            None => students,
        })
    }
}

/// Candidates plus the ids currently assigned, ready to open in the modal.
pub struct Assignment<C> {
    pub title: String,
    pub candidates: Vec<C>,
    pub current: Vec<String>,
}

impl<C> Assignment<C> {
    /// Whether `ids` differs from what was assigned when loaded.
    pub fn is_change(&self, ids: &[String]) -> bool {
        let before: BTreeSet<&String> = self.current.iter().collect();
        let after: BTreeSet<&String> = ids.iter().collect();
        before != after
    }
}

/// All students, with the batch's members preselected. If the members cannot be
/// loaded the modal opens with nothing selected.
pub async fn load_batch_roster(api: &ApiClient, batch_id: &str) -> Result<Assignment<Student>> {
    let candidates = api.list_students().await?;
    let current = match api.batch_students(batch_id).await {
        Ok(members) => members.into_iter().map(|s| s.id).collect(),
        Err(e) => {
            tracing::warn!(batch = batch_id, error = %e, "Falling back to empty roster");
            toast(
                MessageSeverity::Warning,
                format!("Could not load current members of batch {}: {}", batch_id, e),
            );
            Vec::new()
        }
    };
    Ok(Assignment {
        title: format!("Students in batch {}", batch_id),
        candidates,
        current,
    })
}

/// All batches, with the assessment's target batches preselected.
pub async fn load_assessment_targets(
    api: &ApiClient,
    assessment_id: &str,
) -> Result<Assignment<Batch>> {
    let candidates = api.list_batches().await?;
    let current = match api.assessment_batches(assessment_id).await {
        Ok(batches) => batches.into_iter().map(|b| b.id).collect(),
        Err(e) => {
            tracing::warn!(assessment = assessment_id, error = %e, "Falling back to no target batches");
            toast(
                MessageSeverity::Warning,
                format!(
                    "Could not load batches for assessment {}: {}",
                    assessment_id, e
                ),
            );
            Vec::new()
        }
    };
    Ok(Assignment {
        title: format!("Batches assigned to assessment {}", assessment_id),
        candidates,
        current,
    })
}

/// Open the modal on the terminal. Returns the committed ids, or `None` on cancel.
async fn pick<C>(assignment: &Assignment<C>) -> Result<Option<Vec<String>>>
where
    C: Candidate + Clone + Send + 'static,
{
    if assignment.candidates.is_empty() {
        toast(MessageSeverity::Info, "Nothing to choose from.");
        return Ok(None);
    }

    let title = assignment.title.clone();
    let mut controller =
        SelectionController::open(assignment.candidates.clone(), assignment.current.clone());

    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        prompt::run_modal(&title, &mut controller, stdin.lock(), std::io::stdout())
    })
    .await
    .map_err(|e| LiveroomError::Selection(format!("Selection prompt failed: {}", e)))?
}

pub async fn assign_students(config: &AppConfig, ctx: &SessionContext, batch_id: &str) -> Result<()> {
    ctx.require_role(&[Role::Teacher, Role::Admin])?;
    let api = ctx.api_client(&config.api_url)?;

    let assignment = load_batch_roster(&api, batch_id).await?;
    let Some(ids) = pick(&assignment).await? else {
        toast(MessageSeverity::Info, "Cancelled. Nothing was changed.");
        return Ok(());
    };
    if !assignment.is_change(&ids) {
        toast(MessageSeverity::Info, "No changes to save.");
        return Ok(());
    }

    api.set_batch_students(batch_id, &ids).await?;
    tracing::info!(batch = batch_id, count = ids.len(), "Batch roster updated");
    toast(
        MessageSeverity::Success,
        format!("Batch {} now has {} student(s).", batch_id, ids.len()),
    );
    Ok(())
}

pub async fn assign_batches(
    config: &AppConfig,
    ctx: &SessionContext,
    assessment_id: &str,
) -> Result<()> {
    ctx.require_role(&[Role::Teacher, Role::Admin])?;
    let api = ctx.api_client(&config.api_url)?;

    let assignment = load_assessment_targets(&api, assessment_id).await?;
    let Some(ids) = pick(&assignment).await? else {
        toast(MessageSeverity::Info, "Cancelled. Nothing was changed.");
        return Ok(());
    };
    if !assignment.is_change(&ids) {
        toast(MessageSeverity::Info, "No changes to save.");
        return Ok(());
    }

    api.set_assessment_batches(assessment_id, &ids).await?;
    tracing::info!(assessment = assessment_id, count = ids.len(), "Assessment batches updated");
    toast(
        MessageSeverity::Success,
        format!(
            "Assessment {} is now assigned to {} batch(es).",
            assessment_id,
            ids.len()
        ),
    );
    Ok(())
}
