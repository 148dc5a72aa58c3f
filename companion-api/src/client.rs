//! HTTP client for the CareCompanion backend.
//!
//! Thin and deliberately dumb: one method per endpoint, single attempt, no
//! retries; the caller refetches after every mutation instead of patching
//! local state. Write routing (occurrence vs. series, materialize-first)
//! lives in `companion-core::write_target`; this crate only drives it.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use companion_core::{
    EditScope, Medication, MedicationScheduleEntry, Task, WriteTarget, resolve_complete_target,
    resolve_write_target,
};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{
    CompleteRequest, DoseLogRequest, MaterializeRequest, MedicationsEnvelope, ScheduleEnvelope,
    TaskEnvelope, TaskPatch, TasksEnvelope,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("{method} {path}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("backend error on {method} {path}: {status} {txt}");
        }

        resp.json::<T>()
            .await
            .with_context(|| format!("parse response of {method} {path}"))
    }

    /// Like [`Self::send`] for endpoints whose response body carries nothing
    /// we need (delete, dose log).
    async fn send_unit<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("{method} {path}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("backend error on {method} {path}: {status} {txt}");
        }
        Ok(())
    }

    /// Tasks in `[start, end]`, optionally with virtual occurrences the
    /// backend projects from recurrence templates.
    pub async fn fetch_care_tasks(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_virtual: bool,
    ) -> Result<Vec<Task>> {
        let path = format!(
            "/api/v1/care-tasks?startDate={start}&endDate={end}&includeVirtual={include_virtual}"
        );
        let env: TasksEnvelope = self.send(Method::GET, &path, None::<&()>).await?;
        Ok(env.tasks)
    }

    /// Turn one virtual occurrence into a concrete task. Returns the new
    /// record, whose id replaces the virtual id for any follow-up write.
    pub async fn materialize_task(&self, template_id: &str, virtual_date: &str) -> Result<Task> {
        let body = MaterializeRequest {
            virtual_date: virtual_date.to_string(),
        };
        let env: TaskEnvelope = self
            .send(
                Method::POST,
                &format!("/api/v1/care-tasks/{template_id}/materialize"),
                Some(&body),
            )
            .await?;
        Ok(env.task)
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let env: TaskEnvelope = self
            .send(Method::PUT, &format!("/api/v1/care-tasks/{id}"), Some(patch))
            .await?;
        Ok(env.task)
    }

    pub async fn update_series(&self, template_id: &str, patch: &TaskPatch) -> Result<Task> {
        let env: TaskEnvelope = self
            .send(
                Method::PUT,
                &format!("/api/v1/care-tasks/{template_id}/series"),
                Some(patch),
            )
            .await?;
        Ok(env.task)
    }

    pub async fn complete_task(&self, id: &str, notes: Option<&str>) -> Result<Task> {
        let body = CompleteRequest {
            notes: notes.map(str::to_string),
        };
        let env: TaskEnvelope = self
            .send(
                Method::POST,
                &format!("/api/v1/care-tasks/{id}/complete"),
                Some(&body),
            )
            .await?;
        Ok(env.task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.send_unit(
            Method::DELETE,
            &format!("/api/v1/care-tasks/{id}"),
            None::<&()>,
        )
        .await
    }

    pub async fn todays_medication_schedule(
        &self,
        patient_id: &str,
    ) -> Result<Vec<MedicationScheduleEntry>> {
        let env: ScheduleEnvelope = self
            .send(
                Method::GET,
                &format!("/api/v1/patients/{patient_id}/medications/today"),
                None::<&()>,
            )
            .await?;
        Ok(env.schedule)
    }

    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        let env: MedicationsEnvelope = self
            .send(
                Method::GET,
                "/api/v1/medications?includeSchedules=true",
                None::<&()>,
            )
            .await?;
        Ok(env.medications)
    }

    pub async fn log_dose(&self, medication_id: &str, log: &DoseLogRequest) -> Result<()> {
        self.send_unit(
            Method::POST,
            &format!("/api/v1/medications/{medication_id}/log"),
            Some(log),
        )
        .await
    }

    /// Apply `patch` to an occurrence or its series, materializing a virtual
    /// occurrence first when the scope demands it.
    ///
    /// A failed materialization propagates as-is; falling back to editing
    /// the template would silently touch unrelated occurrences.
    pub async fn apply_write(&self, occurrence: &Task, scope: EditScope, patch: &TaskPatch) -> Result<Task> {
        match (scope, resolve_write_target(occurrence, scope)) {
            (EditScope::Series, target) => self.update_series(target.target_id(), patch).await,
            (EditScope::Occurrence, WriteTarget::Direct { id }) => {
                self.update_task(&id, patch).await
            }
            (
                EditScope::Occurrence,
                WriteTarget::MaterializeThenWrite {
                    template_id,
                    virtual_date,
                },
            ) => {
                let concrete = self
                    .materialize_task(&template_id, &virtual_date)
                    .await
                    .with_context(|| {
                        format!("materializing occurrence {virtual_date} of {template_id}")
                    })?;
                self.update_task(&concrete.id, patch).await
            }
        }
    }

    /// Complete a single occurrence (never the series), materializing first
    /// when virtual.
    pub async fn complete_occurrence(&self, occurrence: &Task, notes: Option<&str>) -> Result<Task> {
        match resolve_complete_target(occurrence) {
            WriteTarget::Direct { id } => self.complete_task(&id, notes).await,
            WriteTarget::MaterializeThenWrite {
                template_id,
                virtual_date,
            } => {
                let concrete = self
                    .materialize_task(&template_id, &virtual_date)
                    .await
                    .with_context(|| {
                        format!("materializing occurrence {virtual_date} of {template_id}")
                    })?;
                self.complete_task(&concrete.id, notes).await
            }
        }
    }

    /// Delete a single occurrence. A virtual occurrence must be materialized
    /// before the backend has anything to delete.
    pub async fn delete_occurrence(&self, occurrence: &Task) -> Result<()> {
        match resolve_write_target(occurrence, EditScope::Occurrence) {
            WriteTarget::Direct { id } => self.delete_task(&id).await,
            WriteTarget::MaterializeThenWrite {
                template_id,
                virtual_date,
            } => {
                let concrete = self
                    .materialize_task(&template_id, &virtual_date)
                    .await
                    .with_context(|| {
                        format!("materializing occurrence {virtual_date} of {template_id}")
                    })?;
                self.delete_task(&concrete.id).await
            }
        }
    }
}
