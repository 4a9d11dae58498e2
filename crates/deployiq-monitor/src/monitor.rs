//! BuildMonitor: the per-deployment state machine.
//!
//! `start → in_progress(phase 1..7) → success | failed | rolled_back`.
//! Terminal attempts leave the active set; the only write after that is the
//! learning stamp.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use deployiq_analyzer::{BuildAnalyzer, FsProjectSource};
use deployiq_core::config::MonitorConfig;
use deployiq_core::errors::DeployError;
use deployiq_core::models::{
    distinct_risks, AppliedSolution, AttemptUpdate, DeploymentAttempt, DeploymentOutcome,
    DeploymentPhase, DeploymentStatus, ErrorRecord,
};
use deployiq_core::monitor_span;
use deployiq_core::traits::{IAnalyticsSink, ICommandExecutor, IProjectSource};
use deployiq_memory::DeploymentMemory;
use deployiq_resolver::{ApplyContext, AutoResolver};
use tracing::Instrument;

use crate::active::{ActiveDeployments, TrackedDeployment};
use crate::retry::with_retry;
use crate::types::{
    CompletionMetrics, CompletionReport, DeploymentRequest, DeploymentStatusView, ErrorReport,
    ErrorReportOutcome, PhaseTransition, PhaseUpdate, PredictionBundle,
};

/// A rate above this predicts success.
const SUCCESS_CUTOFF: f64 = 0.5;

pub struct BuildMonitor<E: ICommandExecutor> {
    pub(crate) analyzer: BuildAnalyzer,
    pub(crate) memory: DeploymentMemory,
    pub(crate) resolver: AutoResolver<E>,
    pub(crate) analytics: Arc<dyn IAnalyticsSink>,
    pub(crate) config: MonitorConfig,
    pub(crate) active: ActiveDeployments,
}

impl<E: ICommandExecutor> BuildMonitor<E> {
    pub fn memory(&self) -> &DeploymentMemory {
        &self.memory
    }

    pub fn resolver(&self) -> &AutoResolver<E> {
        &self.resolver
    }

    /// Analyze the checkout at `request.project_root` and begin tracking it.
    ///
    /// `predicted_success_rate` is the history-based rate when the build
    /// pattern bucket has samples. With no history it stays the analyzer's
    /// risk-penalized seed (`max(0.1, 0.5 - 0.1 x risks)`, so 0.4 for an
    /// empty project), not the neutral 0.5 that
    /// `DeploymentMemory::predict_success_rate` reports for the same
    /// unseen configuration.
    pub async fn start_monitoring(
        &self,
        request: DeploymentRequest,
    ) -> Result<PredictionBundle, DeployError> {
        let source = FsProjectSource::open(&request.project_root)?;
        self.start_with_source(request, &source).await
    }

    /// Same as `start_monitoring` with a caller-supplied project source.
    pub async fn start_with_source(
        &self,
        request: DeploymentRequest,
        source: &dyn IProjectSource,
    ) -> Result<PredictionBundle, DeployError> {
        let deployment_id = request
            .deployment_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if self.active.contains(&deployment_id) {
            return Err(DeployError::Internal(format!(
                "deployment {deployment_id} is already being monitored"
            )));
        }
        let span = monitor_span!(deployment_id);

        let mut analysis = self.analyzer.analyze(source)?;
        let prediction = with_retry(&self.config.store_retry, "predict_success_rate", || {
            self.memory.predict_success_rate(&analysis.snapshot)
        })
        .instrument(span.clone())
        .await?;
        // With no history in the bucket the analyzer's static seed stands.
        if prediction.sample_size > 0 {
            analysis.apply_seed(prediction.success_rate);
        }

        let risk_factors = distinct_risks(
            analysis
                .risk_factors
                .iter()
                .chain(prediction.risk_factors.iter())
                .cloned(),
        );
        let mut recommendations = analysis.recommendations.clone();
        for rec in &prediction.recommendations {
            if !recommendations.contains(rec) {
                recommendations.push(rec.clone());
            }
        }

        let mut attempt = DeploymentAttempt::new(deployment_id.clone(), request.environment.clone());
        attempt.status = DeploymentStatus::InProgress;
        attempt.phase = DeploymentPhase::Validation;
        attempt.build_config = analysis.snapshot.clone();
        attempt.config_fingerprint = analysis.fingerprint.clone();
        attempt.risk_factors = risk_factors.clone();
        attempt.predicted_success_rate = analysis.success_seed;
        attempt.confidence = analysis.confidence;

        let stored = with_retry(&self.config.store_retry, "log_attempt", || {
            self.memory.log_attempt(attempt.clone())
        })
        .instrument(span.clone())
        .await?;
        if stored.is_terminal() {
            return Err(DeployError::Internal(format!(
                "deployment {deployment_id} already finished as {}",
                stored.status
            )));
        }

        let tracked = TrackedDeployment {
            attempt: stored,
            working_dir: request.project_root.clone(),
        };
        if !self.active.insert(tracked) {
            return Err(DeployError::Internal(format!(
                "deployment {deployment_id} is already being monitored"
            )));
        }

        span.in_scope(|| {
            tracing::info!(
                environment = %request.environment,
                predicted = analysis.success_seed,
                confidence = analysis.confidence,
                risks = risk_factors.len(),
                "deployment monitoring started"
            )
        });
        self.track(
            "deployment_started",
            json!({
                "deployment_id": deployment_id,
                "environment": request.environment,
                "predicted_success_rate": analysis.success_seed,
                "confidence": analysis.confidence,
                "risk_factors": risk_factors.len(),
            }),
        );

        Ok(PredictionBundle {
            deployment_id,
            fingerprint: analysis.fingerprint,
            predicted_success_rate: analysis.success_seed,
            confidence: analysis.confidence,
            sample_size: prediction.sample_size,
            risk_factors,
            recommendations,
        })
    }

    /// Record an error, look for a known fix, and apply it unattended when
    /// the resolution is confident enough. Never fails: store problems are
    /// logged and the in-memory record stays authoritative.
    pub async fn report_error(&self, deployment_id: &str, report: ErrorReport) -> ErrorReportOutcome {
        let Some(handle) = self.active.handle(deployment_id) else {
            tracing::warn!(deployment_id, "error reported for unknown deployment");
            return ErrorReportOutcome::Ignored;
        };
        let span = monitor_span!(deployment_id);
        let mut tracked = handle.lock().await;
        if tracked.attempt.is_terminal() {
            tracing::warn!(deployment_id, "error reported for finished deployment");
            return ErrorReportOutcome::Ignored;
        }

        let mut record = ErrorRecord::new(report.error_type, report.message);
        record.file = report.file;
        record.line_number = report.line;
        let pattern = record.normalized_pattern.clone();
        tracked.attempt.errors.push(record.clone());
        let error_index = tracked.attempt.errors.len() - 1;

        let resolution = match span.in_scope(|| self.resolver.resolve_error(&record)) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(deployment_id, error = %e, "resolution lookup failed");
                None
            }
        };

        let outcome = match resolution {
            None => ErrorReportOutcome::Recorded {
                error_index,
                pattern,
            },
            Some(resolution) if resolution.confidence <= self.config.auto_apply_confidence_threshold => {
                ErrorReportOutcome::Suggested {
                    error_index,
                    resolution,
                }
            }
            Some(resolution) => {
                let ctx = ApplyContext::new(tracked.working_dir.clone());
                let report = self
                    .resolver
                    .apply_solution(&resolution.solution, &ctx)
                    .instrument(span.clone())
                    .await;
                // A refused solution ran nothing and is not recorded as applied.
                if report.refused.is_none() {
                    let now = Utc::now();
                    tracked.attempt.applied_solutions.push(AppliedSolution {
                        solution_id: resolution.solution.id.clone(),
                        error_pattern: resolution.error_pattern.clone(),
                        applied_at: now,
                        success: report.success,
                        failed_step: report.failed_step(),
                        confidence: resolution.confidence,
                    });
                    if report.success {
                        tracked.attempt.errors[error_index].mark_resolved(now, true);
                    }
                }
                ErrorReportOutcome::AutoApplied {
                    error_index,
                    resolution,
                    report,
                }
            }
        };

        tracked.attempt.updated_at = Utc::now();
        self.persist(&tracked.attempt).instrument(span).await;

        let applied = matches!(&outcome, ErrorReportOutcome::AutoApplied { report, .. } if report.success);
        self.track(
            "deployment_error",
            json!({
                "deployment_id": deployment_id,
                "error_type": report.error_type.as_str(),
                "pattern": tracked.attempt.errors[error_index].normalized_pattern,
                "auto_fixed": applied,
            }),
        );
        outcome
    }

    /// Move a deployment to `phase`. Lower phases are always rejected.
    pub async fn update_phase(
        &self,
        deployment_id: &str,
        phase: DeploymentPhase,
        extra: PhaseUpdate,
    ) -> PhaseTransition {
        let Some(handle) = self.active.handle(deployment_id) else {
            tracing::warn!(deployment_id, "phase update for unknown deployment");
            return PhaseTransition::Unknown;
        };
        let mut tracked = handle.lock().await;
        let current = tracked.attempt.phase;
        if tracked.attempt.is_terminal() || phase < current {
            tracing::warn!(deployment_id, %current, requested = %phase, "phase update rejected");
            return PhaseTransition::Rejected {
                current,
                requested: phase,
            };
        }

        let update = AttemptUpdate {
            phase: Some(phase),
            build_time_seconds: extra.build_time_seconds,
            deploy_time_seconds: extra.deploy_time_seconds,
            ..Default::default()
        };
        tracked.attempt.apply_update(&update, Utc::now());
        self.persist(&tracked.attempt)
            .instrument(monitor_span!(deployment_id))
            .await;

        if phase == current {
            return PhaseTransition::Unchanged;
        }
        tracing::info!(deployment_id, from = %current, to = %phase, "phase advanced");
        self.track(
            "deployment_phase",
            json!({ "deployment_id": deployment_id, "phase": phase.stage_name() }),
        );
        PhaseTransition::Advanced { from: current, to: phase }
    }

    /// Mark a manually fixed error resolved. False for an unknown deployment,
    /// a bad index, or an error already resolved.
    pub async fn mark_error_resolved(&self, deployment_id: &str, error_index: usize) -> bool {
        let Some(handle) = self.active.handle(deployment_id) else {
            tracing::warn!(deployment_id, "resolve for unknown deployment");
            return false;
        };
        let mut tracked = handle.lock().await;
        let now = Utc::now();
        match tracked.attempt.errors.get_mut(error_index) {
            Some(error) if !error.resolved => error.mark_resolved(now, false),
            _ => return false,
        }
        tracked.attempt.updated_at = now;
        self.persist(&tracked.attempt).await;
        true
    }

    /// Close a deployment, learn from it, and drop it from the active set.
    ///
    /// Returns `None` for an unknown id or one already completed, so a
    /// repeated call never learns twice.
    pub async fn complete_deployment(
        &self,
        deployment_id: &str,
        outcome: DeploymentOutcome,
        metrics: CompletionMetrics,
    ) -> Option<CompletionReport> {
        let Some(handle) = self.active.handle(deployment_id) else {
            tracing::warn!(deployment_id, "completion for unknown deployment");
            return None;
        };
        let span = monitor_span!(deployment_id);
        let mut tracked = handle.lock().await;
        if tracked.attempt.is_terminal() {
            tracing::warn!(deployment_id, "deployment already completed");
            return None;
        }

        let now = Utc::now();
        let duration_seconds = metrics.duration_seconds.unwrap_or_else(|| {
            (now - tracked.attempt.started_at).num_milliseconds().max(0) as f64 / 1000.0
        });
        let predicted_success_rate = tracked.attempt.predicted_success_rate;
        let prediction_accuracy = u8::from((predicted_success_rate > SUCCESS_CUTOFF) == outcome.is_success());
        let update = AttemptUpdate {
            status: Some(outcome.into()),
            actual_outcome: Some(outcome),
            prediction_accuracy: Some(prediction_accuracy),
            completed_at: Some(now),
            duration_seconds: Some(duration_seconds),
            build_time_seconds: metrics.build_time_seconds,
            deploy_time_seconds: metrics.deploy_time_seconds,
            ..Default::default()
        };
        tracked.attempt.apply_update(&update, now);

        let persisted = self.persist(&tracked.attempt).instrument(span.clone()).await;
        // Learning reads the stored attempt, so it waits for a stored terminal state.
        let learning = if persisted {
            with_retry(&self.config.store_retry, "learn_from_outcome", || {
                self.memory.learn_from_outcome(deployment_id, outcome)
            })
            .instrument(span.clone())
            .await
            .ok()
        } else {
            tracing::warn!(deployment_id, "terminal state not stored, learning skipped");
            None
        };
        if let Some(stamped) = learning.as_ref().filter(|l| l.applied) {
            tracing::debug!(deployment_id, solutions = stamped.solutions_updated, "learning applied");
            tracked.attempt.learned_at = Some(now);
        }

        let failure_insight = if outcome.is_success() {
            None
        } else {
            match self.memory.failure_insight(&tracked.attempt) {
                Ok(insight) => Some(insight),
                Err(e) => {
                    tracing::warn!(deployment_id, error = %e, "failure insight unavailable");
                    None
                }
            }
        };

        self.active.remove(deployment_id);
        span.in_scope(|| {
            tracing::info!(
                ?outcome,
                predicted = predicted_success_rate,
                prediction_accuracy,
                duration_seconds,
                "deployment completed"
            )
        });
        self.track(
            "deployment_completed",
            json!({
                "deployment_id": deployment_id,
                "outcome": tracked.attempt.status.as_str(),
                "predicted_success_rate": predicted_success_rate,
                "prediction_accuracy": prediction_accuracy,
                "duration_seconds": duration_seconds,
            }),
        );

        Some(CompletionReport {
            deployment_id: deployment_id.to_string(),
            outcome,
            predicted_success_rate,
            prediction_accuracy,
            duration_seconds,
            persisted,
            learning,
            failure_insight,
        })
    }

    pub async fn get_status(&self, deployment_id: &str) -> Option<DeploymentStatusView> {
        let handle = self.active.handle(deployment_id)?;
        let tracked = handle.lock().await;
        Some(DeploymentStatusView::project(&tracked.attempt, Utc::now()))
    }

    /// Every live deployment, oldest first.
    pub async fn get_active_deployments(&self) -> Vec<DeploymentStatusView> {
        let now = Utc::now();
        let mut views = Vec::with_capacity(self.active.len());
        for (_, handle) in self.active.handles() {
            let tracked = handle.lock().await;
            views.push(DeploymentStatusView::project(&tracked.attempt, now));
        }
        views.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        views
    }

    /// Flush every live attempt to the store and return the ids still
    /// resident. Deployments that never complete stay until the process ends.
    pub async fn shutdown(&self) -> Vec<String> {
        let mut resident = Vec::new();
        for (id, handle) in self.active.handles() {
            let tracked = handle.lock().await;
            self.persist(&tracked.attempt).await;
            resident.push(id);
        }
        tracing::info!(resident = resident.len(), "build monitor shut down");
        resident
    }

    /// Upsert with retry. Returns whether the write landed.
    async fn persist(&self, attempt: &DeploymentAttempt) -> bool {
        with_retry(&self.config.store_retry, "upsert_attempt", || {
            self.memory.store().upsert_attempt(attempt)
        })
        .await
        .is_ok()
    }

    fn track(&self, event: &str, properties: serde_json::Value) {
        if let Err(e) = self.analytics.track(event, &properties) {
            tracing::debug!(event, error = %e, "analytics sink failed");
        }
    }
}
