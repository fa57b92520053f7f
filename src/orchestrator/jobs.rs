use log::{debug, info, warn};
use serde_json::Value;

use super::{SagaContext, TaskScope};
use crate::entities::JobEntry;
use crate::store::Action;

/// Fetch the workspace job list.
///
/// The spinner is raised and lowered exactly once whatever happens. Failures
/// never escape: they become a one-row list holding the error sentinel.
pub async fn get_jobs(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::GetJobs { params } = action else {
        return;
    };

    scope.put(Action::ShowSpinner);

    let list = match ctx.api.list_jobs(&params).await {
        Ok(list) => list,
        Err(e) => {
            warn!("Failed to list jobs: {}", e);
            vec![JobEntry::list_error()]
        }
    };
    scope.deliver(Action::JobsList(list));

    scope.put(Action::HideSpinner);
}

/// Whether a JSON value counts as set: anything but null, false, zero and "".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// System the backend needs keys pushed to before it accepts the job.
fn exec_system(response: &Value) -> Option<&Value> {
    response.get("execSys").filter(|system| is_truthy(system))
}

/// Submit a job.
///
/// When the backend answers with `execSys`, the submission is parked in the
/// key-push modal as its continuation and the form is released; pushing the
/// keys replays it through this saga.
pub async fn submit_job(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::SubmitJob(payload) = action else {
        return;
    };

    scope.put(Action::FlushSubmit);
    scope.put(Action::ToggleSubmitting);

    let token = ctx.csrf_token();
    if token.is_none() {
        debug!("No CSRF cookie, submitting without a token");
    }

    info!("Submitting job");
    match ctx.api.submit_job(&payload, token.as_deref()).await {
        Ok(response) => match exec_system(&response) {
            Some(system) => {
                info!("Job needs keys on {}", system);
                let system = system.clone();
                scope.put(Action::open_push_keys(system, Action::SubmitJob(payload)));
                scope.finish(Action::ToggleSubmitting);
            }
            None => scope.finish(Action::SubmitJobSuccess(response)),
        },
        Err(e) => {
            warn!("Job submission failed: {}", e);
            scope.finish(Action::SubmitJobError(e));
        }
    }
}
