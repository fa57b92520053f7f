use log::{info, warn};

use super::{SagaContext, TaskScope};
use crate::store::Action;

pub async fn fetch_systems(ctx: SagaContext, action: Action, scope: TaskScope) {
    if !matches!(action, Action::FetchSystems) {
        return;
    }

    match ctx.api.list_systems().await {
        Ok(list) => {
            scope.deliver(Action::SystemsList(list));
        }
        Err(e) => {
            warn!("Failed to list systems: {}", e);
            scope.deliver(Action::SystemsListError(e));
        }
    }
}

/// Push the portal's key onto an execution system, then replay the action
/// that was waiting on it.
pub async fn push_keys(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::SystemsPushKeys {
        system_id,
        form,
        on_success,
    } = action
    else {
        return;
    };

    scope.put(Action::SystemsPushKeysStarted);

    info!("Pushing keys to {}", system_id);
    let token = ctx.csrf_token();
    match ctx.api.push_keys(&system_id, &form, token.as_deref()).await {
        Ok(_) => {
            scope.put(Action::SystemsPushKeysSuccess { system_id });
            match on_success {
                Some(next) => {
                    scope.put(Action::close_push_keys());
                    scope.finish(*next);
                }
                None => scope.finish(Action::close_push_keys()),
            }
        }
        Err(e) => {
            // Modal stays open so the user can correct the credentials.
            warn!("Key push to {} failed: {}", system_id, e);
            scope.finish(Action::SystemsPushKeysError(e));
        }
    }
}
