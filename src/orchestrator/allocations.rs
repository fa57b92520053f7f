use log::warn;

use super::{SagaContext, TaskScope};
use crate::store::Action;

pub async fn get_allocations(ctx: SagaContext, action: Action, scope: TaskScope) {
    if !matches!(action, Action::GetAllocations) {
        return;
    }

    scope.put(Action::AllocationsLoading);
    match ctx.api.fetch_allocations().await {
        Ok(allocations) => {
            scope.deliver(Action::AddAllocations(allocations));
        }
        Err(e) => {
            warn!("Failed to load allocations: {}", e);
            scope.deliver(Action::AllocationsError(e));
        }
    }
}
