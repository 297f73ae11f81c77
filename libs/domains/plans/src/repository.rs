use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PlanError, PlanResult};
use crate::models::{CreatePlan, PAGE_SIZE, Plan, UpdatePlan};

/// Repository trait for Plan persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the title is taken.
    async fn create(&self, input: CreatePlan) -> PlanResult<Plan>;

    async fn get_by_id(&self, id: i32) -> PlanResult<Option<Plan>>;

    async fn find_by_title(&self, title: &str) -> PlanResult<Option<Plan>>;

    /// One page (1-based) of plans whose title contains `title`, ignoring
    /// case, ordered by duration. Returns the page and the total match count.
    async fn search(&self, title: &str, page: u64) -> PlanResult<(Vec<Plan>, u64)>;

    async fn update(&self, id: i32, input: UpdatePlan) -> PlanResult<Plan>;

    async fn delete(&self, id: i32) -> PlanResult<bool>;
}

/// In-memory implementation of PlanRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlanRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    plans: BTreeMap<i32, Plan>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn create(&self, input: CreatePlan) -> PlanResult<Plan> {
        let mut state = self.state.write().await;

        if state.plans.values().any(|p| p.title == input.title) {
            return Err(PlanError::AlreadyExists);
        }

        state.next_id += 1;
        let now = Utc::now();
        let plan = Plan {
            id: state.next_id,
            title: input.title,
            duration: input.duration,
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        state.plans.insert(plan.id, plan.clone());

        tracing::info!(plan_id = %plan.id, "Created plan");
        Ok(plan)
    }

    async fn get_by_id(&self, id: i32) -> PlanResult<Option<Plan>> {
        Ok(self.state.read().await.plans.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> PlanResult<Option<Plan>> {
        let state = self.state.read().await;
        Ok(state.plans.values().find(|p| p.title == title).cloned())
    }

    async fn search(&self, title: &str, page: u64) -> PlanResult<(Vec<Plan>, u64)> {
        let state = self.state.read().await;
        let needle = title.to_lowercase();

        let mut matches: Vec<Plan> = state
            .plans
            .values()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.duration.cmp(&b.duration).then(a.id.cmp(&b.id)));

        let total = matches.len() as u64;
        let rows = matches
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .collect();
        Ok((rows, total))
    }

    async fn update(&self, id: i32, input: UpdatePlan) -> PlanResult<Plan> {
        let mut state = self.state.write().await;

        if let Some(ref title) = input.title {
            if state.plans.values().any(|p| p.id != id && &p.title == title) {
                return Err(PlanError::TitleTaken);
            }
        }

        let plan = state.plans.get_mut(&id).ok_or(PlanError::InvalidId)?;
        plan.apply_update(input);
        let updated = plan.clone();

        tracing::info!(plan_id = %id, "Updated plan");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> PlanResult<bool> {
        let removed = self.state.write().await.plans.remove(&id).is_some();
        if removed {
            tracing::info!(plan_id = %id, "Deleted plan");
        }
        Ok(removed)
    }
}
