use std::sync::Arc;
use validator::Validate;

use crate::error::{PlanError, PlanResult};
use crate::models::{CreatePlan, PAGE_SIZE, Plan, PlanPage, PlanSearch, RemovedResponse, UpdatePlan};
use crate::repository::PlanRepository;

/// Service layer for subscription plans
#[derive(Clone)]
pub struct PlanService<R: PlanRepository> {
    repository: Arc<R>,
}

impl<R: PlanRepository> PlanService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Shared handle to the repository, for domains that look plans up.
    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    pub async fn create_plan(&self, input: CreatePlan) -> PlanResult<Plan> {
        input
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        if self.repository.find_by_title(&input.title).await?.is_some() {
            return Err(PlanError::AlreadyExists);
        }

        self.repository.create(input).await
    }

    pub async fn get_plan(&self, id: i32) -> PlanResult<Plan> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(PlanError::InvalidId)
    }

    pub async fn search_plans(&self, search: PlanSearch) -> PlanResult<PlanPage> {
        let page = search.page();
        let title = search.title.unwrap_or_default();

        let (plans, total) = self.repository.search(&title, page).await?;

        Ok(PlanPage {
            plans,
            page,
            last_page: total.div_ceil(PAGE_SIZE),
        })
    }

    /// Existing enrollments keep the end date and price computed when they
    /// were written.
    pub async fn update_plan(&self, id: i32, input: UpdatePlan) -> PlanResult<Plan> {
        input
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        let current = self.get_plan(id).await?;

        if let Some(ref title) = input.title {
            if title != &current.title {
                if let Some(other) = self.repository.find_by_title(title).await? {
                    if other.id != id {
                        return Err(PlanError::TitleTaken);
                    }
                }
            }
        }

        self.repository.update(id, input).await
    }

    pub async fn delete_plan(&self, id: i32) -> PlanResult<RemovedResponse> {
        if !self.repository.delete(id).await? {
            return Err(PlanError::NotFound);
        }

        Ok(RemovedResponse {
            msg: "The plan was successfully removed".to_string(),
        })
    }
}
