use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Rows per search page.
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Plan {
    pub id: i32,
    pub title: String,
    /// Months
    pub duration: i32,
    /// Price per month
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Price of the whole plan: monthly price times duration.
    pub fn total_price(&self) -> f64 {
        self.price * f64::from(self.duration)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreatePlan {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(range(min = 1))]
    pub duration: i32,
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdatePlan {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
}

impl Plan {
    pub fn apply_update(&mut self, update: UpdatePlan) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlanSearch {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// 1-based, defaults to 1
    pub page: Option<u64>,
}

impl PlanSearch {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanPage {
    pub plans: Vec<Plan>,
    pub page: u64,
    pub last_page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemovedResponse {
    pub msg: String,
}
