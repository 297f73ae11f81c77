use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Rows per search page.
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// kg
    pub weight: f64,
    /// m
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 1))]
    pub age: i32,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub height: f64,
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateStudent {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 1))]
    pub age: Option<i32>,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub height: Option<f64>,
}

impl Student {
    pub fn apply_update(&mut self, update: UpdateStudent) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentSearch {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// 1-based, defaults to 1
    pub page: Option<u64>,
}

impl StudentSearch {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentPage {
    pub students: Vec<Student>,
    pub page: u64,
    pub last_page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemovedResponse {
    pub msg: String,
}
