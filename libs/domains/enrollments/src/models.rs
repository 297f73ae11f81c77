use chrono::{DateTime, Months, NaiveDate, Utc};
use domain_plans::Plan;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Today's date in UTC; start dates are compared against it.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: i32,
    pub student_id: i32,
    pub plan_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Total for the whole period
    pub price: f64,
    /// Not canceled and today lies within the period
    pub active: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn is_active_on(
        start_date: NaiveDate,
        end_date: NaiveDate,
        canceled_at: Option<DateTime<Utc>>,
        on: NaiveDate,
    ) -> bool {
        canceled_at.is_none() && start_date <= on && on <= end_date
    }

    /// Recomputes `active` for today.
    pub fn refreshed(mut self) -> Self {
        self.active = Self::is_active_on(self.start_date, self.end_date, self.canceled_at, today());
        self
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateEnrollment {
    #[validate(range(min = 1))]
    pub student_id: i32,
    #[validate(range(min = 1))]
    pub plan_id: i32,
    /// `YYYY-MM-DD`, today or later
    pub start_date: NaiveDate,
}

/// Replaces student, plan and start date; end date and price are recomputed.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateEnrollment {
    #[validate(range(min = 1))]
    pub student_id: i32,
    #[validate(range(min = 1))]
    pub plan_id: i32,
    pub start_date: NaiveDate,
}

/// End date and total price derived from a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrollmentTerms {
    pub end_date: NaiveDate,
    pub price: f64,
}

impl EnrollmentTerms {
    /// `None` only when the end date overflows the calendar.
    pub fn for_plan(start_date: NaiveDate, plan: &Plan) -> Option<Self> {
        let months = u32::try_from(plan.duration).ok()?;
        let end_date = start_date.checked_add_months(Months::new(months))?;
        Some(Self {
            end_date,
            price: plan.total_price(),
        })
    }
}

/// Row written by the repository on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub student_id: i32,
    pub plan_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
}

impl NewEnrollment {
    pub fn new(student_id: i32, plan_id: i32, start_date: NaiveDate, terms: EnrollmentTerms) -> Self {
        Self {
            student_id,
            plan_id,
            start_date,
            end_date: terms.end_date,
            price: terms.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlanSummary {
    pub id: i32,
    pub title: String,
}

/// Read projection returned by index and list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentDetails {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
    pub active: bool,
    pub canceled_at: Option<DateTime<Utc>>,
    pub student: Option<StudentSummary>,
    pub plan: Option<PlanSummary>,
}

impl EnrollmentDetails {
    pub fn new(
        enrollment: &Enrollment,
        student: Option<StudentSummary>,
        plan: Option<PlanSummary>,
    ) -> Self {
        Self {
            id: enrollment.id,
            start_date: enrollment.start_date,
            end_date: enrollment.end_date,
            price: enrollment.price,
            active: enrollment.active,
            canceled_at: enrollment.canceled_at,
            student,
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(duration: i32, price: f64) -> Plan {
        Plan {
            id: 1,
            title: "Gold".into(),
            duration,
            price,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_terms_add_months_and_multiply_price() {
        let terms = EnrollmentTerms::for_plan(date(2030, 1, 10), &plan(3, 100.0)).unwrap();
        assert_eq!(terms.end_date, date(2030, 4, 10));
        assert_eq!(terms.price, 300.0);
    }

    #[test]
    fn test_terms_clamp_to_month_end() {
        let terms = EnrollmentTerms::for_plan(date(2030, 1, 31), &plan(1, 100.0)).unwrap();
        assert_eq!(terms.end_date, date(2030, 2, 28));

        let leap = EnrollmentTerms::for_plan(date(2031, 11, 30), &plan(3, 100.0)).unwrap();
        assert_eq!(leap.end_date, date(2032, 2, 29));
    }

    #[test]
    fn test_terms_reject_negative_duration() {
        assert!(EnrollmentTerms::for_plan(date(2030, 1, 1), &plan(-1, 100.0)).is_none());
    }

    #[test]
    fn test_active_window() {
        let start = date(2030, 1, 10);
        let end = date(2030, 4, 10);

        assert!(!Enrollment::is_active_on(start, end, None, date(2030, 1, 9)));
        assert!(Enrollment::is_active_on(start, end, None, start));
        assert!(Enrollment::is_active_on(start, end, None, end));
        assert!(!Enrollment::is_active_on(start, end, None, date(2030, 4, 11)));
        assert!(!Enrollment::is_active_on(start, end, Some(Utc::now()), date(2030, 2, 1)));
    }
}
