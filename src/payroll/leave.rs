use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{leave, leave_policy, prelude::*, sea_orm_active_enums::LeaveStatus},
    period::PayPeriod,
    utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveEntitlement {
    pub paid: bool,
    pub granted_days: i64,
}

/// An organization's leave policy, keyed by lower-cased leave type
#[derive(Debug, Clone, Default)]
pub struct LeavePolicies(HashMap<String, LeaveEntitlement>);

impl LeavePolicies {
    pub fn get(&self, leave_type: &str) -> Option<&LeaveEntitlement> {
        self.0.get(&leave_type.to_lowercase())
    }
}

impl FromIterator<leave_policy::Model> for LeavePolicies {
    fn from_iter<T: IntoIterator<Item = leave_policy::Model>>(iter: T) -> Self {
        Self(iter.into_iter()
            .map(|policy| (
                policy.leave_type.to_lowercase(),
                LeaveEntitlement {
                    paid: policy.paid,
                    granted_days: policy.granted_days.into(),
                },
            ))
            .collect())
    }
}

/// Whole leave days of a month split into paid and unpaid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveApportionment {
    pub paid_leave_days: i64,
    pub unpaid_days: i64,
}

/// Split the leave taken in `period` into paid and unpaid days
///
/// `leaves` are the approved leaves overlapping the period, `history` the approved leaves
/// that ended before it. The entitlement left for a leave type is its granted days minus
/// the days of every earlier leave of that type, so the result only depends on the
/// leave history and is the same on every run.
pub fn apportion(
    leaves: &[leave::Model],
    history: &[leave::Model],
    policies: &LeavePolicies,
    period: &PayPeriod,
) -> LeaveApportionment {
    let mut apportionment = LeaveApportionment::default();

    for leave in leaves.iter().filter(|l| l.status == LeaveStatus::Approved) {
        let Some((start, end)) = utils::clip_to_window(leave.start_date, leave.end_date, period.from_date(), period.to_date()) else {
            continue
        };
        let days = utils::inclusive_days(start, end);

        let Some(entitlement) = policies.get(&leave.leave_type).filter(|e| e.paid) else {
            apportionment.unpaid_days += days;
            continue
        };

        let leave_type = leave.leave_type.to_lowercase();
        let used_before: i64 = history.iter()
            .filter(|h| h.id != leave.id)
            .filter(|h| h.status == LeaveStatus::Approved)
            .filter(|h| h.end_date < period.from_date())
            .filter(|h| h.leave_type.to_lowercase() == leave_type)
            .map(|h| utils::inclusive_days(h.start_date, h.end_date))
            .sum();

        let remaining = (entitlement.granted_days - used_before).max(0);
        let paid = days.min(remaining);

        apportionment.paid_leave_days += paid;
        apportionment.unpaid_days += days - paid;
    }

    apportionment
}

pub async fn fetch_policies(db: &impl ConnectionTrait, organization_id: Uuid) -> Result<LeavePolicies, DbErr> {
    let policies = LeavePolicy::find()
        .filter(leave_policy::Column::OrganizationId.eq(organization_id))
        .filter(leave_policy::Column::IsActive.eq(true))
        .all(db).await?;

    Ok(policies.into_iter().collect())
}

/// Approved leaves overlapping the period
pub async fn fetch_for_period(
    db: &impl ConnectionTrait,
    employee_id: Uuid,
    period: &PayPeriod,
) -> Result<Vec<leave::Model>, DbErr> {
    Leave::find()
        .filter(leave::Column::EmployeeId.eq(employee_id))
        .filter(leave::Column::Status.eq(LeaveStatus::Approved))
        .filter(leave::Column::StartDate.lte(period.to_date()))
        .filter(leave::Column::EndDate.gte(period.from_date()))
        .order_by_asc(leave::Column::StartDate)
        .all(db).await
}

/// Approved leaves fully taken before the period
pub async fn fetch_history(
    db: &impl ConnectionTrait,
    employee_id: Uuid,
    period: &PayPeriod,
) -> Result<Vec<leave::Model>, DbErr> {
    Leave::find()
        .filter(leave::Column::EmployeeId.eq(employee_id))
        .filter(leave::Column::Status.eq(LeaveStatus::Approved))
        .filter(leave::Column::EndDate.lt(period.from_date()))
        .all(db).await
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leave(leave_type: &str, start: NaiveDate, end: NaiveDate) -> leave::Model {
        leave::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: Uuid::nil(),
            leave_type: leave_type.to_string(),
            start_date: start,
            end_date: end,
            status: LeaveStatus::Approved,
        }
    }

    fn policy(leave_type: &str, paid: bool, granted_days: i32) -> leave_policy::Model {
        leave_policy::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            organization_id: Uuid::nil(),
            leave_type: leave_type.to_string(),
            paid,
            granted_days,
            is_active: true,
        }
    }

    #[test]
    fn test_entitlement_partially_used() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let policies = LeavePolicies::from_iter([policy("Casual", true, 5)]);

        let history = vec![leave("casual", date(2024, 1, 8), date(2024, 1, 10))];
        let leaves = vec![leave("CASUAL", date(2024, 3, 11), date(2024, 3, 14))];

        let result = apportion(&leaves, &history, &policies, &period);

        assert_eq!(result, LeaveApportionment { paid_leave_days: 2, unpaid_days: 2 });
    }

    #[test]
    fn test_apportion_is_idempotent() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let policies = LeavePolicies::from_iter([policy("sick", true, 10), policy("casual", true, 2)]);

        let history = vec![leave("sick", date(2024, 2, 1), date(2024, 2, 7))];
        let leaves = vec![
            leave("sick", date(2024, 2, 28), date(2024, 3, 5)),
            leave("casual", date(2024, 3, 20), date(2024, 3, 22)),
        ];

        let first = apportion(&leaves, &history, &policies, &period);
        let second = apportion(&leaves, &history, &policies, &period);

        assert_eq!(first, second);
        // sick: 5 days in March, 3 left; casual: 3 days, 2 granted
        assert_eq!(first, LeaveApportionment { paid_leave_days: 5, unpaid_days: 3 });
    }

    #[test]
    fn test_unknown_or_unpaid_type_is_unpaid() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let policies = LeavePolicies::from_iter([policy("sabbatical", false, 30)]);

        let leaves = vec![
            leave("sabbatical", date(2024, 3, 1), date(2024, 3, 3)),
            leave("bereavement", date(2024, 3, 10), date(2024, 3, 11)),
        ];

        let result = apportion(&leaves, &[], &policies, &period);

        assert_eq!(result, LeaveApportionment { paid_leave_days: 0, unpaid_days: 5 });
    }

    #[test]
    fn test_leave_clipped_to_period() {
        let period = PayPeriod::new(2024, 2).unwrap();
        let policies = LeavePolicies::from_iter([policy("annual", true, 30)]);

        let leaves = vec![leave("annual", date(2024, 1, 29), date(2024, 3, 2))];

        let result = apportion(&leaves, &[], &policies, &period);

        assert_eq!(result, LeaveApportionment { paid_leave_days: 29, unpaid_days: 0 });
    }

    #[test]
    fn test_exhausted_entitlement() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let policies = LeavePolicies::from_iter([policy("casual", true, 2)]);

        let history = vec![
            leave("casual", date(2024, 1, 1), date(2024, 1, 2)),
            leave("casual", date(2024, 2, 5), date(2024, 2, 6)),
        ];
        let leaves = vec![leave("casual", date(2024, 3, 4), date(2024, 3, 4))];

        let result = apportion(&leaves, &history, &policies, &period);

        assert_eq!(result, LeaveApportionment { paid_leave_days: 0, unpaid_days: 1 });
    }

    #[test]
    fn test_same_month_leaves_measured_against_prior_history_only() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let policies = LeavePolicies::from_iter([policy("casual", true, 3)]);

        let history = vec![leave("casual", date(2024, 1, 2), date(2024, 1, 2))];
        let leaves = vec![
            leave("casual", date(2024, 3, 4), date(2024, 3, 5)),
            leave("casual", date(2024, 3, 18), date(2024, 3, 19)),
        ];

        let result = apportion(&leaves, &history, &policies, &period);

        // Both leaves see the same 2 days left
        assert_eq!(result, LeaveApportionment { paid_leave_days: 4, unpaid_days: 0 });
    }

    #[test]
    fn test_unapproved_leave_ignored() {
        let period = PayPeriod::new(2024, 3).unwrap();
        let mut pending = leave("casual", date(2024, 3, 4), date(2024, 3, 5));
        pending.status = LeaveStatus::Pending;

        let result = apportion(&[pending], &[], &LeavePolicies::default(), &period);

        assert_eq!(result, LeaveApportionment::default());
    }
}
