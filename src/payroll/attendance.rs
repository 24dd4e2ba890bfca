use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{attendance, overtime, prelude::*, sea_orm_active_enums::{AttendanceStatus, OvertimeStatus}},
    period::PayPeriod,
};

/// Counts one employee's month of attendance reduces to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub presents: u32,
    pub half_days: u32,
    pub absents: u32,
    /// Kept for audit only
    pub on_leave_ids: Vec<Uuid>,
    pub overtime_hours: Decimal,
}

impl AttendanceSummary {
    /// Half days count for half a working day
    pub fn working_days(&self) -> Decimal {
        Decimal::from(self.presents) + Decimal::from(self.half_days) * dec!(0.5)
    }
}

/// Reduce attendance rows into counts
///
/// Counts are reported as they come, even when they exceed the days in the month.
/// Overtime hours are only taken for rows flagged as overtime that have an approved
/// entry in `approved_overtime`.
pub fn aggregate(records: &[attendance::Model], approved_overtime: &HashMap<Uuid, Decimal>) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();

    for record in records {
        match record.status {
            AttendanceStatus::Present => summary.presents += 1,
            AttendanceStatus::HalfDay => summary.half_days += 1,
            AttendanceStatus::Absent => summary.absents += 1,
            AttendanceStatus::OnLeave => summary.on_leave_ids.push(record.id),
            AttendanceStatus::Holiday => {},
        }

        if record.is_overtime {
            summary.overtime_hours += approved_overtime.get(&record.id).copied().unwrap_or_default();
        }
    }

    summary
}

pub async fn fetch_for_period(
    db: &impl ConnectionTrait,
    employee_id: Uuid,
    period: &PayPeriod,
) -> Result<Vec<attendance::Model>, DbErr> {
    Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee_id))
        .filter(attendance::Column::Date.between(period.from_date(), period.to_date()))
        .order_by_asc(attendance::Column::Date)
        .all(db).await
}

/// Approved overtime hours per attendance row, for the rows flagged as overtime
pub async fn fetch_approved_overtime(
    db: &impl ConnectionTrait,
    records: &[attendance::Model],
) -> Result<HashMap<Uuid, Decimal>, DbErr> {
    let ids = records.iter()
        .filter(|r| r.is_overtime)
        .map(|r| r.id)
        .collect::<Vec<_>>();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let overtimes = Overtime::find()
        .filter(overtime::Column::AttendanceId.is_in(ids))
        .filter(overtime::Column::Status.eq(OvertimeStatus::HrApproved))
        .all(db).await?;

    let mut hours = HashMap::new();
    for overtime in overtimes {
        *hours.entry(overtime.attendance_id).or_insert(Decimal::ZERO) += overtime.approved_hours;
    }

    Ok(hours)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    fn record(day: u32, status: AttendanceStatus, is_overtime: bool) -> attendance::Model {
        attendance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            status,
            is_overtime,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[], &HashMap::new());

        assert_eq!(summary, AttendanceSummary::default());
        assert_eq!(summary.working_days(), Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_counts() {
        let leave = record(4, AttendanceStatus::OnLeave, false);
        let records = vec![
            record(1, AttendanceStatus::Present, false),
            record(2, AttendanceStatus::Present, false),
            record(3, AttendanceStatus::HalfDay, false),
            leave.clone(),
            record(5, AttendanceStatus::Absent, false),
            record(6, AttendanceStatus::Holiday, false),
        ];

        let summary = aggregate(&records, &HashMap::new());

        assert_eq!(summary.presents, 2);
        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.absents, 1);
        assert_eq!(summary.on_leave_ids, vec![leave.id]);
        assert_eq!(summary.working_days(), dec!(2.5));
    }

    #[test]
    fn test_aggregate_does_not_clamp() {
        // Duplicated rows beyond the days of the month are still counted
        let records = (0..35)
            .map(|i| record(1 + i % 30, AttendanceStatus::Present, false))
            .collect::<Vec<_>>();

        let summary = aggregate(&records, &HashMap::new());

        assert_eq!(summary.presents, 35);
        assert_eq!(summary.working_days(), dec!(35));
    }

    #[test]
    fn test_aggregate_overtime() {
        let approved = record(1, AttendanceStatus::Present, true);
        let unapproved = record(2, AttendanceStatus::Present, true);
        let not_flagged = record(3, AttendanceStatus::Present, false);

        let hours = HashMap::from([
            (approved.id, dec!(2.5)),
            // Hours for a row not flagged as overtime are ignored
            (not_flagged.id, dec!(4)),
        ]);

        let summary = aggregate(&[approved, unapproved, not_flagged], &hours);

        assert_eq!(summary.overtime_hours, dec!(2.5));
    }

    #[tokio::test]
    async fn test_fetch_approved_overtime() {
        let flagged = record(1, AttendanceStatus::Present, true);

        let overtime = |hours| overtime::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            attendance_id: flagged.id,
            employee_id: Uuid::nil(),
            requested_hours: hours,
            approved_hours: hours,
            status: OvertimeStatus::HrApproved,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ overtime(dec!(1)), overtime(dec!(1.5)) ],
            ])
            .into_connection();

        let hours = fetch_approved_overtime(&db, &[flagged.clone()]).await.unwrap();
        assert_eq!(hours.get(&flagged.id), Some(&dec!(2.5)));

        // Nothing flagged, no query
        let hours = fetch_approved_overtime(&db, &[record(2, AttendanceStatus::Present, false)]).await.unwrap();
        assert!(hours.is_empty());
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
