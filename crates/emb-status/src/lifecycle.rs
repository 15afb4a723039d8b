//! Order/job status lifecycle.
//!
//! An update is decided in two steps: a pure plan computed from the stored
//! row and the submitted values, then a single UPDATE built from that plan.
//! The SQL layer only renders the plan; it does not re-derive the rules.
//!
//! Rules:
//! - Status only changes when it differs from the stored one.
//! - Entering `done` stamps the close time (orders) or end time (jobs).
//! - Entering `in_progress` stamps a job's start time, but only if none exists.
//! - Timestamps are never cleared.
//! - The address (orders) or asset (jobs) is always overwritten.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::status::{JobStatus, OrderStatus};

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Columns an order update writes. `None` means "leave as stored".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChange {
    pub status: Option<OrderStatus>,
    pub close_time: Option<DateTime<Utc>>,
    pub client_address_id: Uuid,
}

impl OrderChange {
    pub fn changes_status(&self) -> bool {
        self.status.is_some()
    }
}

pub fn plan_order_update(
    current: OrderStatus,
    new_status: OrderStatus,
    new_address_id: Uuid,
    now: DateTime<Utc>,
) -> OrderChange {
    let mut change = OrderChange {
        status: None,
        close_time: None,
        client_address_id: new_address_id,
    };

    if new_status != current {
        change.status = Some(new_status);
        if new_status.is_terminal() {
            change.close_time = Some(now);
        }
    }

    change
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Columns a job update writes. `None` means "leave as stored".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobChange {
    pub status: Option<JobStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub asset_id: Uuid,
}

impl JobChange {
    pub fn changes_status(&self) -> bool {
        self.status.is_some()
    }
}

pub fn plan_job_update(
    current: JobStatus,
    current_start: Option<DateTime<Utc>>,
    new_status: JobStatus,
    new_asset_id: Uuid,
    now: DateTime<Utc>,
) -> JobChange {
    let mut change = JobChange {
        status: None,
        start_time: None,
        end_time: None,
        asset_id: new_asset_id,
    };

    if new_status == current {
        return change;
    }

    change.status = Some(new_status);
    if new_status.is_terminal() {
        change.end_time = Some(now);
    } else if new_status == JobStatus::InProgress && current_start.is_none() {
        change.start_time = Some(now);
    }

    change
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn order_done_stamps_close_time() {
        let addr = Uuid::new_v4();
        let c = plan_order_update(OrderStatus::Open, OrderStatus::Done, addr, t0());
        assert_eq!(c.status, Some(OrderStatus::Done));
        assert_eq!(c.close_time, Some(t0()));
        assert_eq!(c.client_address_id, addr);
    }

    #[test]
    fn order_non_terminal_change_leaves_close_time() {
        let c = plan_order_update(OrderStatus::Open, OrderStatus::Queue, Uuid::new_v4(), t0());
        assert_eq!(c.status, Some(OrderStatus::Queue));
        assert_eq!(c.close_time, None);
    }

    #[test]
    fn order_same_status_only_rewrites_address() {
        let addr = Uuid::new_v4();
        let c = plan_order_update(OrderStatus::Done, OrderStatus::Done, addr, t0());
        assert!(!c.changes_status());
        assert_eq!(c.close_time, None, "done -> done must not re-stamp");
        assert_eq!(c.client_address_id, addr);
    }

    #[test]
    fn job_in_progress_stamps_start_once() {
        let asset = Uuid::new_v4();
        let c = plan_job_update(JobStatus::Created, None, JobStatus::InProgress, asset, t0());
        assert_eq!(c.status, Some(JobStatus::InProgress));
        assert_eq!(c.start_time, Some(t0()));
        assert_eq!(c.end_time, None);
        assert_eq!(c.asset_id, asset);

        // Back to queue and in progress again: the first start time stays.
        let earlier = t0() - Duration::hours(3);
        let c = plan_job_update(JobStatus::Queue, Some(earlier), JobStatus::InProgress, asset, t0());
        assert_eq!(c.status, Some(JobStatus::InProgress));
        assert_eq!(c.start_time, None);
    }

    #[test]
    fn job_done_stamps_end_time() {
        let c = plan_job_update(
            JobStatus::InProgress,
            Some(t0() - Duration::hours(1)),
            JobStatus::Done,
            Uuid::new_v4(),
            t0(),
        );
        assert_eq!(c.status, Some(JobStatus::Done));
        assert_eq!(c.end_time, Some(t0()));
        assert_eq!(c.start_time, None);
    }

    #[test]
    fn job_straight_to_done_does_not_stamp_start() {
        let c = plan_job_update(JobStatus::Created, None, JobStatus::Done, Uuid::new_v4(), t0());
        assert_eq!(c.end_time, Some(t0()));
        assert_eq!(c.start_time, None);
    }

    #[test]
    fn job_same_status_twice_is_a_no_op_for_timestamps() {
        let asset = Uuid::new_v4();
        let first = plan_job_update(JobStatus::Created, None, JobStatus::InProgress, asset, t0());
        assert!(first.start_time.is_some());

        let later = t0() + Duration::minutes(5);
        let second = plan_job_update(JobStatus::InProgress, first.start_time, JobStatus::InProgress, asset, later);
        assert!(!second.changes_status());
        assert_eq!(second.start_time, None);
        assert_eq!(second.end_time, None);
        assert_eq!(second.asset_id, asset);
    }
}
