//! Status registry and order/job lifecycle rules.
//!
//! Nothing in this crate touches storage. `registry` owns the fixed code
//! tables used for validation and filter controls; `status` holds the typed
//! enums that flow into `emb-db`; `lifecycle` decides which columns an order
//! or job update writes.

pub mod lifecycle;
pub mod registry;
pub mod status;

pub use lifecycle::{plan_job_update, plan_order_update, JobChange, OrderChange};
pub use registry::{valid_statuses, validate, validate_filter, EntityKind, StatusEntry};
pub use status::{GoodsStatus, InvalidStatus, JobStatus, OrderStatus, PaymentProvider, RecordStatus};
