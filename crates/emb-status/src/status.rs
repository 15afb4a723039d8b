use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::registry::EntityKind;

// ---------------------------------------------------------------------------
// InvalidStatus
// ---------------------------------------------------------------------------

/// A submitted code that is not in the registry for its kind.
///
/// Raised before any storage interaction; the HTTP layer answers 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus {
    pub kind: EntityKind,
    pub value: String,
}

impl InvalidStatus {
    pub fn new(kind: EntityKind, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} code: {:?}", self.kind.as_str(), self.value)
    }
}

impl std::error::Error for InvalidStatus {}

fn normalized(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an order. Stored as the lowercase registry code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    WaitingForPayment,
    StandBy,
    Queue,
    InProgress,
    Canceled,
    /// Terminal. Entering it stamps the order's close time.
    Done,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Open,
        OrderStatus::WaitingForPayment,
        OrderStatus::StandBy,
        OrderStatus::Queue,
        OrderStatus::InProgress,
        OrderStatus::Canceled,
        OrderStatus::Done,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::WaitingForPayment => "waiting_for_payment",
            OrderStatus::StandBy => "stand_by",
            OrderStatus::Queue => "queue",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Done => "done",
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        self.code()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done)
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "open" => Ok(OrderStatus::Open),
            "waiting_for_payment" => Ok(OrderStatus::WaitingForPayment),
            "stand_by" => Ok(OrderStatus::StandBy),
            "queue" => Ok(OrderStatus::Queue),
            "in_progress" => Ok(OrderStatus::InProgress),
            "canceled" => Ok(OrderStatus::Canceled),
            "done" => Ok(OrderStatus::Done),
            _ => Err(InvalidStatus::new(EntityKind::Order, s)),
        }
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a job.
///
/// Parsing is case-insensitive; the canonical stored form is UPPERCASE
/// (`IN_PROGRESS`) while the registry code is lowercase (`in_progress`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Queue,
    InProgress,
    Canceled,
    Done,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Created,
        JobStatus::Queue,
        JobStatus::InProgress,
        JobStatus::Canceled,
        JobStatus::Done,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Queue => "queue",
            JobStatus::InProgress => "in_progress",
            JobStatus::Canceled => "canceled",
            JobStatus::Done => "done",
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "CREATED",
            JobStatus::Queue => "QUEUE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Canceled => "CANCELED",
            JobStatus::Done => "DONE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done)
    }
}

impl FromStr for JobStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "created" => Ok(JobStatus::Created),
            "queue" => Ok(JobStatus::Queue),
            "in_progress" => Ok(JobStatus::InProgress),
            "canceled" => Ok(JobStatus::Canceled),
            "done" => Ok(JobStatus::Done),
            _ => Err(InvalidStatus::new(EntityKind::Job, s)),
        }
    }
}

// ---------------------------------------------------------------------------
// GoodsStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoodsStatus {
    Acquired,
    InStock,
    InUse,
    Missing,
    Decommissioned,
}

impl GoodsStatus {
    pub const ALL: [GoodsStatus; 5] = [
        GoodsStatus::Acquired,
        GoodsStatus::InStock,
        GoodsStatus::InUse,
        GoodsStatus::Missing,
        GoodsStatus::Decommissioned,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            GoodsStatus::Acquired => "acquired",
            GoodsStatus::InStock => "in_stock",
            GoodsStatus::InUse => "in_use",
            GoodsStatus::Missing => "missing",
            GoodsStatus::Decommissioned => "decommissioned",
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        self.code()
    }
}

impl FromStr for GoodsStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "acquired" => Ok(GoodsStatus::Acquired),
            "in_stock" => Ok(GoodsStatus::InStock),
            "in_use" => Ok(GoodsStatus::InUse),
            "missing" => Ok(GoodsStatus::Missing),
            "decommissioned" => Ok(GoodsStatus::Decommissioned),
            _ => Err(InvalidStatus::new(EntityKind::Goods, s)),
        }
    }
}

// ---------------------------------------------------------------------------
// PaymentProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    CashFlow,
    CreditCard,
    DebitCard,
    MoneyTransfer,
}

impl PaymentProvider {
    pub const ALL: [PaymentProvider; 4] = [
        PaymentProvider::CashFlow,
        PaymentProvider::CreditCard,
        PaymentProvider::DebitCard,
        PaymentProvider::MoneyTransfer,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentProvider::CashFlow => "cash_flow",
            PaymentProvider::CreditCard => "credit_card",
            PaymentProvider::DebitCard => "debit_card",
            PaymentProvider::MoneyTransfer => "money_transfer",
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        self.code()
    }
}

impl FromStr for PaymentProvider {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "cash_flow" => Ok(PaymentProvider::CashFlow),
            "credit_card" => Ok(PaymentProvider::CreditCard),
            "debit_card" => Ok(PaymentProvider::DebitCard),
            "money_transfer" => Ok(PaymentProvider::MoneyTransfer),
            _ => Err(InvalidStatus::new(EntityKind::PaymentProvider, s)),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStatus
// ---------------------------------------------------------------------------

/// Soft-delete flag shared by clients, addresses and assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Archived,
}

impl RecordStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "ACTIVE",
            RecordStatus::Archived => "ARCHIVED",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "active" => Ok(RecordStatus::Active),
            "archived" => Ok(RecordStatus::Archived),
            _ => Err(InvalidStatus::new(EntityKind::Record, s)),
        }
    }
}
