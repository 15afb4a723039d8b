//! Status Registry.
//!
//! Fixed, ordered code → label tables for every closed set the application
//! validates against. The tables are `static` and never mutated; the empty
//! code is always first and means "no filter / all".

use serde::Serialize;

use crate::status::InvalidStatus;

/// Which closed set a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Job,
    Goods,
    PaymentProvider,
    GoodsType,
    GoodsUnit,
    /// Active/archived flag on clients, addresses and assets.
    Record,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Order,
        EntityKind::Job,
        EntityKind::Goods,
        EntityKind::PaymentProvider,
        EntityKind::GoodsType,
        EntityKind::GoodsUnit,
        EntityKind::Record,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Order => "order",
            EntityKind::Job => "job",
            EntityKind::Goods => "goods",
            EntityKind::PaymentProvider => "payment_provider",
            EntityKind::GoodsType => "goods_type",
            EntityKind::GoodsUnit => "goods_unit",
            EntityKind::Record => "record",
        }
    }

    /// Parse a URL / CLI token. Accepts a few plural spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "order" | "orders" => Some(EntityKind::Order),
            "job" | "jobs" => Some(EntityKind::Job),
            "goods" | "good" => Some(EntityKind::Goods),
            "payment_provider" | "payment_providers" | "payment" | "payments" => {
                Some(EntityKind::PaymentProvider)
            }
            "goods_type" | "goods_types" => Some(EntityKind::GoodsType),
            "goods_unit" | "goods_units" => Some(EntityKind::GoodsUnit),
            "record" | "records" => Some(EntityKind::Record),
            _ => None,
        }
    }
}

/// One row of a registry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub code: &'static str,
    pub label: &'static str,
}

const fn entry(code: &'static str, label: &'static str) -> StatusEntry {
    StatusEntry { code, label }
}

static ORDER_STATUSES: [StatusEntry; 8] = [
    entry("", "all"),
    entry("open", "open"),
    entry("waiting_for_payment", "waiting for payment"),
    entry("stand_by", "stand by"),
    entry("queue", "queue"),
    entry("in_progress", "in progress"),
    entry("canceled", "canceled"),
    entry("done", "done"),
];

static JOB_STATUSES: [StatusEntry; 6] = [
    entry("", "all"),
    entry("created", "created"),
    entry("queue", "queue"),
    entry("in_progress", "in progress"),
    entry("canceled", "canceled"),
    entry("done", "done"),
];

static GOODS_STATUSES: [StatusEntry; 6] = [
    entry("", "all"),
    entry("acquired", "acquired"),
    entry("in_stock", "in stock"),
    entry("in_use", "in use"),
    entry("missing", "missing"),
    entry("decommissioned", "decommissioned"),
];

static PAYMENT_PROVIDERS: [StatusEntry; 5] = [
    entry("", "all"),
    entry("cash_flow", "cash flow"),
    entry("credit_card", "credit card"),
    entry("debit_card", "debit card"),
    entry("money_transfer", "money transfer"),
];

static GOODS_TYPES: [StatusEntry; 6] = [
    entry("", "all"),
    entry("towel", "towel"),
    entry("line", "line"),
    entry("shirt", "shirt"),
    entry("uniform", "uniform"),
    entry("other", "other"),
];

static GOODS_UNITS: [StatusEntry; 5] = [
    entry("", "all"),
    entry("mm", "mm"),
    entry("square_cm", "square cm"),
    entry("ml", "ml"),
    entry("units", "units"),
];

static RECORD_STATUSES: [StatusEntry; 3] = [
    entry("", "all"),
    entry("active", "active"),
    entry("archived", "archived"),
];

/// Ordered code → label table for `kind`.
pub fn valid_statuses(kind: EntityKind) -> &'static [StatusEntry] {
    match kind {
        EntityKind::Order => &ORDER_STATUSES,
        EntityKind::Job => &JOB_STATUSES,
        EntityKind::Goods => &GOODS_STATUSES,
        EntityKind::PaymentProvider => &PAYMENT_PROVIDERS,
        EntityKind::GoodsType => &GOODS_TYPES,
        EntityKind::GoodsUnit => &GOODS_UNITS,
        EntityKind::Record => &RECORD_STATUSES,
    }
}

/// Accept a registered, non-empty code and return its static form.
pub fn validate(kind: EntityKind, code: &str) -> Result<&'static str, InvalidStatus> {
    if code.is_empty() {
        return Err(InvalidStatus::new(kind, code));
    }
    lookup(kind, code)
}

/// Like [`validate`], but the empty "all" code is accepted too.
pub fn validate_filter(kind: EntityKind, code: &str) -> Result<&'static str, InvalidStatus> {
    lookup(kind, code)
}

fn lookup(kind: EntityKind, code: &str) -> Result<&'static str, InvalidStatus> {
    valid_statuses(kind)
        .iter()
        .find(|e| e.code == code)
        .map(|e| e.code)
        .ok_or_else(|| InvalidStatus::new(kind, code))
}
