use crate::calc::duration::round2;
use crate::data::LeaveType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct QuotaBucket {
    pub total: f64,
    pub used: f64,
}

impl QuotaBucket {
    pub fn new(total: f64, used: f64) -> Self {
        QuotaBucket { total, used }
    }

    /// May go negative: overdraw is accepted.
    pub fn remaining(&self) -> f64 {
        round2(self.total - self.used)
    }
}

/// Starting values for the three buckets; `reset` returns to these.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct QuotaSeed {
    pub annual: QuotaBucket,
    pub sick: QuotaBucket,
    pub birthday: QuotaBucket,
}

impl Default for QuotaSeed {
    fn default() -> Self {
        QuotaSeed {
            annual: QuotaBucket::new(12.0, 0.0),
            sick: QuotaBucket::new(0.0, 0.0),
            birthday: QuotaBucket::new(1.0, 0.0),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub leave_type: LeaveType,
    pub duration_days: f64,
    pub date_label: String,
}

/// Point-in-time copy of the ledger for display.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerSnapshot {
    pub annual: QuotaBucket,
    pub sick: QuotaBucket,
    pub birthday: QuotaBucket,
    pub history: Vec<HistoryEntry>,
}

impl LedgerSnapshot {
    pub fn bucket(&self, leave_type: LeaveType) -> QuotaBucket {
        match leave_type {
            LeaveType::Annual => self.annual,
            LeaveType::Sick => self.sick,
            LeaveType::Birthday => self.birthday,
        }
    }
}

/// Per-category quota usage plus the newest-first submission history.
///
/// Pure accumulation: submissions are never checked against `total`.
#[derive(Clone, Debug)]
pub struct Ledger {
    seed: QuotaSeed,
    annual: QuotaBucket,
    sick: QuotaBucket,
    birthday: QuotaBucket,
    history: Vec<HistoryEntry>,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::create(QuotaSeed::default())
    }
}

impl Ledger {
    pub fn create(seed: QuotaSeed) -> Self {
        Ledger {
            seed,
            annual: seed.annual,
            sick: seed.sick,
            birthday: seed.birthday,
            history: Vec::new(),
            next_id: 1,
        }
    }

    pub fn bucket(&self, leave_type: LeaveType) -> QuotaBucket {
        match leave_type {
            LeaveType::Annual => self.annual,
            LeaveType::Sick => self.sick,
            LeaveType::Birthday => self.birthday,
        }
    }

    fn bucket_mut(&mut self, leave_type: LeaveType) -> &mut QuotaBucket {
        match leave_type {
            LeaveType::Annual => &mut self.annual,
            LeaveType::Sick => &mut self.sick,
            LeaveType::Birthday => &mut self.birthday,
        }
    }

    pub fn remaining_annual(&self) -> f64 {
        self.bucket(LeaveType::Annual).remaining()
    }

    pub fn record_submission(
        &mut self,
        leave_type: LeaveType,
        days: f64,
        date_label: &str,
    ) -> &HistoryEntry {
        let bucket = self.bucket_mut(leave_type);
        bucket.used = round2(bucket.used + days);
        let used = bucket.used;
        let total = bucket.total;

        let entry = HistoryEntry {
            id: self.next_id,
            leave_type,
            duration_days: days,
            date_label: date_label.to_string(),
        };
        self.next_id += 1;
        tracing::info!(?leave_type, days, used, total, dates = %date_label, "leave recorded");
        if used > total {
            tracing::info!(?leave_type, over_by = round2(used - total), "quota exceeded");
        }
        self.history.insert(0, entry);
        &self.history[0]
    }

    /// Irreversible. Callers obtain confirmation first.
    pub fn reset(&mut self) {
        self.annual = self.seed.annual;
        self.sick = self.seed.sick;
        self.birthday = self.seed.birthday;
        self.history.clear();
        tracing::info!("ledger reset to seed values");
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_for(&self, leave_type: LeaveType) -> Vec<&HistoryEntry> {
        self.history
            .iter()
            .filter(|h| h.leave_type == leave_type)
            .collect()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            annual: self.annual,
            sick: self.sick,
            birthday: self.birthday,
            history: self.history.clone(),
        }
    }
}
