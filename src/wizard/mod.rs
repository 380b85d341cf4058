//! The four-step request flow: Type -> Date -> Duration -> Review.
//!
//! `Wizard` owns the in-progress request, the draft for the current review,
//! and the ledger. Disallowed actions are no-ops that return `false`/`None`;
//! the UI disables the matching controls using the `can_*` queries.

use crate::calc::duration::compute_days;
use crate::data::app_settings::AppSettings;
use crate::data::{DurationMode, HalfDayPeriod, Ledger, LeaveRequest, LeaveType};
use crate::draft::{Draft, DraftError, DraftInput};
use crate::mail::MailComposer;
use chrono::{NaiveDate, NaiveTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Type,
    Date,
    Duration,
    Review,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Type, Step::Date, Step::Duration, Step::Review];

    /// 1-based position shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            Step::Type => 1,
            Step::Date => 2,
            Step::Duration => 3,
            Step::Review => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Type => "Leave Type",
            Step::Date => "Date",
            Step::Duration => "Duration",
            Step::Review => "Review",
        }
    }
}

/// Outcome of the draft request issued on entering Review.
#[derive(Clone, Debug, PartialEq)]
pub enum DraftState {
    Pending { ticket: u64 },
    Ready(Draft),
    Failed(String),
}

/// A draft generation the caller must run and report back with
/// [`Wizard::resolve_draft`].
#[derive(Clone, Debug, PartialEq)]
pub struct DraftRequest {
    pub ticket: u64,
    pub input: DraftInput,
}

/// What a successful submit recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub leave_type: LeaveType,
    pub days: f64,
    pub date_label: String,
    pub draft: Draft,
}

/// Blocking yes/no question asked before destructive actions.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmPrompt for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

pub const RESET_PROMPT: &str = "Reset all statistics and history?";

pub struct Wizard {
    step: Step,
    request: LeaveRequest,
    draft: Option<DraftState>,
    ledger: Ledger,
    user_name: String,
    recipient: String,
    next_ticket: u64,
}

impl Wizard {
    pub fn new(ledger: Ledger, user_name: &str, recipient: &str) -> Self {
        Wizard {
            step: Step::Type,
            request: LeaveRequest::default(),
            draft: None,
            ledger,
            user_name: user_name.to_string(),
            recipient: recipient.to_string(),
            next_ticket: 1,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            Ledger::create(settings.quota),
            &settings.user_name,
            &settings.recipient,
        )
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn request(&self) -> &LeaveRequest {
        &self.request
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn draft_state(&self) -> Option<&DraftState> {
        self.draft.as_ref()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn is_draft_pending(&self) -> bool {
        matches!(self.draft, Some(DraftState::Pending { .. }))
    }

    /// Days the current request would charge.
    pub fn days(&self) -> f64 {
        compute_days(&self.request)
    }

    // ── Step 1: type ──────────────────────────────────────────────────────────

    /// Picking a type advances straight to Date.
    pub fn choose_leave_type(&mut self, leave_type: LeaveType) -> bool {
        if self.step != Step::Type {
            return false;
        }
        self.request.leave_type = Some(leave_type);
        self.step = Step::Date;
        true
    }

    // ── Step 2: dates ─────────────────────────────────────────────────────────

    /// The caller has already rejected past and out-of-window dates.
    pub fn select_date(&mut self, date: NaiveDate, multi: bool) -> bool {
        if self.step != Step::Date {
            return false;
        }
        self.request.select_date(date, multi);
        true
    }

    pub fn can_confirm_dates(&self) -> bool {
        self.step == Step::Date && !self.request.dates().is_empty()
    }

    pub fn confirm_dates(&mut self) -> bool {
        if !self.can_confirm_dates() {
            return false;
        }
        self.step = Step::Duration;
        true
    }

    // ── Step 3: duration ──────────────────────────────────────────────────────

    pub fn set_duration_mode(&mut self, mode: DurationMode) -> bool {
        if self.step != Step::Duration {
            return false;
        }
        self.request.duration_mode = mode;
        true
    }

    pub fn set_half_day_period(&mut self, period: HalfDayPeriod) -> bool {
        if self.step != Step::Duration {
            return false;
        }
        self.request.half_day_period = period;
        true
    }

    pub fn set_hours(&mut self, start: NaiveTime, end: NaiveTime) -> bool {
        if self.step != Step::Duration {
            return false;
        }
        self.request.start_time = start;
        self.request.end_time = end;
        true
    }

    /// Enters Review in the pending sub-state and returns the generation the
    /// caller must run. One outstanding request per Review entry.
    pub fn request_review(&mut self) -> Option<DraftRequest> {
        if self.step != Step::Duration {
            return None;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.step = Step::Review;
        self.draft = Some(DraftState::Pending { ticket });
        let input = DraftInput::from_request(
            &self.request,
            self.ledger.remaining_annual(),
            &self.user_name,
        );
        tracing::debug!(ticket, "draft requested");
        Some(DraftRequest { ticket, input })
    }

    /// Stores the generator's outcome. Results for any ticket other than the
    /// outstanding one are dropped.
    pub fn resolve_draft(&mut self, ticket: u64, result: Result<Draft, DraftError>) -> bool {
        match self.draft {
            Some(DraftState::Pending { ticket: t }) if t == ticket && self.step == Step::Review => {}
            _ => {
                tracing::debug!(ticket, "stale draft result ignored");
                return false;
            }
        }
        self.draft = Some(match result {
            Ok(draft) => DraftState::Ready(draft),
            Err(e) => {
                tracing::warn!(ticket, error = %e, "draft generation failed");
                DraftState::Failed(e.to_string())
            }
        });
        true
    }

    // ── Step 4: review ────────────────────────────────────────────────────────

    pub fn can_go_back(&self) -> bool {
        self.step == Step::Review && !self.is_draft_pending()
    }

    /// Review -> Duration, keeping the collected request. A pending draft
    /// cannot be abandoned.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.step = Step::Duration;
        self.draft = None;
        true
    }

    pub fn can_submit(&self) -> bool {
        self.step == Step::Review
            && self.request.leave_type.is_some()
            && matches!(self.draft, Some(DraftState::Ready(_)))
    }

    /// Records the leave, hands the draft to `mail`, and starts over at Type.
    pub fn submit(&mut self, mail: &dyn MailComposer) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let leave_type = self.request.leave_type?;
        let draft = match self.draft.take() {
            Some(DraftState::Ready(d)) => d,
            _ => return None,
        };

        let days = self.days();
        let date_label = self.request.date_label();
        self.ledger.record_submission(leave_type, days, &date_label);

        if let Err(e) = mail.compose(&self.recipient, &draft) {
            tracing::warn!(error = %e, "mail handoff failed");
        }

        self.request = LeaveRequest::default();
        self.step = Step::Type;
        Some(Submission {
            leave_type,
            days,
            date_label,
            draft,
        })
    }

    /// Clears all usage and history, but only if `prompt` agrees.
    pub fn reset_statistics(&mut self, prompt: &mut dyn ConfirmPrompt) -> bool {
        if !prompt.confirm(RESET_PROMPT) {
            tracing::debug!("statistics reset declined");
            return false;
        }
        self.ledger.reset();
        true
    }
}
