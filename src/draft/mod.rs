//! Notification drafts: the input handed to a generator, the subject/body it
//! returns, and the generators themselves.

pub mod gemini;
pub mod template;

use crate::data::app_settings::{AppSettings, DraftProvider};
use crate::data::labels::{half_day_label_zh, leave_type_label};
use crate::data::{DurationMode, HalfDayPeriod, LeaveRequest, LeaveType};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use gemini::GeminiDraftGenerator;
pub use template::TemplateDraftGenerator;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Draft {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DraftError {
    #[error("missing dates or leave type")]
    MissingInput,
    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),
    #[error("draft request timed out")]
    Timeout,
    #[error("draft request failed: {0}")]
    Transport(String),
    #[error("draft service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("draft service returned no text")]
    EmptyResponse,
    #[error("could not parse draft: {0}")]
    Unparsable(String),
}

/// Everything a generator may use to write the notification.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftInput {
    pub user_name: String,
    pub leave_type: Option<LeaveType>,
    pub dates: Vec<NaiveDate>,
    pub duration_mode: DurationMode,
    pub half_day_period: Option<HalfDayPeriod>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub remaining_annual_days: f64,
}

impl DraftInput {
    pub fn from_request(request: &LeaveRequest, remaining_annual_days: f64, user_name: &str) -> Self {
        let hours = request.hours_if_active();
        DraftInput {
            user_name: user_name.to_string(),
            leave_type: request.leave_type,
            dates: request.dates().to_vec(),
            duration_mode: request.duration_mode,
            half_day_period: request.half_day_period_if_active(),
            start_time: hours.map(|(s, _)| s),
            end_time: hours.map(|(_, e)| e),
            remaining_annual_days,
        }
    }

    /// The leave type, or `MissingInput` when the request is incomplete.
    pub fn require_complete(&self) -> Result<LeaveType, DraftError> {
        match self.leave_type {
            Some(t) if !self.dates.is_empty() => Ok(t),
            _ => Err(DraftError::MissingInput),
        }
    }

    pub fn leave_type_label(&self) -> &'static str {
        self.leave_type.map(leave_type_label).unwrap_or("")
    }

    pub fn date_strings(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format("%Y/%m/%d").to_string())
            .collect()
    }

    pub fn dates_display(&self) -> String {
        self.date_strings().join(", ")
    }

    /// e.g. `2 天 (Whole Days)`, `1 x 0.5 天 (下午)`, `09:00 ~ 13:00 (per day for 1 days)`.
    pub fn time_description(&self) -> String {
        let n = self.dates.len();
        match self.duration_mode {
            DurationMode::FullDay => {
                format!("{} 天 (Whole Day{})", n, if n > 1 { "s" } else { "" })
            }
            DurationMode::HalfDay => {
                let period = self.half_day_period.unwrap_or_default();
                format!("{} x 0.5 天 ({})", n, half_day_label_zh(period))
            }
            DurationMode::Hourly => {
                let fmt = |t: Option<NaiveTime>| {
                    t.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
                };
                format!(
                    "{} ~ {} (per day for {} days)",
                    fmt(self.start_time),
                    fmt(self.end_time),
                    n
                )
            }
        }
    }
}

/// Produces a subject/body pair. Implementations may block; the UI runs them
/// off the render thread.
pub trait DraftGenerator: Send + Sync {
    fn generate(&self, input: &DraftInput) -> Result<Draft, DraftError>;
}

/// Tries `primary`, and on any failure other than incomplete input falls back
/// to the local template. Only wired in when explicitly configured.
pub struct FallbackDraftGenerator {
    primary: Box<dyn DraftGenerator>,
    fallback: TemplateDraftGenerator,
}

impl FallbackDraftGenerator {
    pub fn new(primary: Box<dyn DraftGenerator>) -> Self {
        FallbackDraftGenerator {
            primary,
            fallback: TemplateDraftGenerator,
        }
    }
}

impl DraftGenerator for FallbackDraftGenerator {
    fn generate(&self, input: &DraftInput) -> Result<Draft, DraftError> {
        match self.primary.generate(input) {
            Ok(draft) => Ok(draft),
            Err(DraftError::MissingInput) => Err(DraftError::MissingInput),
            Err(e) => {
                tracing::warn!(error = %e, "draft provider failed, using local template");
                self.fallback.generate(input)
            }
        }
    }
}

/// Builds the generator named in the settings.
pub fn build_generator(settings: &AppSettings) -> anyhow::Result<Arc<dyn DraftGenerator>> {
    let primary: Box<dyn DraftGenerator> = match settings.draft.provider {
        DraftProvider::Template => Box::new(TemplateDraftGenerator),
        DraftProvider::Gemini => Box::new(GeminiDraftGenerator::from_settings(&settings.draft)?),
    };
    if settings.draft.fallback_to_template && settings.draft.provider != DraftProvider::Template {
        tracing::info!("draft fallback to local template enabled");
        return Ok(Arc::new(FallbackDraftGenerator::new(primary)));
    }
    Ok(Arc::from(primary))
}
