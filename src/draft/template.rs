use crate::draft::{Draft, DraftError, DraftGenerator, DraftInput};

/// Deterministic draft built from the request alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateDraftGenerator;

impl DraftGenerator for TemplateDraftGenerator {
    fn generate(&self, input: &DraftInput) -> Result<Draft, DraftError> {
        input.require_complete()?;

        let dates = input.date_strings();
        let subject_date = match dates.as_slice() {
            [only] => only.clone(),
            [first, ..] => format!("{}...", first),
            [] => String::new(),
        };

        let subject = format!("請假通知 - {} - {}", input.user_name, subject_date);
        let body = format!(
            "Hi,\n\n{user} 請假申請:\n- 項目: {kind}\n- 日期: {dates}\n- 時間: {time}\n\nThanks,\n{user}",
            user = input.user_name,
            kind = input.leave_type_label(),
            dates = input.dates_display(),
            time = input.time_description(),
        );
        Ok(Draft { subject, body })
    }
}
