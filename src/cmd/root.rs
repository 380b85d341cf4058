use crate::calc::CalendarWindow;
use crate::data::{ConfigFile, Persistable};
use crate::draft::build_generator;
use crate::mail::SystemMailComposer;
use crate::ui::wizard_view::{run_app, App};
use crate::ui::{restore_terminal, setup_terminal};
use crate::wizard::Wizard;
use anyhow::{Context, Result};
use chrono::Local;

pub fn run() -> Result<()> {
    let config = ConfigFile::load()?;
    let settings = config.settings.clone();
    let window = CalendarWindow::standard(config.holiday_table());
    let generator = build_generator(&settings).context("draft provider is misconfigured")?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    let today = Local::now().date_naive();
    tracing::info!(%today, provider = ?settings.draft.provider, "wizard started");
    let mut app = App::new(
        Wizard::from_settings(&settings),
        window,
        today,
        generator,
        Box::new(SystemMailComposer),
    );

    let result = run_app(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;

    tracing::info!(
        submissions = app.wizard().ledger().history().len(),
        "wizard closed"
    );
    result
}
