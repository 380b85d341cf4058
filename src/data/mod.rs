pub mod app_settings;
pub mod holiday;
pub mod labels;
pub mod leave;
pub mod ledger;
pub mod persistence;

pub use app_settings::ConfigFile;
pub use holiday::HolidayTable;
pub use leave::{DurationMode, HalfDayPeriod, LeaveRequest, LeaveType};
pub use ledger::Ledger;
pub use persistence::Persistable;
