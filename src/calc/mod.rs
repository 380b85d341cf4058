pub mod calendar;
pub mod duration;
pub mod selection;

pub use calendar::CalendarWindow;
