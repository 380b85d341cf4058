use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(name: &str, date: NaiveDate) -> Self {
        Holiday {
            date,
            name: name.to_string(),
        }
    }
}

/// Built-in holidays for the Dec 2025 - Dec 2026 scheduling cycle.
/// Exact dates only; nothing here is derived from a recurrence rule.
const BUILTIN_HOLIDAYS: &[(i32, u32, u32, &str)] = &[
    (2025, 12, 25, "行憲紀念日"),
    (2026, 1, 1, "元旦"),
    (2026, 2, 16, "小年夜"),
    (2026, 2, 17, "除夕"),
    (2026, 2, 18, "春節"),
    (2026, 2, 19, "初二"),
    (2026, 2, 20, "初三"),
    (2026, 2, 28, "和平紀念日"),
    (2026, 4, 4, "兒童節"),
    (2026, 4, 5, "清明節"),
    (2026, 5, 1, "勞動節"),
    (2026, 6, 19, "端午節"),
    (2026, 9, 25, "中秋節"),
    (2026, 9, 28, "教師節"),
    (2026, 10, 10, "國慶日"),
    (2026, 10, 25, "光復節"),
    (2026, 12, 25, "行憲紀念日"),
];

/// Immutable date -> label lookup.
#[derive(Clone, Debug, Default)]
pub struct HolidayTable {
    holidays: Vec<Holiday>,
    index: HashMap<NaiveDate, usize>,
}

impl HolidayTable {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        let index = holidays
            .iter()
            .enumerate()
            .map(|(i, h)| (h.date, i))
            .collect();
        HolidayTable { holidays, index }
    }

    pub fn builtin() -> Self {
        let holidays = BUILTIN_HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d, name)| {
                NaiveDate::from_ymd_opt(y, m, d).map(|date| Holiday::new(name, date))
            })
            .collect();
        Self::new(holidays)
    }

    pub fn label_for(&self, date: NaiveDate) -> Option<&str> {
        self.index
            .get(&date)
            .and_then(|&i| self.holidays.get(i))
            .map(|h| h.name.as_str())
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}
