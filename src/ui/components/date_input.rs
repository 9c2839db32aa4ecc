use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

/// Segment of the date currently being typed, in display order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl DatePart {
    fn width(self) -> usize {
        match self {
            DatePart::Day | DatePart::Month => 2,
            DatePart::Year => 4,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            DatePart::Day => "[DD]",
            DatePart::Month => "[MM]",
            DatePart::Year => "[AAAA]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Day,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.date_part = DatePart::Day;
        self.buffer.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Month,
            DatePart::Month => DatePart::Year,
            DatePart::Year => DatePart::Day,
        };
        self.buffer.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Year,
            DatePart::Month => DatePart::Day,
            DatePart::Year => DatePart::Month,
        };
        self.buffer.clear();
    }

    /// Digits fill the current part; a completed part moves on to the next one.
    pub fn handle_key(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                if self.buffer.len() == self.date_part.width() {
                    self.commit_part();
                    self.next_date_part();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn commit_part(&mut self) {
        let Ok(value) = self.buffer.parse::<u32>() else {
            return;
        };

        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let updated = match self.date_part {
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            DatePart::Month => with_clamped_day(year, value, day),
            DatePart::Year if (1900..=2100).contains(&value) => with_clamped_day(value as i32, month, day),
            DatePart::Year => None,
        };

        if let Some(date) = updated {
            self.date = date;
        }
    }

    pub fn display(&self) -> String {
        let day = format!("{:02}", self.date.day());
        let month = format!("{:02}", self.date.month());
        let year = format!("{:04}", self.date.year());

        if !self.editing {
            return format!("{day}/{month}/{year}");
        }

        let marker = if self.buffer.is_empty() {
            self.date_part.placeholder().to_string()
        } else {
            format!("[{}]", self.buffer)
        };
        match self.date_part {
            DatePart::Day => format!("{marker}/{month}/{year}"),
            DatePart::Month => format!("{day}/{marker}/{year}"),
            DatePart::Year => format!("{day}/{month}/{marker}"),
        }
    }
}

// Keeps e.g. 31/01 -> month 02 valid by falling back to the last day of the month.
fn with_clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .take(4)
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn types_a_full_date() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        state.toggle_editing();
        typing(&mut state, "15031990");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(1990, 3, 15).unwrap());
        assert_eq!(state.date_part, DatePart::Day);
    }

    #[test]
    fn ignores_keys_when_not_editing() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        typing(&mut state, "15");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn month_change_clamps_day() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2001, 1, 31).unwrap());
        state.toggle_editing();
        state.next_date_part();
        typing(&mut state, "02");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2001, 2, 28).unwrap());
    }

    #[test]
    fn rejects_out_of_range_parts() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        state.toggle_editing();
        typing(&mut state, "32");
        typing(&mut state, "13");
        typing(&mut state, "1800");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn display_marks_current_part() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(1990, 3, 5).unwrap());
        assert_eq!(state.display(), "05/03/1990");
        state.toggle_editing();
        assert_eq!(state.display(), "[DD]/03/1990");
        typing(&mut state, "1");
        assert_eq!(state.display(), "[1]/03/1990");
    }
}
