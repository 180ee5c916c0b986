// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const MIN_HOURS: f64 = 0.25;
pub const MAX_HOURS: f64 = 24.0;
pub const HOURS_STEP: f64 = 0.25;
pub const DEFAULT_ENTRY_HOURS: f64 = 1.0;

/// Display form used in hour inputs: empty for zero, comma as decimal separator.
pub fn format_number_with_comma(value: f64) -> String {
    if value == 0.0 {
        return String::new();
    }
    value.to_string().replacen('.', ",", 1)
}

/// Reads a typed hour value. Empty input means zero; `None` means the caller
/// should keep whatever numeric value it already had.
pub fn parse_decimal_input(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    let sanitized = raw.replacen(',', ".", 1);
    parse_leading_float(&sanitized)
}

/// Integer display for whole hours, two decimals otherwise.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}")
    }
}

pub fn clamp_hours(hours: f64) -> f64 {
    if hours.is_nan() {
        return MIN_HOURS;
    }
    hours.clamp(MIN_HOURS, MAX_HOURS)
}

pub fn step_hours_up(hours: f64) -> f64 {
    (hours + HOURS_STEP).min(MAX_HOURS)
}

pub fn step_hours_down(hours: f64) -> f64 {
    (hours - HOURS_STEP).max(MIN_HOURS)
}

fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0usize;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if trimmed[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0usize;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    let mut number = trimmed[..end].to_owned();
    if number.ends_with('.') {
        number.push('0');
    }
    if let Some(rest) = number.strip_prefix('.') {
        number = format!("0.{rest}");
    } else if let Some(rest) = number.strip_prefix("-.") {
        number = format!("-0.{rest}");
    } else if let Some(rest) = number.strip_prefix("+.") {
        number = format!("0.{rest}");
    }
    number.parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// Text field paired with the last numeric value it parsed to.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursInput {
    hours: f64,
    text: String,
}

impl HoursInput {
    pub fn new(hours: f64) -> Self {
        Self {
            hours,
            text: format_number_with_comma(hours),
        }
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Echoes the raw text; only a parseable value replaces the number.
    pub fn input(&mut self, raw: &str) {
        self.text = raw.to_owned();
        if let Some(parsed) = parse_decimal_input(raw) {
            self.hours = parsed;
        }
    }

    pub fn push_char(&mut self, ch: char) {
        let mut raw = self.text.clone();
        raw.push(ch);
        self.input(&raw);
    }

    pub fn pop_char(&mut self) {
        let mut raw = self.text.clone();
        raw.pop();
        self.input(&raw);
    }

    pub fn blur(&mut self) {
        self.set(clamp_hours(self.hours));
    }

    pub fn step_up(&mut self) {
        self.set(step_hours_up(self.hours));
    }

    pub fn step_down(&mut self) {
        self.set(step_hours_down(self.hours));
    }

    pub fn set(&mut self, hours: f64) {
        self.hours = hours;
        self.text = format_number_with_comma(hours);
    }
}

impl Default for HoursInput {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        HoursInput, clamp_hours, format_hours, format_number_with_comma, parse_decimal_input,
        step_hours_down, step_hours_up,
    };

    #[test]
    fn format_uses_comma_and_blank_zero() {
        assert_eq!(format_number_with_comma(0.0), "");
        assert_eq!(format_number_with_comma(2.5), "2,5");
        assert_eq!(format_number_with_comma(1.0), "1");
        assert_eq!(format_number_with_comma(0.25), "0,25");
    }

    #[test]
    fn parse_accepts_comma_and_dot() {
        assert_eq!(parse_decimal_input(""), Some(0.0));
        assert_eq!(parse_decimal_input("2,5"), Some(2.5));
        assert_eq!(parse_decimal_input("2.5"), Some(2.5));
        assert_eq!(parse_decimal_input(",5"), Some(0.5));
        assert_eq!(parse_decimal_input("7,"), Some(7.0));
        assert_eq!(parse_decimal_input("  3"), Some(3.0));
    }

    #[test]
    fn parse_reads_leading_number_and_ignores_rest() {
        assert_eq!(parse_decimal_input("2,5t"), Some(2.5));
        assert_eq!(parse_decimal_input("1,5,3"), Some(1.5));
        assert_eq!(parse_decimal_input("1e1"), Some(10.0));
        assert_eq!(parse_decimal_input("1e"), Some(1.0));
    }

    #[test]
    fn parse_rejects_non_numbers() {
        assert_eq!(parse_decimal_input("abc"), None);
        assert_eq!(parse_decimal_input(","), None);
        assert_eq!(parse_decimal_input("-"), None);
        assert_eq!(parse_decimal_input(" "), None);
    }

    #[test]
    fn format_parse_format_is_stable_for_quarter_hours() {
        let mut hours = 0.0;
        while hours <= 24.0 {
            let shown = format_number_with_comma(hours);
            let parsed = parse_decimal_input(&shown).expect("formatted hours parse");
            assert_eq!(format_number_with_comma(parsed), shown, "hours {hours}");
            hours += 0.25;
        }
        for hours in [0.3, 1.15, 7.05, 12.99] {
            let shown = format_number_with_comma(hours);
            let parsed = parse_decimal_input(&shown).expect("formatted hours parse");
            assert_eq!(format_number_with_comma(parsed), shown, "hours {hours}");
        }
    }

    #[test]
    fn hours_display_drops_decimals_for_whole_values() {
        assert_eq!(format_hours(2.0), "2");
        assert_eq!(format_hours(2.5), "2.50");
        assert_eq!(format_hours(0.25), "0.25");
        assert_eq!(format_hours(0.0), "0");
    }

    #[test]
    fn clamp_and_step_stay_in_range() {
        assert_eq!(clamp_hours(30.0), 24.0);
        assert_eq!(clamp_hours(0.0), 0.25);
        assert_eq!(clamp_hours(f64::NAN), 0.25);
        assert_eq!(step_hours_up(23.9), 24.0);
        assert_eq!(step_hours_up(1.0), 1.25);
        assert_eq!(step_hours_down(0.3), 0.25);
        assert_eq!(step_hours_down(2.0), 1.75);
    }

    #[test]
    fn blur_clamps_out_of_range_values() {
        let mut input = HoursInput::default();
        input.input("30");
        assert_eq!(input.hours(), 30.0);
        input.blur();
        assert_eq!(input.hours(), 24.0);
        assert_eq!(input.text(), "24");

        input.input("0");
        input.blur();
        assert_eq!(input.hours(), 0.25);
        assert_eq!(input.text(), "0,25");
    }

    #[test]
    fn invalid_keystrokes_keep_previous_value_until_blur() {
        let mut input = HoursInput::new(2.5);
        input.input("abc");
        assert_eq!(input.text(), "abc");
        assert_eq!(input.hours(), 2.5);
        input.blur();
        assert_eq!(input.text(), "2,5");
    }

    #[test]
    fn typing_char_by_char_tracks_value() {
        let mut input = HoursInput::new(0.0);
        assert_eq!(input.text(), "");
        for ch in "3,75".chars() {
            input.push_char(ch);
        }
        assert_eq!(input.hours(), 3.75);
        input.pop_char();
        assert_eq!(input.text(), "3,7");
        assert_eq!(input.hours(), 3.7);
    }

    #[test]
    fn arrow_steps_redisplay_value() {
        let mut input = HoursInput::new(23.9);
        input.step_up();
        assert_eq!(input.hours(), 24.0);
        input.step_down();
        assert_eq!(input.text(), "23,75");
    }
}
