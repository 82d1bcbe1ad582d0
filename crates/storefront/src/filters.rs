//! Askama filters for the storefront templates.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{Datelike, Utc};

/// Copyright span for the footer.
///
/// `{{ 2021|copyright_years }}` renders `2021-2026`, or just the year when the
/// founding year is the current one. Input that is not a year falls back to
/// the current year.
#[askama::filter_fn]
pub fn copyright_years(founded: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(year_span(&founded.to_string(), Utc::now().year()))
}

fn year_span(founded: &str, current: i32) -> String {
    match founded.trim().parse::<i32>() {
        Ok(year) if year < current => format!("{year}-{current}"),
        _ => current.to_string(),
    }
}
