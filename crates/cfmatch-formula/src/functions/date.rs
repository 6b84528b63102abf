//! Date functions
//!
//! Dates are Excel serial numbers in the 1900 date system, including the historical
//! "1900 leap year" bug: serial 60 is the non-existent 1900-02-29, so every serial from
//! 61 on is one day ahead of a plain day count from 1899-12-31.

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use chrono::{Datelike, Months, NaiveDate};
use cfmatch_core::CellError;

/// `num_days_from_ce` of 1899-12-30, the day count origin for serials >= 61
const SERIAL_EPOCH_DAYS: i32 = 693_594;

/// Serial of 1900-03-01, the first day after the fictional leap day
const FIRST_SERIAL_AFTER_BUG: i64 = 61;

/// Serial of 9999-12-31, the last date DATE can produce
const MAX_SERIAL: f64 = 2_958_465.0;

/// Excel serial number of a calendar date
///
/// ```
/// use chrono::NaiveDate;
/// use cfmatch_formula::functions::date::date_to_serial;
///
/// assert_eq!(date_to_serial(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()), 1.0);
/// assert_eq!(date_to_serial(NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()), 61.0);
/// assert_eq!(date_to_serial(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 45292.0);
/// ```
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let days = (date.num_days_from_ce() - SERIAL_EPOCH_DAYS) as i64;
    let serial = if days < FIRST_SERIAL_AFTER_BUG {
        days - 1
    } else {
        days
    };
    serial as f64
}

/// Calendar date of an Excel serial; the time fraction is dropped
///
/// Returns `None` for negative serials, serial 60 (1900-02-29 never existed) and serials
/// past the calendar's range.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let serial = serial.floor() as i64;
    let days = match serial {
        60 => return None,
        s if s < 60 => s + 1,
        s => s,
    };
    let days = i32::try_from(days).ok()?;
    NaiveDate::from_num_days_from_ce_opt(SERIAL_EPOCH_DAYS.checked_add(days)?)
}

/// Year/month/day of a serial, with serial 60 reported as 1900-02-29
fn serial_to_ymd(serial: f64) -> Option<(i32, u32, u32)> {
    if serial.is_finite() && serial.floor() == 60.0 {
        return Some((1900, 2, 29));
    }
    serial_to_date(serial).map(|d| (d.year(), d.month(), d.day()))
}

/// Serial-number argument: errors pass through, non-numeric text is `#VALUE!`
fn serial_arg(v: &FormulaValue) -> Result<f64, FormulaValue> {
    match v {
        FormulaValue::Error(e) => Err(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Err(FormulaValue::Error(CellError::Value)),
        v => v.as_number().ok_or(FormulaValue::Error(CellError::Value)),
    }
}

macro_rules! try_serial {
    ($e:expr) => {
        match serial_arg($e) {
            Ok(n) => n,
            Err(err) => return Ok(err),
        }
    };
}

/// Shared YEAR/MONTH/DAY body
fn date_part(
    args: &[FormulaValue],
    part: impl Fn((i32, u32, u32)) -> f64,
) -> FormulaResult<FormulaValue> {
    let serial = try_serial!(&args[0]);
    Ok(match serial_to_ymd(serial) {
        Some(ymd) => FormulaValue::Number(part(ymd)),
        None => FormulaValue::Error(CellError::Num),
    })
}

/// DATE(year, month, day)
///
/// Years 0..1899 are offset by 1900; month and day overflow roll into the next
/// month/year the way Excel does (`DATE(2024,13,1)` is 2025-01-01).
pub fn fn_date(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let mut parts = [0i64; 3];
    for (slot, v) in parts.iter_mut().zip(args) {
        *slot = try_serial!(v).trunc() as i64;
    }
    let [mut year, month, day] = parts;

    if (0..1900).contains(&year) {
        year += 1900;
    }
    if !(0..=9999).contains(&year) {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    // Normalize month overflow/underflow using a 0-based month index
    let normalized = year
        .checked_mul(12)
        .and_then(|months| months.checked_add(month))
        .and_then(|months| months.checked_sub(1))
        .and_then(|total| {
            let norm_year = i32::try_from(total.div_euclid(12)).ok()?;
            let norm_month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
            NaiveDate::from_ymd_opt(norm_year, norm_month, 1)
        });
    let Some(first) = normalized else {
        return Ok(FormulaValue::Error(CellError::Num));
    };

    // Count days in serial space so DATE(1900,2,29) lands on serial 60
    let serial = date_to_serial(first) + (day as f64 - 1.0);
    if !(0.0..=MAX_SERIAL).contains(&serial) {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    Ok(FormulaValue::Number(serial))
}

/// YEAR(serial)
pub fn fn_year(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    date_part(args, |(y, _, _)| y as f64)
}

/// MONTH(serial)
pub fn fn_month(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    date_part(args, |(_, m, _)| m as f64)
}

/// DAY(serial)
pub fn fn_day(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    date_part(args, |(_, _, d)| d as f64)
}

/// WEEKDAY(serial, [return_type])
///
/// return_type 1 (default): Sunday = 1 .. Saturday = 7; 2: Monday = 1 .. Sunday = 7;
/// 3: Monday = 0 .. Sunday = 6.
pub fn fn_weekday(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let serial = try_serial!(&args[0]);
    if serial < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }
    let return_type = match args.get(1) {
        Some(v) => try_serial!(v).trunc() as i64,
        None => 1,
    };

    // Serial 1 (1900-01-01) is a Sunday in Excel's calendar
    let sunday_based = (serial.floor() as i64 - 1).rem_euclid(7); // 0 = Sunday
    let monday_based = (sunday_based + 6) % 7; // 0 = Monday

    let result = match return_type {
        1 => sunday_based + 1,
        2 => monday_based + 1,
        3 => monday_based,
        _ => return Ok(FormulaValue::Error(CellError::Num)),
    };
    Ok(FormulaValue::Number(result as f64))
}

/// EDATE(start_date, months) - same day `months` months away, clamped to month end
pub fn fn_edate(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let serial = try_serial!(&args[0]);
    let months = try_serial!(&args[1]).trunc() as i64;

    let start = match serial_to_date(serial) {
        Some(d) => d,
        None => return Ok(FormulaValue::Error(CellError::Num)),
    };

    let shifted = match u32::try_from(months.unsigned_abs()) {
        Ok(m) if months >= 0 => start.checked_add_months(Months::new(m)),
        Ok(m) => start.checked_sub_months(Months::new(m)),
        Err(_) => None,
    };

    Ok(match shifted {
        Some(d) => FormulaValue::Number(date_to_serial(d)),
        None => FormulaValue::Error(CellError::Num),
    })
}

/// TODAY() - the context's date as a serial number
pub fn fn_today(_args: &[FormulaValue], ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(date_to_serial(ctx.today)))
}
