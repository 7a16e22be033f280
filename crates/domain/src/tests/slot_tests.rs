// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, TimeSlot, format_time, parse_date, parse_time};
use time::macros::{date, time};

#[test]
fn test_slot_rejects_inverted_and_empty() {
    assert!(matches!(
        TimeSlot::new(time!(11:00), time!(10:00)),
        Err(DomainError::InvalidTimeSlot { .. })
    ));
    assert!(matches!(
        TimeSlot::new(time!(10:00), time!(10:00)),
        Err(DomainError::InvalidTimeSlot { .. })
    ));
}

#[test]
fn test_back_to_back_slots_do_not_overlap() {
    let first: TimeSlot = TimeSlot::parse("10:00", "11:00").unwrap();
    let second: TimeSlot = TimeSlot::parse("11:00", "12:00").unwrap();
    assert!(!first.overlaps(&second));
    assert!(!second.overlaps(&first));
}

#[test]
fn test_partial_and_nested_overlap() {
    let base: TimeSlot = TimeSlot::parse("10:00", "12:00").unwrap();
    let partial: TimeSlot = TimeSlot::parse("11:30", "13:00").unwrap();
    let nested: TimeSlot = TimeSlot::parse("10:15", "10:45").unwrap();
    assert!(base.overlaps(&partial));
    assert!(partial.overlaps(&base));
    assert!(base.overlaps(&nested));
    assert!(nested.overlaps(&base));
    assert!(base.overlaps(&base));
}

#[test]
fn test_duration_minutes() {
    let slot: TimeSlot = TimeSlot::parse("09:30", "11:00").unwrap();
    assert_eq!(slot.duration_minutes(), 90);
}

#[test]
fn test_ensure_within_opening_hours() {
    let slot: TimeSlot = TimeSlot::parse("08:00", "09:00").unwrap();
    assert!(slot.ensure_within(time!(8:00), time!(22:00)).is_ok());
    assert!(matches!(
        slot.ensure_within(time!(8:30), time!(22:00)),
        Err(DomainError::OutsideOpeningHours { .. })
    ));

    let late: TimeSlot = TimeSlot::parse("21:00", "22:00").unwrap();
    assert!(late.ensure_within(time!(8:00), time!(22:00)).is_ok());
    assert!(late.ensure_within(time!(8:00), time!(21:30)).is_err());
}

#[test]
fn test_parse_date_and_time() {
    assert_eq!(parse_date("2026-10-20").unwrap(), date!(2026 - 10 - 20));
    assert_eq!(parse_time("07:05").unwrap(), time!(7:05));
    assert!(matches!(
        parse_date("20/10/2026"),
        Err(DomainError::InvalidDate { .. })
    ));
    assert!(matches!(
        parse_time("25:00"),
        Err(DomainError::InvalidTime { .. })
    ));
    assert_eq!(format_time(time!(7:05)), "07:05");
}

#[test]
fn test_slot_serializes_as_start_and_end_time() {
    let slot: TimeSlot = TimeSlot::parse("10:00", "11:30").unwrap();
    let value: serde_json::Value = serde_json::to_value(slot).unwrap();
    assert_eq!(value["start_time"], "10:00");
    assert_eq!(value["end_time"], "11:30");
    assert_eq!(slot.to_string(), "10:00-11:30");
}
