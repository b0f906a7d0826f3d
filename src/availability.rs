//! Slot grids and day classification.
//!
//! Both the booking surface and the barber agenda resolve bookable slots
//! through the same pure functions here; the store pre-filters what it
//! offers, but remains the authority on races (a create can still be
//! rejected with a conflict after a stale read).

use crate::types::{Appointment, AppointmentStatus, DayBlock};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Half-hour slots for a regular working day: mornings 09:00-11:00, then
/// 13:30-17:30 after the lunch gap.
pub const STANDARD_GRID: [&str; 14] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "13:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30", "17:00", "17:30",
];

/// The standard grid plus the evening extension through 20:00, offered on
/// the two busiest days before the weekend.
pub const EXTENDED_GRID: [&str; 19] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "13:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30", "17:00", "17:30", "18:00", "18:30", "19:00", "19:30", "20:00",
];

pub fn slot_grid(weekday: Weekday) -> &'static [&'static str] {
    match weekday {
        Weekday::Fri | Weekday::Sat => &EXTENDED_GRID,
        _ => &STANDARD_GRID,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStatus {
    Available,
    Scheduled,
    Completed,
    BlockedBySlot,
    BlockedByDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSlot {
    pub time: String,
    pub status: SlotStatus,
}

/// Classifies every slot of the day's grid, in grid order.
///
/// A day block vetoes the whole day before any per-slot state is looked at.
/// Otherwise a slot takes the status of the record occupying it; canceled
/// records never occupy, so a slot holding only canceled history is
/// available again.
pub fn classify_day(
    weekday: Weekday,
    appointments: &[Appointment],
    day_block: Option<&DayBlock>,
) -> Vec<ResolvedSlot> {
    let grid = slot_grid(weekday);

    if day_block.is_some() {
        return grid
            .iter()
            .map(|&time| ResolvedSlot {
                time: time.to_string(),
                status: SlotStatus::BlockedByDay,
            })
            .collect();
    }

    grid.iter()
        .map(|&time| {
            let occupant = appointments
                .iter()
                .find(|a| a.time == time && a.status.occupies_slot());
            let status = match occupant.map(|a| a.status) {
                Some(AppointmentStatus::Scheduled) => SlotStatus::Scheduled,
                Some(AppointmentStatus::Completed) => SlotStatus::Completed,
                Some(AppointmentStatus::Blocked) => SlotStatus::BlockedBySlot,
                _ => SlotStatus::Available,
            };
            ResolvedSlot {
                time: time.to_string(),
                status,
            }
        })
        .collect()
}

/// Whether any record occupies `time` within one day's appointments.
pub fn slot_occupied(appointments: &[Appointment], time: &str) -> bool {
    appointments
        .iter()
        .any(|a| a.time == time && a.status.occupies_slot())
}

/// Reschedule target check: the slot is free iff the day is not blocked and
/// no record other than the moving one occupies it. The moving appointment's
/// own slot therefore always reports free.
pub fn reschedule_target_free(
    appointments: &[Appointment],
    day_block: Option<&DayBlock>,
    moving_id: Uuid,
    time: &str,
) -> bool {
    if day_block.is_some() {
        return false;
    }
    !appointments
        .iter()
        .any(|a| a.id != moving_id && a.time == time && a.status.occupies_slot())
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
