use crate::availability::{reschedule_target_free, slot_occupied};
use crate::backend::AppointmentBackend;
use crate::error::StoreError;
use crate::types::{
    normalize_phone, sort_for_listing, today, Appointment, AppointmentStatus, AppointmentUpdate,
    DayBlock, DaySnapshot, NewAppointment,
};
use chrono::{NaiveDate, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::info;
use uuid::Uuid;

/// Placeholder client name carried by the synthetic record that represents
/// a manually blocked slot.
const BLOCKED_SLOT_NAME: &str = "Blocked";

/// In-memory appointment store. The default backend when no database is
/// configured; bookings do not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct LocalAppointments {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    appointments: HashMap<Uuid, Appointment>,
    day_blocks: HashMap<NaiveDate, DayBlock>,
}

impl Inner {
    fn day_items(&self, date: NaiveDate) -> Vec<Appointment> {
        self.appointments
            .values()
            .filter(|a| a.date == date)
            .cloned()
            .collect()
    }
}

impl AppointmentBackend for LocalAppointments {
    fn day_snapshot(&self, date: NaiveDate) -> DaySnapshot {
        let inner = self.inner.lock().unwrap();
        let mut items = inner.day_items(date);
        sort_for_listing(&mut items);
        DaySnapshot {
            items,
            day_block: inner.day_blocks.get(&date).cloned(),
        }
    }

    fn list(&self, status: Option<AppointmentStatus>) -> Vec<Appointment> {
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        sort_for_listing(&mut items);
        items
    }

    fn create(&self, request: NewAppointment) -> Result<Appointment, StoreError> {
        if request.date < today() {
            return Err(StoreError::Validation(
                "Booking dates in the past are not allowed.".into(),
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        if let Some(block) = inner.day_blocks.get(&request.date) {
            return Err(StoreError::blocked_day(block));
        }
        let day = inner.day_items(request.date);
        if slot_occupied(&day, &request.time) {
            return Err(StoreError::Conflict(format!(
                "Slot {} on {} is already taken.",
                request.time, request.date
            )));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_name: request.client_name,
            phone: normalize_phone(&request.phone),
            date: request.date,
            time: request.time,
            service: request.service,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };
        inner
            .appointments
            .insert(appointment.id, appointment.clone());
        info!(id = %appointment.id, date = %appointment.date, time = %appointment.time, "Appointment booked");
        Ok(appointment)
    }

    fn update(&self, id: Uuid, changes: AppointmentUpdate) -> Result<Appointment, StoreError> {
        if changes.is_empty() {
            return Err(StoreError::Validation("Nothing to update.".into()));
        }
        if changes.status == Some(AppointmentStatus::Blocked) {
            return Err(StoreError::Validation(
                "Use the slot block action to block times.".into(),
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        let current = inner
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Appointment not found.".into()))?;
        if current.status == AppointmentStatus::Blocked {
            return Err(StoreError::Validation(
                "Blocked slots are managed through block/unblock.".into(),
            ));
        }

        let target_date = changes.date.unwrap_or(current.date);
        let target_time = changes.time.clone().unwrap_or_else(|| current.time.clone());
        let target_status = changes.status.unwrap_or(current.status);

        if changes.date.is_some() && target_date < today() {
            return Err(StoreError::Validation(
                "Moving a booking into the past is not allowed.".into(),
            ));
        }

        if changes.creates_new_occupancy(current.status) {
            let day_block = inner.day_blocks.get(&target_date).cloned();
            if let Some(block) = &day_block {
                return Err(StoreError::blocked_day(block));
            }
            let day = inner.day_items(target_date);
            if !reschedule_target_free(&day, day_block.as_ref(), id, &target_time) {
                return Err(StoreError::Conflict(
                    "Conflict: the target slot is already taken.".into(),
                ));
            }
        }

        let appointment = inner.appointments.get_mut(&id).unwrap();
        if let Some(name) = changes.client_name {
            appointment.client_name = name;
        }
        if let Some(phone) = changes.phone {
            appointment.phone = normalize_phone(&phone);
        }
        if let Some(service) = changes.service {
            let service = service.trim().to_string();
            appointment.service = (!service.is_empty()).then_some(service);
        }
        appointment.date = target_date;
        appointment.time = target_time;
        appointment.status = target_status;
        Ok(appointment.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let appointment = inner
            .appointments
            .get(&id)
            .ok_or_else(|| StoreError::NotFound("Appointment not found.".into()))?;
        if !appointment.status.is_history() {
            return Err(StoreError::Validation(
                "Only completed or canceled appointments can be removed.".into(),
            ));
        }
        inner.appointments.remove(&id);
        Ok(())
    }

    fn delete_canceled(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.appointments.len();
        inner
            .appointments
            .retain(|_, a| a.status != AppointmentStatus::Canceled);
        Ok(before - inner.appointments.len())
    }

    fn block_slot(&self, date: NaiveDate, time: String) -> Result<(), StoreError> {
        if date < today() {
            return Err(StoreError::Validation(
                "Blocking slots in the past is not allowed.".into(),
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        // Stricter than booking: any record at the slot, canceled history
        // included, keeps the slot from being blocked.
        if inner
            .appointments
            .values()
            .any(|a| a.date == date && a.time == time)
        {
            return Err(StoreError::Conflict(
                "There is already a record at this time.".into(),
            ));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_name: BLOCKED_SLOT_NAME.into(),
            phone: String::new(),
            date,
            time,
            service: None,
            status: AppointmentStatus::Blocked,
            created_at: Utc::now(),
        };
        inner.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    fn unblock_slot(&self, date: NaiveDate, time: String) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner
            .appointments
            .values()
            .find(|a| a.date == date && a.time == time && a.status == AppointmentStatus::Blocked)
            .map(|a| a.id)
            .ok_or_else(|| StoreError::NotFound("This time was not blocked.".into()))?;
        inner.appointments.remove(&id);
        Ok(())
    }

    fn day_blocks(&self) -> Vec<DayBlock> {
        let inner = self.inner.lock().unwrap();
        let mut blocks: Vec<DayBlock> = inner.day_blocks.values().cloned().collect();
        blocks.sort_by_key(|b| b.date);
        blocks
    }

    fn block_day(&self, date: NaiveDate, reason: Option<String>) -> Result<DayBlock, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.day_blocks.contains_key(&date) {
            return Err(StoreError::Conflict("Day already blocked.".into()));
        }
        let block = DayBlock {
            date,
            reason,
            created_at: Utc::now(),
        };
        inner.day_blocks.insert(date, block.clone());
        info!(date = %date, "Day blocked");
        Ok(block)
    }

    fn unblock_day(&self, date: NaiveDate) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .day_blocks
            .remove(&date)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Day block not found.".into()))
    }
}
