use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::backend::AppointmentBackend;
use crate::configuration::Configuration;
use crate::error::StoreError;
use crate::types::{
    Appointment, AppointmentStatus, AppointmentUpdate, DayBlock, DaySnapshot, NewAppointment,
};

#[derive(Clone, Default)]
pub struct TestConfiguration;

impl Configuration for TestConfiguration {
    fn admin_password(&self) -> String {
        "123".into()
    }

    fn port(&self) -> String {
        "0".into()
    }

    fn database_url(&self) -> Option<String> {
        None
    }
}

pub struct MockAppointmentBackendInner {
    pub success: AtomicBool,
    pub calls_to_day_snapshot: AtomicU64,
    pub calls_to_list: AtomicU64,
    pub calls_to_create: AtomicU64,
    pub calls_to_update: AtomicU64,
    pub calls_to_delete: AtomicU64,
    pub calls_to_delete_canceled: AtomicU64,
    pub calls_to_block_slot: AtomicU64,
    pub calls_to_unblock_slot: AtomicU64,
    pub calls_to_day_blocks: AtomicU64,
    pub calls_to_block_day: AtomicU64,
    pub calls_to_unblock_day: AtomicU64,
    pub items: Mutex<Vec<Appointment>>,
    pub day_block: Mutex<Option<DayBlock>>,
}

#[derive(Clone)]
pub struct MockAppointmentBackend(pub Arc<MockAppointmentBackendInner>);

impl MockAppointmentBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockAppointmentBackendInner {
            success: AtomicBool::new(true),
            calls_to_day_snapshot: AtomicU64::default(),
            calls_to_list: AtomicU64::default(),
            calls_to_create: AtomicU64::default(),
            calls_to_update: AtomicU64::default(),
            calls_to_delete: AtomicU64::default(),
            calls_to_delete_canceled: AtomicU64::default(),
            calls_to_block_slot: AtomicU64::default(),
            calls_to_unblock_slot: AtomicU64::default(),
            calls_to_day_blocks: AtomicU64::default(),
            calls_to_block_day: AtomicU64::default(),
            calls_to_unblock_day: AtomicU64::default(),
            items: Mutex::default(),
            day_block: Mutex::default(),
        }))
    }

    fn result(&self) -> Result<(), StoreError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(StoreError::Storage("Supposed to fail".into())),
        }
    }

    fn dummy_appointment(&self, id: Uuid) -> Appointment {
        Appointment {
            id,
            client_name: "Mock".into(),
            phone: String::new(),
            date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            time: "09:00".into(),
            service: None,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        }
    }
}

impl AppointmentBackend for MockAppointmentBackend {
    fn day_snapshot(&self, date: NaiveDate) -> DaySnapshot {
        self.0.calls_to_day_snapshot.fetch_add(1, Ordering::SeqCst);
        DaySnapshot {
            items: self
                .0
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.date == date)
                .cloned()
                .collect(),
            day_block: self.0.day_block.lock().unwrap().clone(),
        }
    }

    fn list(&self, status: Option<AppointmentStatus>) -> Vec<Appointment> {
        self.0.calls_to_list.fetch_add(1, Ordering::SeqCst);
        self.0
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect()
    }

    fn create(&self, request: NewAppointment) -> Result<Appointment, StoreError> {
        self.0.calls_to_create.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        let mut appointment = self.dummy_appointment(Uuid::new_v4());
        appointment.client_name = request.client_name;
        appointment.date = request.date;
        appointment.time = request.time;
        Ok(appointment)
    }

    fn update(&self, id: Uuid, _changes: AppointmentUpdate) -> Result<Appointment, StoreError> {
        self.0.calls_to_update.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self.dummy_appointment(id))
    }

    fn delete(&self, _id: Uuid) -> Result<(), StoreError> {
        self.0.calls_to_delete.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn delete_canceled(&self) -> Result<usize, StoreError> {
        self.0
            .calls_to_delete_canceled
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(0)
    }

    fn block_slot(&self, _date: NaiveDate, _time: String) -> Result<(), StoreError> {
        self.0.calls_to_block_slot.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn unblock_slot(&self, _date: NaiveDate, _time: String) -> Result<(), StoreError> {
        self.0.calls_to_unblock_slot.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn day_blocks(&self) -> Vec<DayBlock> {
        self.0.calls_to_day_blocks.fetch_add(1, Ordering::SeqCst);
        self.0.day_block.lock().unwrap().clone().into_iter().collect()
    }

    fn block_day(&self, date: NaiveDate, reason: Option<String>) -> Result<DayBlock, StoreError> {
        self.0.calls_to_block_day.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(DayBlock {
            date,
            reason,
            created_at: Utc::now(),
        })
    }

    fn unblock_day(&self, _date: NaiveDate) -> Result<(), StoreError> {
        self.0.calls_to_unblock_day.fetch_add(1, Ordering::SeqCst);
        self.result()
    }
}
