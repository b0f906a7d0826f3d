use crate::error::StoreError;
use crate::types::{
    Appointment, AppointmentStatus, AppointmentUpdate, DayBlock, DaySnapshot, NewAppointment,
};
use chrono::NaiveDate;
use uuid::Uuid;

/// Storage seam for the appointment store. The HTTP layer, the in-memory
/// store, the Postgres store and the test mock all meet here.
pub trait AppointmentBackend: Clone + Send + Sync + 'static {
    fn day_snapshot(&self, date: NaiveDate) -> DaySnapshot;
    fn list(&self, status: Option<AppointmentStatus>) -> Vec<Appointment>;
    fn create(&self, request: NewAppointment) -> Result<Appointment, StoreError>;
    fn update(&self, id: Uuid, changes: AppointmentUpdate) -> Result<Appointment, StoreError>;
    fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    fn delete_canceled(&self) -> Result<usize, StoreError>;
    fn block_slot(&self, date: NaiveDate, time: String) -> Result<(), StoreError>;
    fn unblock_slot(&self, date: NaiveDate, time: String) -> Result<(), StoreError>;
    fn day_blocks(&self) -> Vec<DayBlock>;
    fn block_day(&self, date: NaiveDate, reason: Option<String>) -> Result<DayBlock, StoreError>;
    fn unblock_day(&self, date: NaiveDate) -> Result<(), StoreError>;
}
