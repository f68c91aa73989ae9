//! Data models for fuelboard

pub mod entry;
pub mod price;

pub use entry::{EntryId, FuelEntry, FuelType, NewEntry};
pub use price::{FuelPrice, Region};
