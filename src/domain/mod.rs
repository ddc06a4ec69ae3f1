//! Domain records, value objects and the storage ports the application
//! layer is written against.

pub mod contract;
pub mod ids;
pub mod job;
pub mod money;
pub mod ports;
pub mod profile;
