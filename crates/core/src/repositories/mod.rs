//! Repository management modules.
//!
//! Services that persist patient data under `PATIENT_DATA_DIR`.

pub mod screening;
