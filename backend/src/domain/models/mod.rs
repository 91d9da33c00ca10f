pub mod journal;
pub mod observation;
pub mod timestamp;
