//! Binary wire format: scalar/string reads (`reader`) and the frame
//! envelope built from them (`frame`).

pub mod frame;
pub mod reader;

pub use frame::{encode_join, encode_leave, parse_frame};
