//! Test helpers shared across mentions crates.

pub mod records;
pub mod volume;

pub use records::{RecordBuilder, at, day_window, memory_store};
pub use volume::StubMessageVolume;
