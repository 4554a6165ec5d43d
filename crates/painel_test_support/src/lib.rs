mod fake_driver;
mod fixtures;

pub use fake_driver::{FakeConnection, FakeDriver};
pub use fixtures::{result_with, text_row};
