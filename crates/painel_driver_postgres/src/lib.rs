mod driver;

pub use driver::{PostgresConnection, PostgresDriver};
