pub mod factorization;
pub mod history;

pub use factorization::Factorization;
pub use history::{IntervalRecord, TimeIntervalHistory};
