pub mod backlog;
pub mod calendar;
pub mod error;
pub mod ideal;
pub mod labels;
pub mod series;

pub use error::BurndownError;
