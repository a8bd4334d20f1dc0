pub mod analytics;
pub mod category;
pub mod trace;

pub use analytics::{Analytics, CategoryStat};
pub use category::Category;
pub use trace::{NewTrace, Trace};
