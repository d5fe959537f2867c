pub mod engine;
pub mod error;
pub mod sort;

pub use engine::{Degradation, RankedResults, RankingEngine};
pub use error::RankError;
pub use sort::{effective_sort, paginate, sort_resources};
