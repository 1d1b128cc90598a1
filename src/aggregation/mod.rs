pub mod models;
pub mod service;

pub use models::{
    AggregateBucket, BucketLabels, Dimension, PercentBasis, Tally, TotalBasis, UNCATEGORIZED_KEY,
    UNCATEGORIZED_LABEL,
};
pub use service::{
    aggregate_by, allocate_percentages, percentage, rank, sort_chronologically, sum_amounts,
    tally_by, PERCENT_SCALE,
};
