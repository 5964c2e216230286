//! Stats module - weighted net favorability aggregation

mod aggregator;

pub use aggregator::{
    AggregateError, AggregatePoint, CategorySeries, WeightedNetFavorabilityAggregator,
};
