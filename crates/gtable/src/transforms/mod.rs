//! Pure transforms over groupings.
//!
//! Every function here takes a frozen [`Grouping`](crate::Grouping) and
//! returns a new one. Inputs are never mutated; unmodified columns share
//! storage with the result.

pub mod aggregate;
pub mod concat;
pub mod filter;
pub mod groupby;
pub mod headtail;
pub mod join;
pub mod map;
pub mod pivot;
pub mod sort;

pub use aggregate::{
    agg_count, agg_geomean, agg_max, agg_mean, agg_min, agg_quantile, agg_sum, agg_unique,
    aggregate, Aggregator,
};
pub use concat::concat;
pub use filter::{filter, filter_eq, Predicate};
pub use groupby::{flatten, group_by, ungroup};
pub use headtail::{head, head_tables, tail, tail_tables};
pub use join::join;
pub use map::{map_cols, map_tables};
pub use pivot::{pivot, unpivot};
pub use sort::sort_by;
