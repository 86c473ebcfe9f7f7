pub mod aggregator;
pub mod timestamp;

pub use aggregator::{
    filter_entries, group_by_day, sort_entries, DayGroup, HistoryAggregator, HistoryEntry,
    SortMode,
};
pub use timestamp::{parse_timestamp, parse_timestamp_str};
