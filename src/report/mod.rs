//! Output formatting: tables, colors, and row filtering/sorting.

pub mod colors;
pub mod filters;
pub mod table;

pub use colors::{color_enabled, rank_color};
pub use filters::{apply_limit, filter_nation, sort_rows, SortValue};
pub use table::{OutputMode, Table};
