//! Display formatting for amounts, ratios and dates.

pub mod num;

pub use num::{
    display_coll_ratio, display_formatted_string, display_percent, display_wad,
    display_wad_with_decimals,
};
