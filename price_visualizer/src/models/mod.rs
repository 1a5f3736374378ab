pub mod date_range;
pub mod price_series;
pub mod raw_table;
pub mod symbol;
