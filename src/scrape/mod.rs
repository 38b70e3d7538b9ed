//! HTML scraping for the portal's rendered pages.

pub mod attendance;

pub use attendance::parse_attendance_table;
