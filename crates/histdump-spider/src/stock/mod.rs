/// Locating the history table's rows in a raw page.
pub mod page;

/// Price & dividend records, row classification, and their on-disk shape.
pub mod schema;

/// Historical price & dividend data scraped from the Yahoo Finance history page.
pub mod yahoo_finance;
