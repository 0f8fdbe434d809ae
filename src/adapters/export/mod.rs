//! Export adapters. Serialize stored reviews for use outside the app.

pub mod csv_export;

pub use csv_export::{reviews_to_csv, write_reviews_csv};
