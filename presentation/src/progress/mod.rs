//! Live session output

pub mod reporter;
