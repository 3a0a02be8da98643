//! Presentation layer: maps domain values to theme colors.

pub mod color_mapping;
