/// Utility modules for license reporting
///
/// This module contains the report formatting helpers.

pub mod output_formatter;
