/// Core module for license reporting
///
/// This module contains the search that finds license lines and the grouping
/// logic that clusters files by the license statement they carry.

pub mod grouper;
pub mod searcher;
