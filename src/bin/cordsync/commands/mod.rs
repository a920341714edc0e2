//! Command implementations

pub mod completions;
pub mod edit;
pub mod pin_gradle;
pub mod prepare;
pub mod scan;
pub mod show;
