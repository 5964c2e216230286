//! Net favorability trends from weighted survey responses.
//!
//! Loads a survey export, aggregates weighted favorable minus unfavorable
//! shares per category and year, prints them and renders panel charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;
