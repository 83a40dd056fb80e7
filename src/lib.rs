//! # Drillboard
//!
//! Task board for drilling-site field activities. Tasks move through
//! pending, in-progress and done; completed work is consolidated per
//! category and unit over a date range, and the result can be summarised by
//! an external text-generation service.
//!
//! The core is [`board::TaskBoard`] (lifecycle) and [`report::build_report`]
//! (aggregation). Both are pure: time comes in as a parameter and
//! persistence is left to [`storage::TaskStore`].

pub mod board;
pub mod categories;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod storage;
pub mod summary;
pub mod timing;
pub mod tui;
