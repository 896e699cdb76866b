// SPDX-License-Identifier: Apache-2.0
mod db;
mod health;
mod metrics;

pub use db::db_check;
pub use health::{health, root};
pub use metrics::metrics_handler;
