//! HTML dashboard and JSON API over the ferrofolio core.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Rendered dashboard, accepts `?contribution=` and `?refresh=true` |
//! | `GET /api/dashboard` | The same data wrapped in an [`Envelope`](ferrofolio_core::Envelope) |
//! | `POST /api/refresh` | Refetch market data, bypassing the cache |
//! | `GET /api/health` | Liveness and cache status |

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod render;
mod main_lib;

pub use main_lib::{build_state, init_tracing, AppState};
