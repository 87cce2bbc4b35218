//! Output generation beyond the games file itself.
//!
//! # Submodules
//!
//! - [`json`]: Writes the refreshed entries as a structured JSON snapshot
//!
//! # Output Structure
//!
//! ```text
//! coming_soon.json
//! {
//!   "generated_at": "2026-10-16T09:30:00Z",
//!   "games": [
//!     { "name": "Hades II", "release_info": "25/09/2025", "release_type": "date" }
//!   ]
//! }
//! ```

pub mod json;
