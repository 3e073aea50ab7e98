//! mipforge - mip chain export into block-compressed texture containers.
//!
//! This library turns a source raster into a `.bin` container holding every
//! mip level of the image, from full resolution down to 1×1. Levels of at
//! least 4×4 pixels are block compressed; smaller levels are stored as raw
//! RGB24.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ source       │──►│ device       │──►│ mip              │
//! │ (decode RGB) │   │ (mip oracle) │   │ (enumerate/export)│
//! └──────────────┘   └──────────────┘   └────────┬─────────┘
//!                                                │
//!                    ┌──────────────┐   ┌────────▼─────────┐
//!                    │ container    │◄──│ compress         │
//!                    │ (.bin writer)│   │ (PVR strip)      │
//!                    └──────────────┘   └──────────────────┘
//! ```
//!
//! The [`pipeline::Pipeline`] sequences these per input file and is the only
//! place where per-file failures are recovered.

pub mod compress;
pub mod config;
pub mod container;
pub mod device;
pub mod logging;
pub mod mip;
pub mod pipeline;
pub mod source;

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
