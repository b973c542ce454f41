//! Viewer state for browsing 2D slices of OM files.
//!
//! A [`ViewerController`] opens an OM file through a backend and an external
//! reader, tracks which time step is shown, and publishes each slice as a
//! heatmap payload through an observable [`Store`].
//!
//! # Example
//!
//! ```ignore
//! use viewer_state::{ViewerConfig, ViewerController};
//! use om_reader::ViewerInput;
//!
//! let controller = ViewerController::new(opener, ViewerConfig::default());
//! let _sub = controller.subscribe(|state| {
//!     if let Some(plot) = &state.plot {
//!         println!("{}", serde_json::to_string(plot.as_ref()).unwrap());
//!     }
//! });
//!
//! controller.load_file(ViewerInput::url("https://example.com/temperature_2m.om")).await;
//! controller.update_axis_roles(1, 2, 0);
//! controller.load_data().await;
//! controller.step_forward().await;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod plot;
pub mod state;
pub mod store;

pub use config::ViewerConfig;
pub use controller::ViewerController;
pub use error::{ViewerError, ViewerResult};
pub use plot::{reshape, slice_ranges, value_range};
pub use state::{AxisRoles, Metadata, PlotData, ViewerSnapshot, ViewerState};
pub use store::{Store, Subscription};
