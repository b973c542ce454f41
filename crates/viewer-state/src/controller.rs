//! Viewer controller: load, navigate and slice an OM file.
//!
//! All operations publish through the controller's [`Store`]. Async
//! operations suspend only while opening the backend or reading from the
//! reader; a second call made while one is in flight is not queued or
//! cancelled, so whichever finishes last wins. Callers should disable
//! navigation while `loading` is set.

use std::sync::Arc;

use om_reader::{
    default_progress, select_backend, OmDataType, OmReader, ProgressCallback, ReaderOpener,
    ViewerInput,
};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::plot::{reshape, slice_ranges, value_range};
use crate::state::{max_index_for, AxisRoles, Metadata, PlotData, ViewerState};
use crate::store::{Store, Subscription};

/// Owns the viewer state and drives the reader.
pub struct ViewerController<O> {
    store: Store<ViewerState>,
    opener: O,
    config: ViewerConfig,
    on_progress: ProgressCallback,
}

impl<O: ReaderOpener> ViewerController<O> {
    pub fn new(opener: O, config: ViewerConfig) -> Self {
        let store = Store::new(ViewerState::initial(config.axis_roles));
        Self {
            store,
            opener,
            config,
            on_progress: default_progress(),
        }
    }

    /// Replace the download progress callback used for HTTP inputs.
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn store(&self) -> &Store<ViewerState> {
        &self.store
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current state snapshot.
    pub fn state(&self) -> ViewerState {
        self.store.get()
    }

    /// Observe every state update.
    pub fn subscribe(
        &self,
        observer: impl Fn(&ViewerState) + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(observer)
    }

    /// Open `input` and initialize metadata and navigation.
    ///
    /// Failures end up in `ViewerState::error`. A failed open leaves the
    /// previous reader and plot in place; a failed dimension check happens
    /// after the new reader is stored.
    #[instrument(skip(self, input), fields(input = %input.describe()))]
    pub async fn load_file(&self, input: ViewerInput) {
        self.store.update(|state| {
            state.loading = true;
            state.error = None;
        });

        let reader = match self.open_reader(input).await {
            Ok(reader) => reader,
            Err(e) => return self.fail("Error loading file", e),
        };

        // Dropping the previous handle here releases it once no read holds it.
        self.store.update(|state| state.reader = Some(reader));

        self.load_metadata().await;

        if let Err(e) = self.setup_dimensions() {
            return self.fail("Error loading file", e);
        }

        self.store.update(|state| state.loading = false);
        info!("File loaded");
    }

    async fn open_reader(&self, input: ViewerInput) -> ViewerResult<Arc<dyn OmReader>> {
        let backend =
            select_backend(input, &self.config.backend, self.on_progress.clone()).await?;
        debug!(backend = backend.kind(), "Opening reader");
        Ok(self.opener.open(backend).await?)
    }

    /// Refresh `metadata` from the open reader.
    ///
    /// Errors are logged and leave the previous metadata in place.
    pub async fn load_metadata(&self) {
        let Some(reader) = self.store.get().reader else {
            return;
        };

        match read_metadata(reader.as_ref()) {
            Ok(metadata) => {
                info!(metadata = ?metadata, "Metadata");
                self.store.update(|state| state.metadata = metadata);
            }
            Err(e) => warn!(error = %e, "Couldn't load metadata"),
        }
    }

    /// Read axis sizes and reset navigation along the current time axis.
    ///
    /// No-op without a reader. Fails when the data has fewer than 2 axes.
    pub fn setup_dimensions(&self) -> ViewerResult<()> {
        self.store.update(|state| -> ViewerResult<()> {
            let Some(reader) = &state.reader else {
                return Ok(());
            };

            let dimensions = reader.dimensions()?;
            if dimensions.len() < 2 {
                return Err(ViewerError::TooFewDimensions(dimensions.len()));
            }
            if !state.axis_roles.fits(dimensions.len()) {
                warn!(
                    roles = ?state.axis_roles,
                    dimensions = ?dimensions,
                    "Axis roles do not fit the dataset"
                );
            }

            state.max_index = max_index_for(&dimensions, state.axis_roles.time);
            state.dimensions = dimensions;
            state.current_index = 0;
            Ok(())
        })
    }

    /// Reassign axis roles and reset navigation. Does not reload the plot.
    ///
    /// No-op without a reader. The roles are expected to be distinct and
    /// within the dataset's axes; this is not checked.
    pub fn update_axis_roles(&self, row: usize, col: usize, time: usize) {
        self.store.update(|state| {
            if state.reader.is_none() {
                return;
            }
            state.axis_roles = AxisRoles::new(time, row, col);
            state.max_index = max_index_for(&state.dimensions, time);
            state.current_index = 0;
        });
    }

    /// Move one step back in time and reload. Returns whether it moved.
    pub async fn step_backward(&self) -> bool {
        let moved = self.store.update(|state| {
            if !state.can_step_backward() {
                return false;
            }
            state.current_index -= 1;
            true
        });
        if moved {
            self.load_data().await;
        }
        moved
    }

    /// Move one step forward in time and reload. Returns whether it moved.
    pub async fn step_forward(&self) -> bool {
        let moved = self.store.update(|state| {
            if !state.can_step_forward() {
                return false;
            }
            state.current_index += 1;
            true
        });
        if moved {
            self.load_data().await;
        }
        moved
    }

    /// Jump to `index` and reload. Out of range or unchanged is a no-op.
    pub async fn go_to(&self, index: u64) -> bool {
        let moved = self.store.update(|state| {
            if index > state.max_index || index == state.current_index {
                return false;
            }
            state.current_index = index;
            true
        });
        if moved {
            self.load_data().await;
        }
        moved
    }

    /// Read the slice at the current index and publish it as the plot.
    ///
    /// On failure `error` is set and the previous plot is kept.
    pub async fn load_data(&self) {
        let state = self.store.update(|state| {
            if state.reader.is_some() {
                state.loading = true;
            }
            state.clone()
        });

        let Some(reader) = state.reader.clone() else {
            self.store.update(|s| {
                s.loading = false;
                s.error = Some(ViewerError::ReaderNotInitialized.to_string());
            });
            return;
        };

        match self.read_plot(&state, reader.as_ref()).await {
            Ok(plot) => {
                debug!(
                    index = plot.index,
                    rows = plot.rows(),
                    cols = plot.cols(),
                    min = plot.value_min,
                    max = plot.value_max,
                    "Slice loaded"
                );
                self.store.update(|s| {
                    s.plot = Some(Arc::new(plot));
                    s.loading = false;
                });
            }
            Err(e) => self.fail("Error loading data", e),
        }
    }

    async fn read_plot(&self, state: &ViewerState, reader: &dyn OmReader) -> ViewerResult<PlotData> {
        let roles = &state.axis_roles;
        let ranges = slice_ranges(&state.dimensions, roles, state.current_index);
        let data = reader.read(OmDataType::FloatArray, &ranges).await?;

        let rows = axis_len(&state.dimensions, roles.row);
        let cols = axis_len(&state.dimensions, roles.col);
        let grid = reshape(&data, rows, cols)?;
        let (value_min, value_max) = value_range(&data);

        Ok(PlotData {
            grid,
            kind: self.config.kind.clone(),
            colorscale: self.config.colorscale.clone(),
            value_min,
            value_max,
            index: state.current_index,
        })
    }

    /// Return to the initial state, dropping the reader handle.
    pub fn reset(&self) {
        self.store.set(ViewerState::initial(self.config.axis_roles));
    }

    fn fail(&self, context: &str, err: ViewerError) {
        error!(error = %err, "{}", context);
        self.store.update(|state| {
            state.loading = false;
            state.error = Some(err.to_string());
        });
    }
}

fn axis_len(dimensions: &[u64], axis: usize) -> usize {
    dimensions.get(axis).copied().unwrap_or(0) as usize
}

fn read_metadata(reader: &dyn OmReader) -> ViewerResult<Metadata> {
    Ok(Metadata::from_codes(
        reader.number_of_children()?,
        reader.name()?,
        reader.dimensions()?,
        reader.compression()?,
        reader.data_type()?,
        reader.chunk_dimensions()?,
    ))
}
