use tracing::{error, instrument, trace};

use crate::frame_pipeline::{
    capture::timing::{TickTimings, Timer},
    capture::types::{CaptureConfig, TickReport},
    common::error::Result,
    downsample::{BlockSampler, ColorGrid, DepthGrid},
    frame::{ColorFrame, DepthFrame},
    snapshot::{CsvGridWriter, GridRef, GridWriter, SlotCounter, SnapshotPersister},
};

/// Decode, downsample and persist for one frame set.
///
/// Owns the two coarse grids, the pin image and the shared slot ring; they
/// are overwritten on every call. Callers serialize access (the session keeps
/// the processor behind a mutex).
pub struct FrameProcessor<W: GridWriter = CsvGridWriter> {
    sampler: BlockSampler,
    depth_grid: DepthGrid,
    color_grid: ColorGrid,
    pins: ColorFrame,
    slots: SlotCounter,
    persister: SnapshotPersister<W>,
    persist: bool,
}

impl FrameProcessor<CsvGridWriter> {
    pub fn new(config: &CaptureConfig) -> Self {
        Self::with_writer(CsvGridWriter, config)
    }
}

impl<W: GridWriter> FrameProcessor<W> {
    pub fn with_writer(writer: W, config: &CaptureConfig) -> Self {
        Self {
            sampler: BlockSampler::new(),
            depth_grid: DepthGrid::new(),
            color_grid: ColorGrid::new(),
            pins: ColorFrame::blank(),
            slots: SlotCounter::new(config.slot_count),
            persister: SnapshotPersister::with_writer(writer, config.output_dir.clone()),
            persist: config.persist,
        }
    }

    /// Processes depth then colour.
    ///
    /// Frame geometry errors propagate. Snapshot write failures are logged
    /// and collected in the report; the slot ring still advances for them.
    #[instrument(skip_all)]
    pub fn process(&mut self, color: &ColorFrame, raw_depth: &DepthFrame) -> Result<TickReport> {
        let mut report = TickReport {
            timings: TickTimings::new(),
            ..TickReport::default()
        };

        let timer = Timer::start("downsample_depth");
        self.sampler.sample_depth(raw_depth, &mut self.depth_grid)?;
        let (name, duration) = timer.stop();
        report.timings.add_step(name, duration);

        if self.persist {
            let timer = Timer::start("persist_depth");
            record(&self.persister, &mut self.slots, GridRef::Depth(&self.depth_grid), &mut report);
            let (name, duration) = timer.stop();
            report.timings.add_step(name, duration);
        }

        let timer = Timer::start("downsample_color");
        self.sampler.sample_color(color, &mut self.color_grid, &mut self.pins)?;
        let (name, duration) = timer.stop();
        report.timings.add_step(name, duration);

        if self.persist {
            let timer = Timer::start("persist_color");
            record(&self.persister, &mut self.slots, GridRef::Color(&self.color_grid), &mut report);
            let (name, duration) = timer.stop();
            report.timings.add_step(name, duration);
        }

        trace!(
            written = report.written.len(),
            failed = report.failures.len(),
            "Tick processed"
        );
        Ok(report)
    }

    pub fn depth_grid(&self) -> &DepthGrid {
        &self.depth_grid
    }

    pub fn color_grid(&self) -> &ColorGrid {
        &self.color_grid
    }

    pub fn pin_image(&self) -> &ColorFrame {
        &self.pins
    }

    pub fn slots(&self) -> &SlotCounter {
        &self.slots
    }
}

fn record<W: GridWriter>(
    persister: &SnapshotPersister<W>,
    slots: &mut SlotCounter,
    grid: GridRef<'_>,
    report: &mut TickReport,
) {
    match persister.persist(grid, slots) {
        Ok(path) => report.written.push(path),
        Err(e) => {
            error!("Snapshot not saved: {}", e);
            report.failures.push(e);
        }
    }
}
