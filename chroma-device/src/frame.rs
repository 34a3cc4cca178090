//! Per-key matrix frame buffer
//!
//! Pixels are written into a staged buffer and tracked per row. `commit`
//! sends every dirty row, in ascending order, as one frame-row transaction
//! and promotes it to the current buffer once the device accepted it.
//!
//! A commit that fails part way is not rolled back: rows already sent stay
//! applied on the device, and only the failed row and those after it remain
//! dirty, so calling `commit` again resumes where it stopped.

use std::sync::Arc;

use chroma_transport::protocol::{FRAME_ROW_MARKER, PAYLOAD_SIZE};
use chroma_transport::{Command, TransactionExecutor};
use tracing::{debug, warn};

use crate::error::DeviceError;
use crate::led::Rgb;
use crate::model::MatrixDims;

/// Rows tracked by the dirty mask
pub const MAX_ROWS: usize = 64;

/// Bytes before the color data in a frame row: marker, row, first col, last col
const ROW_HEADER_LEN: usize = 4;

/// Widest row that fits in one report
pub const MAX_ROW_WIDTH: usize = (PAYLOAD_SIZE - ROW_HEADER_LEN) / 3;

/// Frame buffer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Staged matches what was last committed
    Clean,
    /// At least one row differs from the device
    Staged,
    /// Rows are being sent
    Committing,
}

/// Double-buffered matrix frame for one device
pub struct Frame {
    executor: Arc<TransactionExecutor>,
    dims: MatrixDims,
    /// Last confirmed device contents
    current: Vec<Rgb>,
    /// Pending contents
    staged: Vec<Rgb>,
    /// Bit n set when row n has unsent changes
    dirty: u64,
    base: Rgb,
    state: FrameState,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("dims", &self.dims)
            .field("dirty", &format_args!("{:#x}", self.dirty))
            .field("base", &self.base)
            .field("state", &self.state)
            .finish()
    }
}

impl Frame {
    /// Check that a `dims` matrix can be driven row by row
    pub fn validate_dims(dims: MatrixDims) -> Result<(), DeviceError> {
        if dims.height == 0 || dims.width == 0 {
            return Err(DeviceError::InvalidParameter(format!(
                "empty {}x{} matrix",
                dims.height, dims.width
            )));
        }
        if dims.height > MAX_ROWS {
            return Err(DeviceError::InvalidParameter(format!(
                "matrix has {} rows, at most {MAX_ROWS} supported",
                dims.height
            )));
        }
        if dims.width > MAX_ROW_WIDTH {
            return Err(DeviceError::InvalidParameter(format!(
                "matrix row of {} keys does not fit one report (max {MAX_ROW_WIDTH})",
                dims.width
            )));
        }
        Ok(())
    }

    /// Create a frame for a `dims` matrix, initially all black and clean
    pub fn new(executor: Arc<TransactionExecutor>, dims: MatrixDims) -> Result<Self, DeviceError> {
        Self::validate_dims(dims)?;

        let pixels = dims.height * dims.width;
        Ok(Self {
            executor,
            dims,
            current: vec![Rgb::BLACK; pixels],
            staged: vec![Rgb::BLACK; pixels],
            dirty: 0,
            base: Rgb::BLACK,
            state: FrameState::Clean,
        })
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn dims(&self) -> MatrixDims {
        self.dims
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn base_color(&self) -> Rgb {
        self.base
    }

    /// Color used by `reset`; `None` means off
    pub fn set_base_color(&mut self, color: Option<Rgb>) -> &mut Self {
        self.base = color.unwrap_or(Rgb::BLACK);
        self
    }

    /// Staged color at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<Rgb, DeviceError> {
        let idx = self.index(row, col)?;
        Ok(self.staged[idx])
    }

    /// Last committed color at (row, col)
    pub fn current(&self, row: usize, col: usize) -> Result<Rgb, DeviceError> {
        let idx = self.index(row, col)?;
        Ok(self.current[idx])
    }

    /// Stage one pixel
    pub fn set(&mut self, row: usize, col: usize, color: Rgb) -> Result<(), DeviceError> {
        let idx = self.index(row, col)?;
        self.staged[idx] = color;
        self.mark_dirty(row);
        Ok(())
    }

    /// Stage `colors` into `row` starting at `start_col`
    ///
    /// The whole span must fit in the row; nothing is written otherwise.
    pub fn put_row(&mut self, row: usize, start_col: usize, colors: &[Rgb]) -> Result<(), DeviceError> {
        let start = self.index(row, start_col)?;
        if colors.is_empty() {
            return Ok(());
        }
        let last_col = start_col.checked_add(colors.len() - 1).ok_or(DeviceError::OutOfBounds {
            row,
            col: start_col,
            height: self.dims.height,
            width: self.dims.width,
        })?;
        self.index(row, last_col)?;

        self.staged[start..start + colors.len()].copy_from_slice(colors);
        self.mark_dirty(row);
        Ok(())
    }

    /// Stage `color` on every pixel
    pub fn fill(&mut self, color: Rgb) {
        self.staged.fill(color);
        self.dirty = self.all_rows_mask();
        self.state = FrameState::Staged;
    }

    /// Stage the base color everywhere; follow with `commit`
    pub fn reset(&mut self) {
        self.fill(self.base);
    }

    /// Rows with unsent changes, ascending
    pub fn dirty_rows(&self) -> Vec<usize> {
        (0..self.dims.height)
            .filter(|row| self.is_dirty(*row))
            .collect()
    }

    pub fn is_dirty(&self, row: usize) -> bool {
        row < self.dims.height && self.dirty & (1u64 << row) != 0
    }

    /// Send every dirty row, lowest first, returning how many were sent
    ///
    /// Stops at the first failed row; that row and the ones after it stay
    /// dirty.
    pub fn commit(&mut self) -> Result<usize, DeviceError> {
        if self.dirty == 0 {
            return Ok(0);
        }

        self.state = FrameState::Committing;
        let mut sent = 0;

        for row in 0..self.dims.height {
            if !self.is_dirty(row) {
                continue;
            }

            if let Err(e) = self
                .executor
                .execute(Command::SetFrameRow, &self.row_args(row))
            {
                warn!(
                    "Frame commit aborted at row {} after {} rows: {}",
                    row, sent, e
                );
                self.state = FrameState::Staged;
                return Err(e.into());
            }

            let span = self.row_span(row);
            self.current[span.clone()].copy_from_slice(&self.staged[span]);
            self.dirty &= !(1u64 << row);
            sent += 1;
        }

        debug!("Committed {} frame rows", sent);
        self.state = FrameState::Clean;
        Ok(sent)
    }

    /// `[0xFF, row, 0, width - 1, r, g, b, ...]`
    fn row_args(&self, row: usize) -> Vec<u8> {
        let mut args = Vec::with_capacity(ROW_HEADER_LEN + 3 * self.dims.width);
        // Bounds checked in `new`: row < 64, width <= MAX_ROW_WIDTH
        args.extend([FRAME_ROW_MARKER, row as u8, 0, (self.dims.width - 1) as u8]);
        for color in &self.staged[self.row_span(row)] {
            args.extend(color.to_bytes());
        }
        args
    }

    fn row_span(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.dims.width;
        start..start + self.dims.width
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, DeviceError> {
        if row >= self.dims.height || col >= self.dims.width {
            return Err(DeviceError::OutOfBounds {
                row,
                col,
                height: self.dims.height,
                width: self.dims.width,
            });
        }
        Ok(row * self.dims.width + col)
    }

    fn mark_dirty(&mut self, row: usize) {
        self.dirty |= 1u64 << row;
        self.state = FrameState::Staged;
    }

    fn all_rows_mask(&self) -> u64 {
        if self.dims.height == MAX_ROWS {
            u64::MAX
        } else {
            (1u64 << self.dims.height) - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_transport::mock::MockTransport;
    use chroma_transport::TransactionPolicy;

    fn frame(height: usize, width: usize) -> (Arc<MockTransport>, Frame) {
        let mock = Arc::new(MockTransport::new());
        let executor = Arc::new(TransactionExecutor::new(
            mock.clone(),
            TransactionPolicy::default(),
        ));
        let frame = Frame::new(executor, MatrixDims::new(height, width)).unwrap();
        (mock, frame)
    }

    #[test]
    fn test_rejects_unsendable_dimensions() {
        let executor = Arc::new(TransactionExecutor::new(
            Arc::new(MockTransport::new()),
            TransactionPolicy::default(),
        ));
        assert!(Frame::new(executor.clone(), MatrixDims::new(6, MAX_ROW_WIDTH)).is_ok());
        assert!(Frame::new(executor.clone(), MatrixDims::new(6, MAX_ROW_WIDTH + 1)).is_err());
        assert!(Frame::new(executor.clone(), MatrixDims::new(MAX_ROWS + 1, 4)).is_err());
        assert!(Frame::new(executor, MatrixDims::new(0, 4)).is_err());
    }

    #[test]
    fn test_row_args_layout() {
        let (_, mut frame) = frame(2, 3);
        frame.put_row(1, 0, &[Rgb::RED, Rgb::GREEN, Rgb::BLUE]).unwrap();
        assert_eq!(
            frame.row_args(1),
            vec![0xFF, 1, 0, 2, 255, 0, 0, 0, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn test_full_height_mask() {
        let (_, mut frame) = frame(MAX_ROWS, 1);
        frame.fill(Rgb::WHITE);
        assert_eq!(frame.dirty_rows().len(), MAX_ROWS);
    }

    #[test]
    fn test_put_row_span_past_end_is_out_of_bounds() {
        let (_, mut frame) = frame(2, 4);
        assert!(matches!(
            frame.put_row(0, usize::MAX, &[Rgb::RED, Rgb::BLUE]),
            Err(DeviceError::OutOfBounds { row: 0, .. })
        ));
        assert!(matches!(
            frame.put_row(1, 3, &[Rgb::RED, Rgb::BLUE]),
            Err(DeviceError::OutOfBounds { row: 1, col: 4, .. })
        ));
        assert!(frame.put_row(1, 2, &[Rgb::RED, Rgb::BLUE]).is_ok());
        assert_eq!(frame.dirty_rows(), vec![1]);
    }

    #[test]
    fn test_state_transitions() {
        let (_, mut frame) = frame(2, 2);
        assert_eq!(frame.state(), FrameState::Clean);
        frame.set(0, 0, Rgb::RED).unwrap();
        assert_eq!(frame.state(), FrameState::Staged);
        frame.commit().unwrap();
        assert_eq!(frame.state(), FrameState::Clean);
    }
}
