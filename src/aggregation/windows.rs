use crate::types::columns::{AVG_TEMP_LAST_WEEK, ELEVATION, TIME};
use chrono::NaiveDateTime;
use polars::prelude::{col, lit, DataType, LazyFrame, TimeUnit};

/// Window filters and the selection gate applied to observation frames.
///
/// The window boundary is closed-open: a sample stamped exactly at `midnight` belongs to the
/// forward window, never to the lookback window.
pub trait WindowFrameExt {
    /// Keeps rows whose `time` is strictly before `midnight`.
    fn past_window(self, midnight: NaiveDateTime) -> LazyFrame;

    /// Keeps rows whose `time` is at or after `midnight`.
    fn future_window(self, midnight: NaiveDateTime) -> LazyFrame;

    /// Keeps locations with `avg_temp_last_week < max_avg_temp` and
    /// `elevation > min_elevation`. Rows with a null in either column are dropped.
    fn selection_gate(self, max_avg_temp: f64, min_elevation: f64) -> LazyFrame;
}

impl WindowFrameExt for LazyFrame {
    fn past_window(self, midnight: NaiveDateTime) -> LazyFrame {
        self.filter(
            col(TIME)
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .lt(lit(midnight)),
        )
    }

    fn future_window(self, midnight: NaiveDateTime) -> LazyFrame {
        self.filter(
            col(TIME)
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .gt_eq(lit(midnight)),
        )
    }

    fn selection_gate(self, max_avg_temp: f64, min_elevation: f64) -> LazyFrame {
        self.filter(
            col(AVG_TEMP_LAST_WEEK)
                .lt(lit(max_avg_temp))
                .and(col(ELEVATION).gt(lit(min_elevation))),
        )
    }
}
