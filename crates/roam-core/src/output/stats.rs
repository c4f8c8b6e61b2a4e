//! Statistics Output
//!
//! Accumulates per-tick reports into a run summary written as `stats.json`.

use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::TickReport;

/// Statistics file name inside the output directory
pub const STATS_FILE_NAME: &str = "stats.json";

/// Summary of a tick for history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub moved: usize,
    pub replanned: usize,
    pub mean_speed_kmh: f64,
}

/// Distribution of mean tick speeds over the whole run, km/h
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeedDistribution {
    pub slow: usize,   // < 20
    pub medium: usize, // 20-50
    pub fast: usize,   // > 50
    pub highest_speed_kmh: f64,
    pub average_speed_kmh: f64,
}

/// Overall run statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub population: usize,
    pub total_moves: usize,
    pub total_replans: usize,
    pub total_degenerate_legs: usize,
    pub total_clamped: usize,
    pub average_replans_per_tick: f64,
    pub speed_distribution: SpeedDistribution,
    pub tick_history: Vec<TickSummary>,
}

/// Most recent ticks kept in `tick_history`
pub const DEFAULT_HISTORY_LIMIT: usize = 3600;

/// Accumulates tick reports during a run.
///
/// Totals cover every recorded tick; the per-tick history only keeps the
/// newest `history_limit` entries.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    pub total_ticks: u64,
    pub total_moves: usize,
    pub total_replans: usize,
    pub total_degenerate_legs: usize,
    pub total_clamped: usize,
    pub population: usize,
    pub highest_speed_kmh: f64,
    pub tick_history: VecDeque<TickSummary>,
    history_limit: usize,
    speed_sum: f64,
    slow_ticks: usize,
    medium_ticks: usize,
    fast_ticks: usize,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            total_ticks: 0,
            total_moves: 0,
            total_replans: 0,
            total_degenerate_legs: 0,
            total_clamped: 0,
            population: 0,
            highest_speed_kmh: 0.0,
            tick_history: VecDeque::with_capacity(history_limit.min(DEFAULT_HISTORY_LIMIT)),
            history_limit,
            speed_sum: 0.0,
            slow_ticks: 0,
            medium_ticks: 0,
            fast_ticks: 0,
        }
    }

    /// Record the outcome of one committed tick
    pub fn record_tick(&mut self, report: &TickReport) {
        self.total_ticks += 1;
        self.total_moves += report.moved;
        self.total_replans += report.replanned;
        self.total_degenerate_legs += report.degenerate_legs;
        self.total_clamped += report.clamped;
        self.population = report.entities;
        self.highest_speed_kmh = self.highest_speed_kmh.max(report.max_speed_kmh);

        self.speed_sum += report.mean_speed_kmh;
        if report.mean_speed_kmh < 20.0 {
            self.slow_ticks += 1;
        } else if report.mean_speed_kmh <= 50.0 {
            self.medium_ticks += 1;
        } else {
            self.fast_ticks += 1;
        }

        if self.history_limit == 0 {
            return;
        }
        if self.tick_history.len() == self.history_limit {
            self.tick_history.pop_front();
        }
        self.tick_history.push_back(TickSummary {
            tick: report.tick,
            moved: report.moved,
            replanned: report.replanned,
            mean_speed_kmh: report.mean_speed_kmh,
        });
    }

    pub fn ticks_recorded(&self) -> u64 {
        self.total_ticks
    }

    /// Generate final statistics
    pub fn generate_stats(&self) -> SimulationStats {
        let total_ticks = self.total_ticks;
        let (average_replans_per_tick, average_speed_kmh) = if total_ticks > 0 {
            (
                self.total_replans as f64 / total_ticks as f64,
                self.speed_sum / total_ticks as f64,
            )
        } else {
            (0.0, 0.0)
        };

        SimulationStats {
            total_ticks,
            population: self.population,
            total_moves: self.total_moves,
            total_replans: self.total_replans,
            total_degenerate_legs: self.total_degenerate_legs,
            total_clamped: self.total_clamped,
            average_replans_per_tick,
            speed_distribution: SpeedDistribution {
                slow: self.slow_ticks,
                medium: self.medium_ticks,
                fast: self.fast_ticks,
                highest_speed_kmh: self.highest_speed_kmh,
                average_speed_kmh,
            },
            tick_history: self.tick_history.iter().cloned().collect(),
        }
    }
}

/// Write statistics to `<output_dir>/stats.json`
pub fn write_stats(stats: &SimulationStats, output_dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let json = serde_json::to_string_pretty(stats)?;
    let path = output_dir.join(STATS_FILE_NAME);
    fs::write(&path, json)?;
    Ok(path)
}
