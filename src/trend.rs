use crate::history::{recent, SessionResult};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_HEIGHT: usize = 10;
pub const DEFAULT_WIDTH: usize = 60;
pub const MIN_HEIGHT: usize = 3;
pub const MIN_WIDTH: usize = 10;

/// Columns reserved next to the graph for the axis labels and border
const LABEL_GUTTER: u16 = 20;

const MIN_PADDING: f64 = 0.9;
const MAX_PADDING: f64 = 1.1;

/// Grid dimensions, never below a legible floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSize {
    width: usize,
    height: usize,
}

impl Default for GraphSize {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl GraphSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Fit the graph to a terminal `width` columns wide
    pub fn for_terminal(width: u16) -> Self {
        if width > LABEL_GUTTER {
            Self::new((width - LABEL_GUTTER) as usize, DEFAULT_HEIGHT)
        } else {
            Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub x: usize,
    pub y: usize,
    pub wpm: f64,
}

/// A discretized WPM-over-races plot. Row 0 is the top (fastest) row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendGrid {
    pub size: GraphSize,
    pub min_wpm: f64,
    pub max_wpm: f64,
    pub points: Vec<TrendPoint>,
    /// WPM for each row, from `max_wpm` down to `min_wpm`
    pub labels: Vec<f64>,
    pub mean_wpm: f64,
    pub std_dev: f64,
    cells: Vec<Vec<bool>>,
}

impl TrendGrid {
    pub fn is_marked(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Rows top to bottom, each paired with its axis label
    pub fn rows(&self) -> impl Iterator<Item = (f64, &[bool])> + '_ {
        self.labels
            .iter()
            .copied()
            .zip(self.cells.iter().map(Vec::as_slice))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    /// Fewer than two results in the window; `played` is the whole log's size
    InsufficientData { played: usize },
    /// Every result in the window had the same WPM; all points share one row
    Flat(TrendGrid),
    Graph(TrendGrid),
}

impl TrendOutcome {
    /// The grid to draw, flat or not
    pub fn grid(&self) -> Option<&TrendGrid> {
        match self {
            Self::InsufficientData { .. } => None,
            Self::Flat(grid) | Self::Graph(grid) => Some(grid),
        }
    }
}

/// Plot the last `window` results on a `size` grid
pub fn trend(log: &[SessionResult], window: usize, size: GraphSize) -> TrendOutcome {
    let latest = recent(log, window);
    if latest.len() < 2 {
        return TrendOutcome::InsufficientData { played: log.len() };
    }

    let wpms: Vec<f64> = latest.iter().map(|r| r.wpm).collect();
    let lowest = wpms.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = wpms.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let min_wpm = (lowest * MIN_PADDING).max(0.0);
    let max_wpm = highest * MAX_PADDING;
    let range = max_wpm - min_wpm;

    // Re-apply the floors in case the size was built without `new`
    let size = GraphSize::new(size.width, size.height);
    let GraphSize { width, height } = size;
    let last_col = (width - 1) as f64;
    let last_row = (height - 1) as f64;
    let count = wpms.len();

    let mut cells = vec![vec![false; width]; height];
    let points: Vec<TrendPoint> = wpms
        .iter()
        .enumerate()
        .map(|(i, &wpm)| {
            let x = (i as f64 / (count - 1) as f64 * last_col).round() as usize;
            // A zero range only happens when every result is 0 WPM
            let normalized = if range > 0.0 {
                (wpm - min_wpm) / range
            } else {
                0.5
            };
            let y = ((1.0 - normalized) * last_row).round() as usize;
            TrendPoint {
                x: x.min(width - 1),
                y: y.min(height - 1),
                wpm,
            }
        })
        .collect();

    for p in &points {
        cells[p.y][p.x] = true;
    }

    let (mean_wpm, std_dev) = spread(&wpms);
    let labels = (0..height)
        .map(|row| max_wpm - (row as f64 / last_row) * range)
        .collect();

    let grid = TrendGrid {
        size,
        min_wpm,
        max_wpm,
        points,
        labels,
        mean_wpm,
        std_dev,
        cells,
    };
    if lowest == highest {
        TrendOutcome::Flat(grid)
    } else {
        TrendOutcome::Graph(grid)
    }
}

/// Mean and population standard deviation of a non-empty sample
fn spread(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Format an axis label: whole numbers bare, everything else to one decimal
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
