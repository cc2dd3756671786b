//! Atom-array geometry.
//!
//! Sites are placed on a regular lattice with nearest-neighbour distance
//! exactly `spacing` (µm).  Rows are filled left to right, bottom to top:
//!
//! ```text
//!   chain        ●──●──●──●──●
//!
//!   square       ●  ●  ●            triangular    ●  ●
//!                ●  ●  ●                        ●  ●  ●
//!                ●  ●  ●                         ●  ●  ●
//! ```
//!
//! Two- dimensional lattices use `ceil(√count)` sites per row.  Generation
//! is a pure function of `(lattice, count, spacing)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Relative slack used when checking the minimum-distance invariant.
const SPACING_SLACK: f64 = 1e-9;

/// Lattice family used to place the sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lattice {
    /// One-dimensional chain along x.
    #[default]
    Chain,
    /// Square grid.
    Square,
    /// Triangular grid (alternate rows shifted by half a spacing).
    Triangular,
}

impl Lattice {
    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Lattice::Chain => "chain",
            Lattice::Square => "square",
            Lattice::Triangular => "triangular",
        }
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lattice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chain" | "line" => Ok(Lattice::Chain),
            "square" => Ok(Lattice::Square),
            "triangular" | "triangle" => Ok(Lattice::Triangular),
            other => Err(format!(
                "unknown lattice '{other}' (expected chain, square or triangular)"
            )),
        }
    }
}

/// A 2D site position in µm.
pub type Position = [f64; 2];

/// Ordered site positions of one reservoir configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLayout {
    lattice: Lattice,
    spacing: f64,
    positions: Vec<Position>,
}

/// Generate `count` sites on a chain with nearest-neighbour distance `spacing`.
pub fn generate_sites(count: usize, spacing: f64) -> Result<SiteLayout, LayoutError> {
    SiteLayout::generate(Lattice::Chain, count, spacing)
}

impl SiteLayout {
    /// Generate `count` sites on `lattice`.
    pub fn generate(lattice: Lattice, count: usize, spacing: f64) -> Result<Self, LayoutError> {
        if count < 1 {
            return Err(LayoutError::EmptyLayout(count));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(LayoutError::InvalidSpacing(spacing));
        }

        let positions: Vec<Position> = match lattice {
            Lattice::Chain => (0..count).map(|i| [i as f64 * spacing, 0.0]).collect(),
            Lattice::Square => {
                let width = row_width(count);
                (0..count)
                    .map(|i| {
                        let (row, col) = (i / width, i % width);
                        [col as f64 * spacing, row as f64 * spacing]
                    })
                    .collect()
            }
            Lattice::Triangular => {
                let width = row_width(count);
                let row_height = spacing * 3.0_f64.sqrt() / 2.0;
                (0..count)
                    .map(|i| {
                        let (row, col) = (i / width, i % width);
                        let shift = if row % 2 == 1 { 0.5 } else { 0.0 };
                        [(col as f64 + shift) * spacing, row as f64 * row_height]
                    })
                    .collect()
            }
        };

        let layout = Self {
            lattice,
            spacing,
            positions,
        };
        layout.check_min_distance()?;
        Ok(layout)
    }

    fn check_min_distance(&self) -> Result<(), LayoutError> {
        let floor = self.spacing * (1.0 - SPACING_SLACK);
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let d = self.distance(i, j);
                if d < floor {
                    return Err(LayoutError::CoincidentSites {
                        i,
                        j,
                        distance: d,
                        spacing: self.spacing,
                    });
                }
            }
        }
        Ok(())
    }

    /// Lattice family.
    pub fn lattice(&self) -> Lattice {
        self.lattice
    }

    /// Nearest-neighbour spacing in µm.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for a generated layout.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Site positions in index order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Euclidean distance between sites `i` and `j`.
    ///
    /// # Panics
    /// If either index is out of range.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let [xi, yi] = self.positions[i];
        let [xj, yj] = self.positions[j];
        (xi - xj).hypot(yi - yj)
    }

    /// Smallest pairwise distance, or `None` for a single site.
    pub fn min_distance(&self) -> Option<f64> {
        let mut best: Option<f64> = None;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let d = self.distance(i, j);
                best = Some(best.map_or(d, |b| b.min(d)));
            }
        }
        best
    }

    /// Iterate over all unordered pairs `(i, j, r_ij)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.len()).flat_map(move |i| {
            ((i + 1)..self.len()).map(move |j| (i, j, self.distance(i, j)))
        })
    }
}

fn row_width(count: usize) -> usize {
    let mut w = (count as f64).sqrt().ceil() as usize;
    // Guard against floating-point undershoot for perfect squares.
    while w * w < count {
        w += 1;
    }
    w.max(1)
}
