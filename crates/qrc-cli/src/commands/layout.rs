//! Layout command implementation.

use anyhow::Result;
use console::style;

use qrc_sim::{Lattice, SiteLayout};

/// Execute the layout command.
pub fn execute(sites: usize, spacing: f64, lattice: Lattice) -> Result<()> {
    let layout = SiteLayout::generate(lattice, sites, spacing)?;

    println!(
        "{} {} lattice, {} sites, spacing {} µm",
        style("→").cyan().bold(),
        style(lattice).yellow(),
        layout.len(),
        spacing
    );
    for (i, [x, y]) in layout.positions().iter().enumerate() {
        println!("  {:>3}: ({:>8.3}, {:>8.3})", style(i).cyan(), x, y);
    }
    if let Some(min) = layout.min_distance() {
        println!("  Minimum distance: {}", style(format!("{min:.3} µm")).yellow());
    }

    Ok(())
}
