//! Tests for site layout generation.

use proptest::prelude::*;

use qrc_sim::layout::{Lattice, SiteLayout, generate_sites};
use qrc_sim::LayoutError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn zero_sites_is_rejected() {
    assert_eq!(generate_sites(0, 5.0), Err(LayoutError::EmptyLayout(0)));
}

#[test]
fn non_positive_spacing_is_rejected() {
    assert!(matches!(
        generate_sites(3, 0.0),
        Err(LayoutError::InvalidSpacing(_))
    ));
    assert!(matches!(
        generate_sites(3, -1.0),
        Err(LayoutError::InvalidSpacing(_))
    ));
    assert!(matches!(
        SiteLayout::generate(Lattice::Square, 3, f64::NAN),
        Err(LayoutError::InvalidSpacing(_))
    ));
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn single_site_has_no_pairs() {
    let layout = generate_sites(1, 5.0).unwrap();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout.min_distance(), None);
    assert_eq!(layout.pairs().count(), 0);
}

#[test]
fn chain_positions() {
    let layout = generate_sites(4, 6.5).unwrap();
    assert_eq!(layout.lattice(), Lattice::Chain);
    assert_eq!(
        layout.positions(),
        &[[0.0, 0.0], [6.5, 0.0], [13.0, 0.0], [19.5, 0.0]]
    );
    assert!((layout.distance(0, 3) - 19.5).abs() < 1e-12);
}

#[test]
fn square_fills_rows() {
    let layout = SiteLayout::generate(Lattice::Square, 5, 2.0).unwrap();
    assert_eq!(
        layout.positions(),
        &[[0.0, 0.0], [2.0, 0.0], [4.0, 0.0], [0.0, 2.0], [2.0, 2.0]]
    );
    assert!((layout.min_distance().unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn triangular_nearest_neighbours_are_equidistant() {
    let layout = SiteLayout::generate(Lattice::Triangular, 4, 3.0).unwrap();
    // Sites 0, 1 on the first row and 2 shifted by half a spacing above.
    assert!((layout.distance(0, 1) - 3.0).abs() < 1e-12);
    assert!((layout.distance(0, 2) - 3.0).abs() < 1e-12);
    assert!((layout.distance(1, 2) - 3.0).abs() < 1e-12);
}

#[test]
fn equal_parameters_give_identical_layouts() {
    let a = SiteLayout::generate(Lattice::Triangular, 7, 4.2).unwrap();
    let b = SiteLayout::generate(Lattice::Triangular, 7, 4.2).unwrap();
    assert_eq!(a, b);
}

#[test]
fn layout_serde_round_trip() {
    let layout = SiteLayout::generate(Lattice::Square, 4, 5.0).unwrap();
    let json = serde_json::to_string(&layout).unwrap();
    let back: SiteLayout = serde_json::from_str(&json).unwrap();
    assert_eq!(layout, back);
    assert!(json.contains("\"square\""));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn any_lattice() -> impl Strategy<Value = Lattice> {
    prop_oneof![
        Just(Lattice::Chain),
        Just(Lattice::Square),
        Just(Lattice::Triangular),
    ]
}

proptest! {
    #[test]
    fn count_and_minimum_spacing_hold(
        lattice in any_lattice(),
        count in 1usize..40,
        spacing in 0.1f64..50.0,
    ) {
        let layout = SiteLayout::generate(lattice, count, spacing).unwrap();
        prop_assert_eq!(layout.len(), count);
        if let Some(d) = layout.min_distance() {
            prop_assert!(d >= spacing - 1e-9 * spacing);
        }
    }
}
