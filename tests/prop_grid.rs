//! Property-based tests for grid bounds and footprint placement.
//!
//! Run with: cargo test --release prop_grid

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use hexcolony::{Footprint, GridConfig, GridId, HexGridData, HexTileCoordinate};

fn coord(span: i32) -> impl Strategy<Value = HexTileCoordinate> {
    (-span..=span, -span..=span, -2..=span).prop_map(|(q, r, h)| HexTileCoordinate::new(q, r, h))
}

fn shape() -> impl Strategy<Value = Vec<HexTileCoordinate>> {
    prop::collection::vec(coord(2), 1..5)
}

fn grid() -> HexGridData {
    HexGridData::new(
        GridId(0),
        1,
        GridConfig {
            radius: 3,
            max_height: 2,
            ..GridConfig::default()
        },
    )
}

fn occupied(grid: &HexGridData) -> BTreeSet<HexTileCoordinate> {
    grid.tiles()
        .filter(|t| t.is_occupied())
        .map(|t| t.coordinate())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 2000, max_global_rejects: 16384, ..ProptestConfig::default() })]

    /// Out-of-bounds lookups fail and never materialize a cell.
    #[test]
    fn prop_out_of_bounds_creates_nothing(c in coord(6)) {
        let mut grid = grid();
        let inside = grid.contains(c);
        let result = grid.get_or_create_tile(c);

        prop_assert_eq!(result.is_ok(), inside);
        prop_assert_eq!(grid.len(), usize::from(inside));
        prop_assert_eq!(grid.get(c).is_some(), inside);
    }

    /// A placement claims its whole footprint or nothing at all.
    #[test]
    fn prop_placement_all_or_nothing(
        placements in prop::collection::vec((coord(4), shape()), 1..12),
    ) {
        let mut grid = grid();

        for (anchor, shape) in &placements {
            let before = occupied(&grid);
            let fits = grid.can_place(*anchor, shape);
            let committed = grid.validate_and_commit_placement(*anchor, shape);
            let after = occupied(&grid);

            prop_assert_eq!(fits, committed);
            if committed {
                let cells: BTreeSet<_> = shape.cells_at(*anchor).unwrap().into_iter().collect();
                prop_assert!(cells.iter().all(|c| grid.contains(*c)));
                prop_assert!(cells.is_disjoint(&before));
                let expected: BTreeSet<_> = before.union(&cells).copied().collect();
                prop_assert_eq!(after, expected);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    /// A rejected placement leaves tile flags untouched too.
    #[test]
    fn prop_rejected_placement_no_side_effects(anchor in coord(4), shape in shape()) {
        let mut grid = grid();
        let blocker = vec![HexTileCoordinate::ORIGIN];
        for cell in shape.cells_at(anchor).unwrap() {
            if grid.contains(cell) {
                grid.validate_and_commit_placement(cell, &blocker);
                break;
            }
        }
        let snapshot: Vec<_> = {
            let mut tiles: Vec<_> = grid.tiles().copied().collect();
            tiles.sort_by_key(|t| t.coordinate());
            tiles
        };

        if !grid.validate_and_commit_placement(anchor, &shape) {
            let mut tiles: Vec<_> = grid.tiles().copied().collect();
            tiles.sort_by_key(|t| t.coordinate());
            prop_assert_eq!(tiles, snapshot);
        }
    }

    /// World positions map back to the cell they came from.
    #[test]
    fn prop_world_position_inverts(c in coord(3)) {
        let grid = grid();
        prop_assume!(grid.contains(c));
        prop_assert_eq!(grid.coordinate_at(grid.world_position(c)), Some(c));
    }
}
