#![no_main]

use arbitrary::Arbitrary;
use hexcolony::invariants::check_invariants;
use hexcolony::{
    BuildingKind, BuildingTemplate, Colony, ColonyError, EconomyConfig, GridConfig, GridId,
    HexTileCoordinate, LedgerConfig, ResourceType,
};
use libfuzzer_sys::fuzz_target;

/// One placement request against a small grid.
#[derive(Arbitrary, Debug)]
struct Request {
    /// Index into the template list.
    template: u8,
    /// Anchor cell (components are folded into a small range).
    anchor: (i8, i8, i8),
    /// Ticks to run after the request.
    ticks: u8,
}

/// Structured input for placement fuzzing.
#[derive(Arbitrary, Debug)]
struct PlacementInput {
    /// Footprints as raw offsets, folded into a small range.
    shapes: Vec<Vec<(i8, i8, i8)>>,
    /// Metal cost per template.
    costs: Vec<u8>,
    /// Power change per template.
    power: Vec<i8>,
    /// Placement requests in order.
    requests: Vec<Request>,
}

fn occupied_cells(colony: &Colony, grid: GridId) -> usize {
    colony
        .grid(grid)
        .map_or(0, |g| g.tiles().filter(|t| t.is_occupied()).count())
}

fn fold((q, r, h): (i8, i8, i8), span: i8) -> HexTileCoordinate {
    HexTileCoordinate::new(
        i32::from(q % span),
        i32::from(r % span),
        i32::from(h % span),
    )
}

fuzz_target!(|input: PlacementInput| {
    let config = EconomyConfig {
        resources: [
            (ResourceType::Metal, LedgerConfig::bounded(500.0, 1000.0)),
            (ResourceType::Power, LedgerConfig::bounded(50.0, 1000.0)),
        ]
        .into(),
    };
    let Ok(mut colony) = Colony::new(&config) else {
        return;
    };
    let grid = colony.add_grid(
        1,
        GridConfig {
            radius: 4,
            max_height: 3,
            ..GridConfig::default()
        },
    );

    let mut names = Vec::new();
    for (i, shape) in input.shapes.iter().take(8).enumerate() {
        let name = format!("t{i}");
        let cost = f64::from(input.costs.get(i).copied().unwrap_or(0));
        let power = f64::from(input.power.get(i).copied().unwrap_or(0));
        let template = BuildingTemplate::new(name.clone(), BuildingKind::Base)
            .with_shape(shape.iter().take(6).map(|&o| fold(o, 3)))
            .with_cost(ResourceType::Metal, cost)
            .with_net_change(ResourceType::Power, power);
        colony.add_template(template);
        names.push(name);
    }
    if names.is_empty() {
        return;
    }

    for request in input.requests.iter().take(64) {
        let name = &names[usize::from(request.template) % names.len()];
        let anchor = fold(request.anchor, 6);
        let metal = colony.economy().amount(ResourceType::Metal);
        let occupied = occupied_cells(&colony, grid);
        let buildings = colony.buildings().len();

        match colony.place_building(grid, anchor, name) {
            Ok(_) => assert_eq!(colony.buildings().len(), buildings + 1),
            Err(ColonyError::InsufficientResources(_) | ColonyError::PlacementBlocked { .. }) => {
                let metal_now = colony.economy().amount(ResourceType::Metal);
                assert_eq!(metal_now.to_bits(), metal.to_bits());
                assert_eq!(colony.buildings().len(), buildings);
                let after = occupied_cells(&colony, grid);
                assert_eq!(after, occupied, "rejected placement changed occupancy");
            }
            Err(e) => panic!("unexpected placement error: {e}"),
        }

        for _ in 0..request.ticks.min(4) {
            colony.tick();
        }

        let violations = check_invariants(&colony);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
    }
});
