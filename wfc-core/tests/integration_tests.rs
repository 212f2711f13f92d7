use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use wfc_core::{
    run, CpuConstraintPropagator, CpuEntropyCalculator, PossibilityGrid, SelectionStrategy,
    WfcConfig, WfcError,
};
use wfc_rules::{Direction, TileCatalog, TileDefinition, TileId};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn catalog(tiles: Vec<TileDefinition>) -> Arc<TileCatalog> {
    Arc::new(TileCatalog::new(tiles).expect("valid test catalog"))
}

// Pipes: a tile's edge is "p" where a pipe leaves it and "-" otherwise.
fn pipe_catalog() -> Arc<TileCatalog> {
    catalog(vec![
        TileDefinition::new("empty", "-", "-", "-", "-"),
        TileDefinition::new("horizontal", "-", "p", "-", "p"),
        TileDefinition::new("vertical", "p", "-", "p", "-"),
        TileDefinition::new("cross", "p", "p", "p", "p"),
        TileDefinition::new("corner_ne", "p", "p", "-", "-"),
        TileDefinition::new("corner_sw", "-", "-", "p", "p"),
    ])
}

fn run_with(
    grid: &mut PossibilityGrid,
    strategy: SelectionStrategy,
    seed: u64,
) -> Result<wfc_core::RunSummary, WfcError> {
    run(
        grid,
        Box::new(CpuConstraintPropagator::new()),
        Box::new(CpuEntropyCalculator::new(strategy)),
        &WfcConfig::builder().seed(seed).build(),
    )
}

// Assert the final state is valid: every shared edge carries equal labels.
fn assert_edges_match(grid: &PossibilityGrid) {
    let catalog = grid.catalog();
    let assignment = grid.assignment().expect("grid is fully collapsed");
    for (x, y, tile) in assignment.iter() {
        for direction in [Direction::East, Direction::South] {
            if let Some((nx, ny)) = grid.neighbor(x, y, direction) {
                let other = assignment.get(nx, ny).unwrap();
                let here = catalog.get(*tile).unwrap().socket(direction);
                let there = catalog.get(*other).unwrap().socket(direction.opposite());
                assert_eq!(here, there, "mismatch between ({x},{y}) and ({nx},{ny})");
            }
        }
    }
}

#[test]
fn test_single_cell_collapses_in_one_step() {
    let mut grid = PossibilityGrid::new(
        1,
        1,
        catalog(vec![
            TileDefinition::new("A", "a", "b", "c", "d"),
            TileDefinition::new("B", "e", "f", "g", "h"),
            TileDefinition::new("C", "i", "j", "k", "l"),
        ]),
    );
    let mut rng = StdRng::seed_from_u64(1);
    assert!(!grid.is_fully_collapsed());

    let collapsed = grid.collapse_least_constrained_cell(&mut rng).unwrap();
    assert_eq!(collapsed, Some((0, 0)));
    assert!(grid.is_fully_collapsed());
    // Nothing is left to select.
    assert_eq!(grid.collapse_least_constrained_cell(&mut rng).unwrap(), None);
}

#[test]
fn test_left_collapse_shrinks_right_domain() {
    let mut grid = PossibilityGrid::new(
        2,
        1,
        catalog(vec![
            TileDefinition::new("A", "n", "x", "s", "x"),
            TileDefinition::new("B", "n", "y", "s", "y"),
        ]),
    );
    // Force the left cell to A, then let propagation run.
    grid.get_mut(0, 0).unwrap().retain(|tile| tile == TileId(0));
    let mut rng = StdRng::seed_from_u64(0);
    grid.collapse_cell(0, 0, &mut rng).unwrap();

    let right = grid.get(1, 0).unwrap();
    assert_eq!(right.domain_size(), 1);
    assert!(right.contains(TileId(0)));
}

#[test]
fn test_left_collapse_with_no_compatible_right_tile_is_contradiction() {
    let mut grid = PossibilityGrid::new(
        2,
        1,
        catalog(vec![
            TileDefinition::new("A", "n", "x", "s", "x"),
            TileDefinition::new("B", "n", "y", "s", "z"),
        ]),
    );
    // The right cell may only hold B, whose west "z" never meets an east "x".
    grid.get_mut(1, 0).unwrap().retain(|tile| tile == TileId(1));
    grid.get_mut(0, 0).unwrap().retain(|tile| tile == TileId(0));
    let mut rng = StdRng::seed_from_u64(0);

    let err = grid.collapse_cell(0, 0, &mut rng).unwrap_err();
    assert!(matches!(err, WfcError::Contradiction(1, 0)));
    assert!(err.is_contradiction());
}

#[test]
fn test_single_tile_catalog_starts_collapsed() {
    let construction = PossibilityGrid::new(
        4,
        3,
        catalog(vec![TileDefinition::new("only", "a", "b", "c", "d")]),
    );
    assert!(construction.is_fully_collapsed());
    assert_eq!(construction.collapsed_count(), 12);

    let mut grid = PossibilityGrid::new(
        4,
        3,
        catalog(vec![TileDefinition::new("only", "a", "a", "a", "a")]),
    );
    let summary = run_with(&mut grid, SelectionStrategy::FirstMinimum, 9).unwrap();
    assert_eq!(summary.iterations, 0);
}

#[test]
fn test_run_produces_consistent_pipes() {
    init_logger();
    for seed in 0..20 {
        let mut grid = PossibilityGrid::new(6, 5, pipe_catalog());
        match run_with(&mut grid, SelectionStrategy::RandomMinimum, seed) {
            Ok(summary) => {
                assert!(grid.is_fully_collapsed());
                assert!(summary.iterations <= 30);
                assert_edges_match(&grid);
            }
            Err(e) => assert!(e.is_contradiction(), "unexpected error: {e}"),
        }
    }
}

#[test]
fn test_same_seed_same_assignment() {
    for strategy in [SelectionStrategy::FirstMinimum, SelectionStrategy::RandomMinimum] {
        let mut first = PossibilityGrid::new(7, 4, pipe_catalog());
        let mut second = PossibilityGrid::new(7, 4, pipe_catalog());
        let a = run_with(&mut first, strategy, 1234).map(|_| first.assignment());
        let b = run_with(&mut second, strategy, 1234).map(|_| second.assignment());
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            (a, b) => panic!("runs diverged: {a:?} vs {b:?}"),
        }
    }
}

#[test]
fn test_manual_generation_loop() {
    // The loop a caller would write: select + collapse until done.
    let mut grid = PossibilityGrid::new(4, 4, pipe_catalog());
    let mut rng = StdRng::seed_from_u64(77);
    let mut steps = 0;
    let outcome = loop {
        if grid.is_fully_collapsed() {
            break Ok(());
        }
        match grid.collapse_least_constrained_cell(&mut rng) {
            Ok(Some(_)) => steps += 1,
            Ok(None) => break Err(WfcError::IncompleteCollapse),
            Err(e) => break Err(e),
        }
    };
    match outcome {
        Ok(()) => {
            assert!(steps <= 16);
            assert_edges_match(&grid);
        }
        Err(e) => assert!(e.is_contradiction(), "unexpected error: {e}"),
    }
}
