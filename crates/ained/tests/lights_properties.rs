//! Property-based tests for the cross flip, board reconstruction, device
//! images and the Lights Out solver.

use proptest::prelude::*;
use ained::{Ained, Board, LightsOutSolver, Region, SimFabric, COLUMNS, ROWS};

/// A region that fits the grid, at most 9×9.
fn region() -> impl Strategy<Value = Region> {
    (1usize..=9, 1usize..=9).prop_flat_map(|(rows, cols)| {
        (0..=ROWS - rows, 0..=COLUMNS - cols)
            .prop_map(move |(r, c)| Region::new(r, c, rows, cols))
    })
}

/// A region with a board of its shape and a target cell inside it.
fn game() -> impl Strategy<Value = (Region, Board, (usize, usize))> {
    region().prop_flat_map(|region| {
        (
            Just(region),
            prop::collection::vec(any::<bool>(), region.len()),
            (0..region.num_rows, 0..region.num_cols),
        )
            .prop_map(|(region, cells, target)| {
                let board = Board::from_cells(region.num_rows, region.num_cols, cells).unwrap();
                (region, board, target)
            })
    })
}

fn square_board(n: usize) -> impl Strategy<Value = Board> {
    prop::collection::vec(any::<bool>(), n * n)
        .prop_map(move |cells| Board::from_cells(n, n, cells).unwrap())
}

// =============================================================================
// Cross flip
// =============================================================================

proptest! {
    /// The device flip matches the reference cross toggle on the board.
    #[test]
    fn prop_flip_matches_reference((region, start, (row, col)) in game()) {
        let mut device = Ained::new(SimFabric::new(0));
        device.reconstruct_board(region, &start).unwrap();
        device.flip_lights(region, row, col).unwrap();

        let mut expected = start;
        expected.toggle_cross(row, col);
        prop_assert_eq!(device.get_board(region).unwrap(), expected);
        prop_assert!(!device.bypass());
        prop_assert!(device.pending().is_none());
    }

    /// Flipping the same cell twice restores the region.
    #[test]
    fn prop_flip_self_inverse((region, start, (row, col)) in game()) {
        let mut device = Ained::new(SimFabric::new(0));
        device.reconstruct_board(region, &start).unwrap();
        device.flip_lights(region, row, col).unwrap();
        device.flip_lights(region, row, col).unwrap();
        prop_assert_eq!(device.get_board(region).unwrap(), start);
    }

    /// Only the target and its in-region orthogonal neighbours change.
    #[test]
    fn prop_flip_locality((region, start, (row, col)) in game()) {
        let mut device = Ained::new(SimFabric::new(0));
        device.reconstruct_board(region, &start).unwrap();
        device.flip_lights(region, row, col).unwrap();
        let after = device.get_board(region).unwrap();

        for r in 0..region.num_rows {
            for c in 0..region.num_cols {
                let in_cross = r.abs_diff(row) + c.abs_diff(col) <= 1;
                prop_assert_eq!(after.get(r, c) != start.get(r, c), in_cross);
            }
        }
    }

    /// Reconstruction leaves cells outside the region alone.
    #[test]
    fn prop_reconstruct_is_local((region, board, _) in game(), outside_row in 0..ROWS, outside_col in 0..COLUMNS) {
        let inside = (region.start_row..region.start_row + region.num_rows).contains(&outside_row)
            && (region.start_col..region.start_col + region.num_cols).contains(&outside_col);
        prop_assume!(!inside);
        let mut device = Ained::new(SimFabric::new(0));
        device.flip_isolated_bit(outside_row, outside_col).unwrap();
        device.reconstruct_board(region, &board).unwrap();
        prop_assert_eq!(device.get_board(region).unwrap(), board);
        prop_assert!(device.get_bit(outside_row, outside_col).unwrap());
    }
}

// =============================================================================
// Device images
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// store followed by restore reproduces words and registers.
    #[test]
    fn prop_image_roundtrip(
        (region, board, _) in game(),
        mask: u64,
        groups in prop::collection::vec(any::<u32>(), 12),
        seeds: [u32; 3],
    ) {
        let mut device = Ained::new(SimFabric::new(3));
        device.reconstruct_board(region, &board).unwrap();
        for (i, &g) in groups.iter().enumerate() {
            device.set_coefficient_group(i, g).unwrap();
        }
        device.set_dipole_seeds(2, seeds).unwrap();
        device.set_mask(mask);

        let (mut mem, mut state) = (Vec::new(), Vec::new());
        device.store_memory_to(&mut mem).unwrap();
        device.store_state_to(&mut state).unwrap();

        let mut fresh = Ained::new(SimFabric::new(3));
        fresh.restore_memory_from(mem.as_slice()).unwrap();
        fresh.restore_state_from(state.as_slice()).unwrap();
        prop_assert_eq!(fresh.words(), device.words());
        prop_assert_eq!(fresh.register_snapshot(), device.register_snapshot());
    }
}

// =============================================================================
// Solver
// =============================================================================

proptest! {
    /// A solvable board is cleared by its solution; an unsolvable one has none.
    #[test]
    fn prop_solve_clears(board in square_board(5)) {
        let solver = LightsOutSolver::new(5, 5);
        match solver.solve(&board) {
            Some(presses) => {
                prop_assert!(solver.is_solvable(&board));
                let mut after = board;
                for (r, c) in presses.lit_cells() {
                    after.toggle_cross(r, c);
                }
                prop_assert!(after.is_dark());
            }
            None => prop_assert!(!solver.is_solvable(&board)),
        }
    }

    /// The optimal solution is never longer than the plain one.
    #[test]
    fn prop_optimal_not_longer(board in square_board(4)) {
        let solver = LightsOutSolver::new(4, 4);
        if let Some(plain) = solver.solve(&board) {
            let optimal = solver.optimal_solution(&board).unwrap();
            prop_assert!(optimal.lit_count() <= plain.lit_count());
        }
    }

    /// Boards built from presses are always solvable.
    #[test]
    fn prop_pressed_boards_solvable(presses in square_board(5)) {
        let mut board = Board::new(5, 5);
        for (r, c) in presses.lit_cells() {
            board.toggle_cross(r, c);
        }
        prop_assert!(LightsOutSolver::new(5, 5).is_solvable(&board));
    }
}
