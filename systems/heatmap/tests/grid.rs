use item_wheel_core::{ItemId, ItemWheel, Layout};
use item_wheel_system_heatmap::{build_layout_grid, ProbabilityBucket};
use item_wheel_system_statistics::build_global_stats;
use item_wheel_tables::{ItemTables, RedirectTable, WheelTable};

fn item(value: u8) -> ItemId {
    ItemId::new(value).expect("valid item")
}

fn wheel(values: &[u8]) -> ItemWheel {
    values.iter().map(|value| item(*value)).collect()
}

/// Wheel 0 for every slot except the first state of each (lap, halfway)
/// block, which draws wheels 1, 1, 2.
fn tables() -> ItemTables {
    let wheels = WheelTable::new(vec![
        wheel(&[0x03, 0x03, 0x04]),
        wheel(&[0x0e, 0x0b]),
        wheel(&[0x0b]),
    ]);
    let mut redirects = vec![0; 180];
    for block in 0..6 {
        redirects[block * 30] = 1;
        redirects[block * 30 + 1] = 1;
        redirects[block * 30 + 2] = 2;
    }
    ItemTables::new(wheels, RedirectTable::new(redirects))
}

#[test]
fn grid_reproduces_hand_computed_probabilities() {
    let layout = Layout::default();
    let stats = build_global_stats(&tables(), &layout).expect("in range");

    let turbo = build_layout_grid(&stats, item(0x03), &layout);
    assert_eq!(turbo.rows(), 10);
    assert_eq!(turbo.columns(), 6);
    for column in 0..6 {
        assert_eq!(turbo.get(0, column), Some(0.0));
        for row in 1..10 {
            assert_eq!(turbo.get(row, column), Some(1.0));
        }
    }

    let dynamite = build_layout_grid(&stats, item(0x0b), &layout);
    assert_eq!(dynamite.get(0, 0), Some(1.0));
    assert_eq!(dynamite.get(1, 0), Some(0.0));

    let clock = build_layout_grid(&stats, item(0x0e), &layout);
    let value = clock.get(0, 5).expect("inside grid");
    assert!((value - 2.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(ProbabilityBucket::from_probability(value), ProbabilityBucket::High);
}

#[test]
fn grid_does_not_filter_two_player_items() {
    let layout = Layout::default();
    let stats = build_global_stats(&tables(), &layout).expect("in range");

    let grid = build_layout_grid(&stats, item(0x11), &layout);
    assert_eq!(grid.item(), item(0x11));
    assert!(grid.iter_rows().flatten().all(|value| *value == 0.0));
}
