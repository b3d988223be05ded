//! Painter's ordering of tiles.

use super::element::Tile;

/// Orders tiles farthest first so that plain overdraw paints a correct
/// picture. Tiles with a NaN depth are left out; equal depths keep their
/// input order.
pub fn back_to_front<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Vec<&'a Tile> {
    let mut hidden = 0usize;
    let mut ordered: Vec<&Tile> = tiles
        .into_iter()
        .filter(|t| {
            let keep = !t.depth.is_nan();
            hidden += usize::from(!keep);
            keep
        })
        .collect();
    // `sort_by` is stable.
    ordered.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    if hidden > 0 {
        log::trace!("{hidden} tiles without a depth left out of the draw order");
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ElementId, TileKind};
    use proptest::prelude::*;

    fn tile(index: usize, depth: f64) -> Tile {
        Tile {
            element: ElementId(0),
            index,
            kind: TileKind::Point,
            corners: Vec::new(),
            projected: Vec::new(),
            depth,
        }
    }

    #[test]
    fn test_farthest_first() {
        let tiles = [tile(0, 1.0), tile(1, 3.0), tile(2, 2.0)];
        let order: Vec<usize> = back_to_front(&tiles).iter().map(|t| t.index).collect();
        assert_eq!(order, [1, 2, 0]);
    }

    #[test]
    fn test_nan_excluded() {
        let tiles = [tile(0, f64::NAN), tile(1, 0.5), tile(2, f64::NAN)];
        let order = back_to_front(&tiles);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].index, 1);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let tiles = [tile(0, 1.0), tile(1, 2.0), tile(2, 1.0), tile(3, 2.0)];
        let order: Vec<usize> = back_to_front(&tiles).iter().map(|t| t.index).collect();
        assert_eq!(order, [1, 3, 0, 2]);
    }

    proptest! {
        #[test]
        fn prop_descending_and_stable(depths in prop::collection::vec(
            prop_oneof![(0..5i32).prop_map(f64::from), Just(f64::NAN)],
            0..40,
        )) {
            let tiles: Vec<Tile> = depths.iter().enumerate().map(|(i, d)| tile(i, *d)).collect();
            let order = back_to_front(&tiles);
            prop_assert_eq!(order.len(), depths.iter().filter(|d| !d.is_nan()).count());
            for w in order.windows(2) {
                prop_assert!(w[0].depth >= w[1].depth);
                if w[0].depth == w[1].depth {
                    prop_assert!(w[0].index < w[1].index);
                }
            }
        }
    }
}
