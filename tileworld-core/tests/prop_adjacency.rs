use proptest::prelude::*;
use tileworld_core::adjacency::AdjacencyMap;
use tileworld_core::autotile::{reduce, AutotileEngine, BitmaskTable};
use tileworld_core::{BiomeId, BiomeLayer, BiomeTable};

fn layer() -> impl Strategy<Value = BiomeLayer> {
    (1usize..=12, 1usize..=12).prop_flat_map(|(w, h)| {
        prop::collection::vec(0usize..BiomeId::COUNT, w * h).prop_map(move |ids| {
            BiomeLayer::from_fn(w, h, |x, y| BiomeId::ALL[ids[y * w + x]])
        })
    })
}

fn opposite(slot: usize, distance: usize) -> usize {
    let offsets: Vec<(isize, isize)> = AdjacencyMap::offsets(distance).collect();
    let (dx, dy) = offsets[slot];
    offsets
        .iter()
        .position(|&o| o == (-dx, -dy))
        .expect("offsets are symmetric")
}

proptest! {
    // if b sits next to a, then a sits next to b, at the mirrored offset
    #[test]
    fn adjacency_is_symmetric(layer in layer(), distance in 1usize..=2) {
        let map = AdjacencyMap::build(&layer, distance);
        prop_assert_eq!(map.distance(), distance);
        let offsets: Vec<(isize, isize)> = AdjacencyMap::offsets(map.distance()).collect();

        for y in 0..layer.height() {
            for x in 0..layer.width() {
                for (slot, cell) in map.neighbours(x, y).iter().enumerate() {
                    let (dx, dy) = offsets[slot];
                    let (nx, ny) = (x as isize + dx, y as isize + dy);
                    match cell {
                        None => prop_assert!(layer.get_checked(nx, ny).is_none()),
                        Some(b) => {
                            let (nx, ny) = (nx as usize, ny as usize);
                            prop_assert_eq!(*b, layer.get(nx, ny));
                            let back = map.neighbours(nx, ny)[opposite(slot, map.distance())];
                            prop_assert_eq!(back, Some(layer.get(x, y)));
                        }
                    }
                }
            }
        }
    }

    // whatever the neighbourhood, the engine lands on a valid tile index
    #[test]
    fn every_layer_autotiles(layer in layer()) {
        let biomes = BiomeTable::standard();
        let table = BitmaskTable::new();
        let engine = AutotileEngine::new(&biomes, &table);
        for y in 0..layer.height() {
            for x in 0..layer.width() {
                let mask = engine.bitmask(&layer, x, y);
                prop_assert_eq!(reduce(mask), mask);
                prop_assert!(engine.index(&layer, x, y).is_ok());
            }
        }
    }
}

#[test]
fn all_raw_masks_reduce_into_table() {
    let table = BitmaskTable::new();
    let hit: std::collections::BTreeSet<u8> = (0..=255u8)
        .map(|raw| table.index(reduce(raw)).expect("reduced mask is mapped"))
        .collect();
    assert_eq!(hit.len(), 47);
}
