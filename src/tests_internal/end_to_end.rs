use tempfile::TempDir;

use crate::{
    BincodeCodec, Dataset, FsAttributeStore, KeyBounds, LayerCatalog, LayerId, LayerReader,
    LayerWriter, MemoryAttributeStore, MemoryRangeStore, RowMajorIndex, SpatialIndex, SpatialKey,
    StoreOptions, ZCurveIndex,
};

type Tile = Vec<u8>;

fn tile(col: u32, row: u32) -> Tile {
    vec![col as u8, row as u8, 0xfe]
}

fn grid(max: u32) -> Dataset<SpatialKey, Tile> {
    let mut records = Vec::new();
    for row in 0..=max {
        for col in 0..=max {
            records.push((SpatialKey::new(col, row), tile(col, row)));
        }
    }
    Dataset::from_records(records)
}

fn layout(max: u32) -> KeyBounds<SpatialKey> {
    KeyBounds::new(SpatialKey::new(0, 0), SpatialKey::new(max, max)).unwrap()
}

async fn round_trip_with(index: SpatialIndex) {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpatialKey, Tile>::new();
    let id = LayerId::new("elevation", 5);

    LayerWriter::new(&store, &catalog)
        .write(&id, grid(15), index, &codec)
        .await
        .unwrap();

    // Full extent comes back complete.
    let full = LayerReader::new(&store, &catalog)
        .read::<_, Tile, SpatialIndex, _>(&id, &layout(15), &codec)
        .await
        .unwrap();
    assert_eq!(full.len(), 16 * 16);
    for (key, value) in full.iter() {
        assert_eq!(value, &tile(key.col, key.row));
    }

    // An unaligned interior region comes back exact.
    let region = KeyBounds::new(SpatialKey::new(3, 5), SpatialKey::new(9, 6)).unwrap();
    let partial = LayerReader::new(&store, &catalog)
        .read::<_, Tile, SpatialIndex, _>(&id, &region, &codec)
        .await
        .unwrap();
    assert_eq!(partial.len(), 7 * 2);
    for (key, _) in partial.iter() {
        assert!(region.contains(key));
    }
}

#[tokio::test]
async fn round_trips_through_row_major() {
    round_trip_with(SpatialIndex::RowMajor(RowMajorIndex::new(layout(15)).unwrap())).await;
}

#[tokio::test]
async fn round_trips_through_z_curve() {
    round_trip_with(SpatialIndex::ZCurve(ZCurveIndex::new(layout(15)).unwrap())).await;
}

#[tokio::test]
async fn rewrite_of_a_layer_id_is_last_writer_wins() {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpatialKey, Tile>::new();
    let id = LayerId::new("elevation", 5);
    let writer = LayerWriter::new(&store, &catalog);

    writer
        .write(
            &id,
            grid(7),
            SpatialIndex::RowMajor(RowMajorIndex::new(layout(7)).unwrap()),
            &codec,
        )
        .await
        .unwrap();
    // Second write is sparser and switches the index strategy entirely;
    // readers must see only the second dataset, with no rows from the
    // first write leaking into the scan.
    let sparse = Dataset::from_records(vec![
        (SpatialKey::new(0, 0), tile(0, 0)),
        (SpatialKey::new(6, 3), tile(6, 3)),
    ]);
    writer
        .write(
            &id,
            sparse,
            SpatialIndex::ZCurve(ZCurveIndex::new(layout(7)).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    let read = LayerReader::new(&store, &catalog)
        .read::<_, Tile, SpatialIndex, _>(&id, &layout(7), &codec)
        .await
        .unwrap();
    assert_eq!(read.len(), 2);
    for (key, value) in read.iter() {
        assert_eq!(value, &tile(key.col, key.row));
    }
}

#[tokio::test]
async fn layers_round_trip_through_a_file_backed_catalog() {
    let dir = TempDir::new().unwrap();
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(FsAttributeStore::new(dir.path()));
    let codec = BincodeCodec::<SpatialKey, Tile>::new();
    let id = LayerId::new("ndvi", 2);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            grid(7),
            SpatialIndex::ZCurve(ZCurveIndex::new(layout(7)).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    // A fresh catalog over the same directory sees the layer.
    let reopened = LayerCatalog::new(FsAttributeStore::new(dir.path()));
    assert_eq!(reopened.layer_ids().await.unwrap(), vec![id.clone()]);
    let read = LayerReader::new(&store, &reopened)
        .read::<_, Tile, SpatialIndex, _>(&id, &layout(7), &codec)
        .await
        .unwrap();
    assert_eq!(read.len(), 64);
}

#[tokio::test]
async fn tuned_options_do_not_change_results() {
    let store = MemoryRangeStore::new();
    let options = StoreOptions::new().fudge(0).cache_capacity(1);
    let catalog = LayerCatalog::with_options(MemoryAttributeStore::new(), &options);
    let codec = BincodeCodec::<SpatialKey, Tile>::new();
    let id = LayerId::new("elevation", 5);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            grid(15),
            SpatialIndex::ZCurve(ZCurveIndex::new(layout(15)).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    let region = KeyBounds::new(SpatialKey::new(2, 2), SpatialKey::new(13, 11)).unwrap();
    let tuned = LayerReader::with_options(&store, &catalog, &options)
        .read::<_, Tile, SpatialIndex, _>(&id, &region, &codec)
        .await
        .unwrap();
    let default = LayerReader::new(&store, &catalog)
        .read::<_, Tile, SpatialIndex, _>(&id, &region, &codec)
        .await
        .unwrap();

    let mut tuned: Vec<_> = tuned.into_records();
    let mut default: Vec<_> = default.into_records();
    tuned.sort();
    default.sort();
    assert_eq!(tuned, default);
    assert_eq!(tuned.len(), 12 * 10);
}
