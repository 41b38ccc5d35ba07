use crate::{
    BincodeCodec, Dataset, KeyBounds, LayerCatalog, LayerId, LayerReader, LayerWriter,
    MemoryAttributeStore, MemoryRangeStore, SpaceTimeIndex, SpaceTimeKey, ZSpaceTimeIndex,
};

const HOUR_MS: i64 = 3_600_000;

fn observations(max: u32, hours: i64) -> Dataset<SpaceTimeKey, f32> {
    let mut records = Vec::new();
    for hour in 0..hours {
        for row in 0..=max {
            for col in 0..=max {
                let key = SpaceTimeKey::new(col, row, hour * HOUR_MS);
                records.push((key, (col + row) as f32 + hour as f32 * 0.5));
            }
        }
    }
    Dataset::from_records(records)
}

fn space_time_bounds(max: u32, hours: i64) -> KeyBounds<SpaceTimeKey> {
    KeyBounds::new(
        SpaceTimeKey::new(0, 0, 0),
        SpaceTimeKey::new(max, max, (hours - 1) * HOUR_MS),
    )
    .unwrap()
}

#[tokio::test]
async fn space_time_layer_round_trips() {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpaceTimeKey, f32>::new();
    let id = LayerId::new("temperature", 4);
    let bounds = space_time_bounds(7, 3);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            observations(7, 3),
            SpaceTimeIndex::ZCurve(ZSpaceTimeIndex::new(bounds.clone(), HOUR_MS).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    let full = LayerReader::new(&store, &catalog)
        .read::<_, f32, SpaceTimeIndex, _>(&id, &bounds, &codec)
        .await
        .unwrap();
    assert_eq!(full.len(), 8 * 8 * 3);
}

#[tokio::test]
async fn temporal_slice_returns_one_instant() {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpaceTimeKey, f32>::new();
    let id = LayerId::new("temperature", 4);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            observations(7, 3),
            SpaceTimeIndex::ZCurve(ZSpaceTimeIndex::new(space_time_bounds(7, 3), HOUR_MS).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    // The middle hour only, across the full spatial extent.
    let slice = KeyBounds::new(
        SpaceTimeKey::new(0, 0, HOUR_MS),
        SpaceTimeKey::new(7, 7, HOUR_MS),
    )
    .unwrap();
    let read = LayerReader::new(&store, &catalog)
        .read::<_, f32, SpaceTimeIndex, _>(&id, &slice, &codec)
        .await
        .unwrap();

    assert_eq!(read.len(), 64);
    for (key, _) in read.iter() {
        assert_eq!(key.instant, HOUR_MS);
    }
}

#[tokio::test]
async fn spatial_subregion_over_a_time_span() {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpaceTimeKey, f32>::new();
    let id = LayerId::new("temperature", 4);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            observations(7, 3),
            SpaceTimeIndex::ZCurve(ZSpaceTimeIndex::new(space_time_bounds(7, 3), HOUR_MS).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    // A 2x3 window over the last two hours.
    let query = KeyBounds::new(
        SpaceTimeKey::new(2, 1, HOUR_MS),
        SpaceTimeKey::new(3, 3, 2 * HOUR_MS),
    )
    .unwrap();
    let read = LayerReader::new(&store, &catalog)
        .read::<_, f32, SpaceTimeIndex, _>(&id, &query, &codec)
        .await
        .unwrap();

    assert_eq!(read.len(), 2 * 3 * 2);
    for (key, value) in read.iter() {
        assert!(query.contains(key));
        let hour = key.instant / HOUR_MS;
        assert_eq!(*value, (key.col + key.row) as f32 + hour as f32 * 0.5);
    }
}

#[tokio::test]
async fn instants_between_written_samples_match_nothing() {
    let store = MemoryRangeStore::new();
    let catalog = LayerCatalog::new(MemoryAttributeStore::new());
    let codec = BincodeCodec::<SpaceTimeKey, f32>::new();
    let id = LayerId::new("temperature", 4);

    LayerWriter::new(&store, &catalog)
        .write(
            &id,
            observations(3, 2),
            SpaceTimeIndex::ZCurve(ZSpaceTimeIndex::new(space_time_bounds(3, 2), HOUR_MS).unwrap()),
            &codec,
        )
        .await
        .unwrap();

    // Same temporal bin as hour 0, but no key was written at 30 minutes;
    // exact key filtering strips the over-covered rows.
    let between = KeyBounds::new(
        SpaceTimeKey::new(0, 0, HOUR_MS / 2),
        SpaceTimeKey::new(3, 3, HOUR_MS / 2),
    )
    .unwrap();
    let read = LayerReader::new(&store, &catalog)
        .read::<_, f32, SpaceTimeIndex, _>(&id, &between, &codec)
        .await
        .unwrap();
    assert!(read.is_empty());
}
