use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;
use tempfile::tempdir;

use tcstore::error::{Result, TcError};
use tcstore::feature::{Coerced, Feature};
use tcstore::index::{FEATURE_NAMES_FILE, FeatureIndex};
use tcstore::instance::Instance;
use tcstore::store::{FeatureStore, StoreKind, new_store, read_instances, write_instances};
use tcstore::writer::{DataFormat, SparseDataWriter, WriterConfig, encode, encode_with_index};

fn instance(features: &[(&str, f64)], outcome: &str) -> Result<Instance> {
    let features = features
        .iter()
        .map(|(name, value)| Feature::new(*name, *value))
        .collect::<Result<Vec<_>>>()?;
    Instance::new(features, [outcome])
}

fn training_store(kind: StoreKind) -> Result<Box<dyn FeatureStore>> {
    let mut store = new_store(kind);
    store.add_instance(instance(&[("a", 1.0), ("b", 0.0)], "x")?)?;
    store.add_instance(instance(&[("a", 0.0), ("b", 1.0)], "y")?)?;
    store.add_instance(instance(&[("a", 1.0), ("b", 1.0)], "x")?)?;
    store.close();
    Ok(store)
}

#[test]
fn sparse_encoding_matches_for_both_store_kinds() -> Result<()> {
    for kind in [StoreKind::Sparse, StoreKind::Dense] {
        let dir = tempdir()?;
        let store = training_store(kind)?;

        let summary = encode(dir.path(), store.as_ref(), DataFormat::Sparse, &WriterConfig::default())?;

        assert_eq!(summary.instances, 3);
        assert_eq!(summary.features, 2);
        assert_eq!(summary.outcomes, 2);
        assert_eq!(
            fs::read_to_string(&summary.path)?,
            "x\t0:1\ny\t1:1\nx\t0:1\t1:1\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join(FEATURE_NAMES_FILE))?,
            "a\nb\n"
        );
    }
    Ok(())
}

fn mixed_instance() -> Result<Instance> {
    Instance::new(
        [
            Feature::new("ratio", 0.25)?,
            Feature::new("tiny", 1e-9)?,
            Feature::new("capitalized", true)?,
            Feature::with_default_flag("ngram_the", 0.0, true)?,
            Feature::with_default_flag("pos", "", true)?,
            Feature::new("count", 3.0)?,
        ],
        ["x"],
    )
}

#[test]
fn default_flagged_features_encode_identically_for_both_store_kinds() -> Result<()> {
    let mut outputs = Vec::new();
    for kind in [StoreKind::Sparse, StoreKind::Dense] {
        let dir = tempdir()?;
        let mut store = new_store(kind);
        store.add_instance(mixed_instance()?)?;
        store.close();

        let summary = encode(dir.path(), store.as_ref(), DataFormat::Sparse, &WriterConfig::default())?;
        outputs.push(fs::read(&summary.path)?);
    }
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn sparse_lines_decode_back_to_the_non_default_features() -> Result<()> {
    for kind in [StoreKind::Sparse, StoreKind::Dense] {
        let dir = tempdir()?;
        let mut store = new_store(kind);
        store.add_instance(mixed_instance()?)?;
        store.add_instance(instance(&[("ratio", 0.5), ("other", -2.75)], "y")?)?;
        store.close();

        let summary = encode(dir.path(), store.as_ref(), DataFormat::Sparse, &WriterConfig::default())?;
        let index = FeatureIndex::read_from(dir.path().join(FEATURE_NAMES_FILE))?;
        let content = fs::read_to_string(&summary.path)?;

        for (line, instance) in content.lines().zip(store.instances()) {
            let mut fields = line.split('\t');
            assert_eq!(fields.next(), instance.outcome());

            let mut decoded = Vec::new();
            for field in fields {
                let (offset, value) = field
                    .split_once(':')
                    .ok_or_else(|| TcError::other(format!("malformed entry {field:?}")))?;
                let offset: usize = offset.parse().map_err(|_| TcError::other("bad offset"))?;
                let value: f64 = value.parse().map_err(|_| TcError::other("bad value"))?;
                let name = index
                    .name(offset)
                    .ok_or_else(|| TcError::other(format!("unknown offset {offset}")))?;
                decoded.push((name.to_string(), value));
            }
            decoded.sort_by(|a, b| a.0.cmp(&b.0));

            let mut expected = Vec::new();
            for feature in instance.features().iter().filter(|f| !f.is_default()) {
                if let Coerced::Value(value) = feature.value().coerce() {
                    expected.push((feature.name().to_string(), value));
                }
            }
            expected.sort_by(|a, b| a.0.cmp(&b.0));

            assert_eq!(decoded, expected);
        }
        assert_eq!(content.lines().count(), store.size());
    }
    Ok(())
}

#[test]
fn store_without_outcomes_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let mut store = new_store(StoreKind::Sparse);
    store.add_instance(Instance::new([Feature::new("a", 1.0)?], Vec::<String>::new())?)?;
    store.close();

    let output = dir.path().join("out");
    let result = encode(&output, store.as_ref(), DataFormat::Sparse, &WriterConfig::default());

    assert!(matches!(result, Err(TcError::EmptyOutcomeSet)));
    assert!(!output.join(DataFormat::Sparse.file_name()).exists());
    assert!(!output.join(FEATURE_NAMES_FILE).exists());
    Ok(())
}

#[test]
fn streaming_output_equals_two_pass_output() -> Result<()> {
    let store = training_store(StoreKind::Sparse)?;
    let config = WriterConfig::default();

    let two_pass = tempdir()?;
    let summary = encode(two_pass.path(), store.as_ref(), DataFormat::Sparse, &config)?;

    let one_pass = tempdir()?;
    let mut index = FeatureIndex::new();
    let streamed = SparseDataWriter::new().write_streaming(one_pass.path(), store.as_ref(), &mut index, &config)?;

    assert_eq!(fs::read_to_string(&summary.path)?, fs::read_to_string(&streamed.path)?);
    assert_eq!(index, FeatureIndex::build(store.as_ref()));
    Ok(())
}

#[test]
fn test_data_is_projected_onto_training_features() -> Result<()> {
    let train_dir = tempdir()?;
    let train = training_store(StoreKind::Sparse)?;
    encode(train_dir.path(), train.as_ref(), DataFormat::Sparse, &WriterConfig::default())?;

    let mut test = new_store(StoreKind::Sparse);
    test.add_instance(instance(&[("b", 2.0), ("c", 5.0)], "y")?)?;
    test.add_instance(instance(&[("c", 1.0), ("a", 0.5)], "x")?)?;
    test.close();

    let index = FeatureIndex::read_from(train_dir.path().join(FEATURE_NAMES_FILE))?;
    assert_eq!(index.count_unknown(test.as_ref()), 2);

    let test_dir = tempdir()?;
    let summary = encode_with_index(
        test_dir.path(),
        test.as_ref(),
        &index,
        DataFormat::Sparse,
        &WriterConfig::default(),
    )?;

    assert_eq!(summary.features, 2);
    assert_eq!(fs::read_to_string(&summary.path)?, "y\t1:2\nx\t0:0.5\n");
    Ok(())
}

#[test]
fn dense_output_is_gzip_compressed() -> Result<()> {
    let dir = tempdir()?;
    let store = training_store(StoreKind::Dense)?;

    let summary = encode(dir.path(), store.as_ref(), DataFormat::Dense, &WriterConfig::default())?;
    assert!(summary.path.ends_with("training-data.txt.gz"));

    let mut content = String::new();
    GzDecoder::new(fs::File::open(&summary.path)?).read_to_string(&mut content)?;
    assert_eq!(
        content,
        "a b Outcome\n1.0 0.0 x\n0.0 1.0 y\n1.0 1.0 x\n"
    );
    Ok(())
}

#[test]
fn instance_files_survive_a_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("instances.jsonl");

    let mut store = new_store(StoreKind::Sparse);
    let mut token = Instance::new(
        [
            Feature::new("pos", "noun")?,
            Feature::new("capitalized", true)?,
            Feature::with_default_flag("ngram_the", 0.0, true)?,
        ],
        ["NN"],
    )?;
    token.set_weight(2.5);
    token.set_sequence(3, 1);
    store.add_instance(token)?;
    write_instances(&path, store.as_ref())?;

    let mut restored = new_store(StoreKind::Dense);
    assert_eq!(read_instances(&path, restored.as_mut())?, 1);

    let instance = restored.instance(0).ok_or_else(|| TcError::other("missing instance"))?;
    assert_eq!(instance.outcome(), Some("NN"));
    assert_eq!(instance.weight(), 2.5);
    assert_eq!((instance.sequence_id(), instance.sequence_position()), (3, 1));
    assert_eq!(instance.features().len(), 3);
    assert!(instance.feature("ngram_the").is_some_and(Feature::is_default));
    assert_eq!(restored.feature_names(), vec!["capitalized", "ngram_the", "pos"]);
    Ok(())
}

#[test]
fn duplicate_feature_names_are_rejected_on_load() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.jsonl");
    fs::write(
        &path,
        "{\"features\":[{\"name\":\"a\",\"value\":1.0},{\"name\":\"a\",\"value\":2.0}],\"outcomes\":[\"x\"]}\n",
    )?;

    let mut store = new_store(StoreKind::Sparse);
    assert!(read_instances(&path, store.as_mut()).is_err());
    assert!(store.is_empty());
    Ok(())
}
