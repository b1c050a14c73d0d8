//! End-to-end pipeline test against a synthetic input tree.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use formatter::{FormatterConfig, Pipeline};
use test_utils::write_gradient_npy;
use tiles_common::{safe_layer_name, FieldSpec, TimeSlot};

const SURFACE_SHAPE: [u64; 3] = [4, 8, 12];
const UPPER_SHAPE: [u64; 4] = [5, 2, 8, 12];
const ATTENTION_SHAPE: [u64; 5] = [2, 3, 6, 4, 4];

fn slot(day: u32, time: &str) -> TimeSlot {
    TimeSlot::new(NaiveDate::from_ymd_opt(2018, 1, day).unwrap(), time).unwrap()
}

/// Lay down surface/upper inputs and the layer-0 attention tensor for
/// one slot.
fn seed_inputs(input_root: &Path, output_root: &Path, slot: &TimeSlot) {
    let input_dir = input_root.join(slot.date_dir()).join(slot.time_dir());
    fs::create_dir_all(&input_dir).unwrap();
    write_gradient_npy(&input_dir.join("input_surface.npy"), &SURFACE_SHAPE);
    write_gradient_npy(&input_dir.join("input_upper.npy"), &UPPER_SHAPE);

    let output_dir = output_root.join(slot.date_dir()).join(slot.time_dir());
    fs::create_dir_all(&output_dir).unwrap();
    let layer_file = format!("{}.npy", safe_layer_name("/b1/Add_output_0"));
    write_gradient_npy(&output_dir.join(layer_file), &ATTENTION_SHAPE);
}

fn test_config(root: &Path) -> FormatterConfig {
    FormatterConfig {
        input_root: root.join("input_data"),
        output_root: root.join("output_data"),
        store_root: root.join("bin"),
        window_sizes: vec![(4, 6)],
        field_spec: FieldSpec {
            surface_channels: 4,
            upper_channels: 5,
            pressure_levels: 2,
        },
        layers: vec![0],
        jobs: 1,
    }
}

#[test]
fn test_full_unit_produces_tiles_and_inventory() {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path());
    let slot = slot(1, "00:00");
    seed_inputs(&config.input_root, &config.output_root, &slot);

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(std::slice::from_ref(&slot)).unwrap();
    assert!(summary.is_clean());
    assert_eq!(summary.units_processed, 1);

    let store = pipeline.store();
    // Surface: aligned + shifted config, ceil(8/4) * ceil(12/6) tiles.
    for label in ["config_4x6", "config_4x6_shifted"] {
        let dir = store.map_dir(&slot, label);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 4);
        let bytes = fs::read(dir.join("input_surface_0_0.bin")).unwrap();
        assert_eq!(bytes.len(), 4 * 4 * 6 * 4);
    }
    // Upper: one config pair per pressure level.
    for level in 0..2 {
        for suffix in ["", "_shifted"] {
            let dir = store.map_dir(&slot, &format!("config_4x6_upper_{level}{suffix}"));
            assert_eq!(fs::read_dir(&dir).unwrap().count(), 4);
            let bytes = fs::read(dir.join("input_upper_4_6.bin")).unwrap();
            assert_eq!(bytes.len(), 5 * 4 * 6 * 4);
        }
    }
    // Attention: layer 0 is outer, 6 heads over a 2x3 window grid.
    let attention_dir = store.attention_dir(&slot, "_b1_Add_output_0");
    assert_eq!(fs::read_dir(&attention_dir).unwrap().count(), 2 * 3 * 6);

    // Inventory lists the layer and excludes the config subtrees.
    let json = fs::read_to_string(store.inventory_path()).unwrap();
    let inventory: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        inventory["2018-01-01"]["00:00"],
        serde_json::json!(["_b1_Add_output_0"])
    );
}

#[test]
fn test_missing_attention_layer_is_skipped_not_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = test_config(temp.path());
    config.layers = vec![0, 5]; // layer 5 tensor is never written
    let slot = slot(1, "00:00");
    seed_inputs(&config.input_root, &config.output_root, &slot);

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(std::slice::from_ref(&slot)).unwrap();

    assert_eq!(summary.units_failed, 0);
    assert_eq!(summary.layers_skipped, 1);
    assert!(!summary.is_clean());

    // Layer 0 and the map tiles still made it.
    let store = pipeline.store();
    assert!(store.attention_dir(&slot, "_b1_Add_output_0").is_dir());
    assert!(store.map_dir(&slot, "config_4x6").is_dir());
}

#[test]
fn test_missing_surface_fails_unit_only() {
    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path());
    let good = slot(1, "00:00");
    let bad = slot(2, "00:00"); // no inputs seeded for this date
    seed_inputs(&config.input_root, &config.output_root, &good);

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(&[good.clone(), bad.clone()]).unwrap();

    assert_eq!(summary.units_processed, 2);
    assert_eq!(summary.units_failed, 1);
    assert!(pipeline.store().map_dir(&good, "config_4x6").is_dir());

    // The failed unit leaves an empty, inventory-visible slot with no
    // layers, distinguishable from "never processed".
    let json = fs::read_to_string(pipeline.store().inventory_path()).unwrap();
    let inventory: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(inventory["2018-01-02"]["00:00"], serde_json::json!([]));
}

#[test]
fn test_parallel_units_match_sequential_output() {
    let temp = tempfile::tempdir().unwrap();
    let slots = [slot(1, "00:00"), slot(1, "12:00"), slot(2, "00:00")];

    let sequential = test_config(&temp.path().join("seq"));
    let mut parallel = test_config(&temp.path().join("par"));
    parallel.jobs = 3;
    for config in [&sequential, &parallel] {
        for slot in &slots {
            seed_inputs(&config.input_root, &config.output_root, slot);
        }
    }

    let seq_summary = Pipeline::new(sequential.clone()).run(&slots).unwrap();
    let par_summary = Pipeline::new(parallel.clone()).run(&slots).unwrap();
    assert!(seq_summary.is_clean());
    assert!(par_summary.is_clean());

    let seq_json = fs::read_to_string(sequential.store_root.join("available_data.json")).unwrap();
    let par_json = fs::read_to_string(parallel.store_root.join("available_data.json")).unwrap();
    assert_eq!(seq_json, par_json);
}
