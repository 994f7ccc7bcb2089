//! End-to-end tests of the training pipeline over temporary files
use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use treefit::{dataset, persist, run, Config, Error, TEST_FRACTION};

/// Three well separated species, 50 rows each, mirroring the shape of the
/// iris dataset
const SPECIES: [(&str, [f64; 4]); 3] = [
    ("setosa", [5.0, 3.4, 1.5, 0.2]),
    ("versicolor", [5.9, 2.8, 4.3, 1.3]),
    ("virginica", [6.6, 3.0, 5.6, 2.2]),
];

fn write_iris_like_csv(path: &Path) {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut out = String::from("sepal_length,sepal_width,petal_length,petal_width,species\n");

    for (species, center) in SPECIES.iter() {
        for _ in 0..50 {
            let fields = center
                .iter()
                .map(|c| format!("{:.1}", c + rng.gen_range(-0.3..0.3)))
                .collect::<Vec<_>>();
            out.push_str(&format!("{},{}\n", fields.join(","), species));
        }
    }

    fs::write(path, out).unwrap();
}

#[test]
fn end_to_end_run_reports_accuracy_and_saves_model() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    let model = dir.path().join("model.bin");
    write_iris_like_csv(&data);

    let config = Config {
        data: data.clone(),
        model: model.clone(),
        depth: 3,
    };

    let accuracy = run(&config).unwrap();
    assert!(
        (0.85..=1.0).contains(&(accuracy as f64)),
        "unexpected accuracy {}",
        accuracy
    );

    assert!(model.metadata().unwrap().len() > 0);

    let saved: persist::ModelFile<f64, String> = persist::load(&model).unwrap();
    assert_eq!(saved.tree.classes().len(), 3);
    assert_eq!(saved.params.max_depth(), Some(3));
}

#[test]
fn accuracy_renders_to_exactly_four_decimal_places() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    write_iris_like_csv(&data);

    let accuracy = run(&Config {
        data,
        model: dir.path().join("model.bin"),
        depth: 3,
    })
    .unwrap();

    // the status line prints the accuracy with `{:.4}`
    let rendered = format!("{:.4}", accuracy);
    let (int, frac) = rendered.split_once('.').unwrap();
    assert!(int == "0" || int == "1", "accuracy out of range: {}", rendered);
    assert_eq!(frac.len(), 4);
    assert!(frac.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn reruns_produce_bit_identical_model_files() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    write_iris_like_csv(&data);

    let model_a = dir.path().join("model_a.bin");
    let model_b = dir.path().join("model_b.bin");

    let accuracy_a = run(&Config {
        data: data.clone(),
        model: model_a.clone(),
        depth: 3,
    })
    .unwrap();
    let accuracy_b = run(&Config {
        data,
        model: model_b.clone(),
        depth: 3,
    })
    .unwrap();

    assert_eq!(accuracy_a, accuracy_b);
    assert_eq!(fs::read(model_a).unwrap(), fs::read(model_b).unwrap());
}

#[test]
fn split_sizes_match_the_requested_fraction() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    write_iris_like_csv(&data);

    let dataset = dataset::load_csv(&data).unwrap();
    assert_eq!(dataset.nsamples(), 150);

    let (train, test) = dataset.split_stratified(TEST_FRACTION, 42).unwrap();
    assert_eq!(train.nsamples(), 90);
    assert_eq!(test.nsamples(), 60);
}

#[test]
fn a_deeper_tree_never_fits_the_easy_data_worse() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    write_iris_like_csv(&data);

    let shallow = run(&Config {
        data: data.clone(),
        model: dir.path().join("shallow.bin"),
        depth: 1,
    })
    .unwrap();
    let deep = run(&Config {
        data,
        model: dir.path().join("deep.bin"),
        depth: 3,
    })
    .unwrap();

    // a single split can only carve out one species
    assert!(shallow >= 0.5);
    assert!(deep >= shallow);
}

#[test]
fn missing_data_path_fails_without_creating_a_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.bin");

    let res = run(&Config {
        data: dir.path().join("no-such-file.csv"),
        model: model.clone(),
        depth: 3,
    });

    assert!(matches!(res, Err(Error::Io(_))));
    assert!(!model.exists());
}

#[test]
fn unwritable_model_path_fails_after_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("iris.csv");
    write_iris_like_csv(&data);

    // a directory cannot be overwritten with a model file
    let res = run(&Config {
        data,
        model: dir.path().to_path_buf(),
        depth: 3,
    });

    assert!(matches!(res, Err(Error::Io(_))));
}
