mod scenario_page;

use std::{fs, path::Path};

use scenario_page::ScenarioPage;
use serde::Deserialize;

#[test]
fn test_with_scenarios() {
    let scenarios_dir = Path::new("tests/scenarios");
    let entries = fs::read_dir(scenarios_dir)
        .expect("Failed to read scenarios directory")
        .collect::<Vec<_>>();

    assert!(!entries.is_empty(), "No scenario fixtures found");

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("yml") {
            let file = fs::File::open(&path).expect("Failed to open scenario file");
            for document in serde_yaml::Deserializer::from_reader(file) {
                let scenario =
                    ScenarioPage::deserialize(document).expect("Failed to deserialize scenario");

                println!("Running scenario `{}` from {}", scenario.name, path.display());
                scenario.run();
            }
        }
    }
}
