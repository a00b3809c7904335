use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub case_table_path: String,
    pub indicator_table_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            case_table_path: "data/covid_cases.csv".into(),
            indicator_table_path: "data/worldbank_indicators.csv".into(),
        }
    }
}
