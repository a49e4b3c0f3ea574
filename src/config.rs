use crate::error::{AppError, Result};
use crate::fetcher::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub datasets: DatasetsConfig,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub seasons: SeasonLabels,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetsConfig {
    /// Ride table: feeds headline metrics, trend, seasonal and daily views.
    pub rides: String,
    /// Table carrying temperature for the bucket view. Falls back to `rides`.
    #[serde(default)]
    pub temperature: Option<String>,
}

impl DatasetsConfig {
    pub fn rides_source(&self) -> Result<DataSource> {
        DataSource::parse(&self.rides)
    }

    pub fn temperature_source(&self) -> Result<Option<DataSource>> {
        self.temperature.as_deref().map(DataSource::parse).transpose()
    }
}

/// Header names of the columns the loader reads. Every other column is ignored.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub season: String,
    pub temperature: String,
    pub casual: String,
    pub registered: String,
    pub count: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "dteday".to_string(),
            season: "season".to_string(),
            temperature: "temp".to_string(),
            casual: "casual".to_string(),
            registered: "registered".to_string(),
            count: "cnt".to_string(),
        }
    }
}

impl ColumnNames {
    fn all(&self) -> [(&'static str, &str); 6] {
        [
            ("date", &self.date),
            ("season", &self.season),
            ("temperature", &self.temperature),
            ("casual", &self.casual),
            ("registered", &self.registered),
            ("count", &self.count),
        ]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeasonPolicy {
    /// Unmapped season codes are an error.
    #[default]
    Strict,
    /// Unmapped season codes are shown as their numeric code.
    Lenient,
}

/// Season code to display label lookup.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeasonLabels {
    #[serde(default)]
    pub policy: SeasonPolicy,
    #[serde(default = "default_season_labels")]
    pub labels: BTreeMap<u8, String>,
}

fn default_season_labels() -> BTreeMap<u8, String> {
    [(1, "Spring"), (2, "Summer"), (3, "Fall"), (4, "Winter")]
        .into_iter()
        .map(|(code, label)| (code, label.to_string()))
        .collect()
}

impl Default for SeasonLabels {
    fn default() -> Self {
        Self {
            policy: SeasonPolicy::default(),
            labels: default_season_labels(),
        }
    }
}

impl SeasonLabels {
    pub fn lenient() -> Self {
        Self {
            policy: SeasonPolicy::Lenient,
            ..Self::default()
        }
    }

    pub fn label_for(&self, code: u8) -> Result<String> {
        match self.labels.get(&code) {
            Some(label) => Ok(label.clone()),
            None => match self.policy {
                SeasonPolicy::Strict => Err(AppError::UnknownSeason(code)),
                SeasonPolicy::Lenient => Ok(code.to_string()),
            },
        }
    }
}

/// Presentation palettes. Never interpreted here, only handed to the renderer.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ColorConfig {
    #[serde(default)]
    pub day_type: BTreeMap<String, String>,
    #[serde(default)]
    pub user_type: BTreeMap<String, String>,
    #[serde(default)]
    pub temperature: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(
        default = "default_timeout_seconds",
        deserialize_with = "deserialize_seconds"
    )]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    60
}

/// Custom deserializer that handles a duration as both number and string
///
/// Accepts:
/// - `timeout_seconds: 30` (number)
/// - `timeout_seconds: "30"` (string that parses to number)
/// - `timeout_seconds: ${HTTP_TIMEOUT}` (env var substituted to either)
fn deserialize_seconds<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SecondsValue {
        Number(u64),
        String(String),
    }

    match SecondsValue::deserialize(deserializer)? {
        SecondsValue::Number(n) => Ok(n),
        SecondsValue::String(s) => s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("Invalid number of seconds: '{}'", s))),
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // Substitute environment variables
        let expanded = expand_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Checks for:
    /// - Unexpanded environment variables
    /// - Dataset sources that are empty or not HTTPS
    /// - Empty column names
    /// - A strict season policy without labels
    /// - An inverted initial filter range
    fn validate(&self) -> Result<()> {
        let mut sources = vec![("rides", &self.datasets.rides)];
        if let Some(temperature) = &self.datasets.temperature {
            sources.push(("temperature", temperature));
        }

        for (name, source) in &sources {
            if source.contains("${") {
                return Err(AppError::Config(format!(
                    "Dataset source '{}' contains an unexpanded environment variable",
                    name
                )));
            }
            if source.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Dataset source '{}' cannot be empty",
                    name
                )));
            }
        }

        let rides = self.datasets.rides_source()?;
        let temperature = self.datasets.temperature_source()?;
        for source in std::iter::once(&rides).chain(temperature.as_ref()) {
            if let DataSource::Remote(url) = source {
                if url.scheme() != "https" {
                    return Err(AppError::Config(format!(
                        "Remote dataset source must use HTTPS, got: {}",
                        url.scheme()
                    )));
                }
            }
        }

        for (field, header) in self.columns.all() {
            if header.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "Column name for '{}' cannot be empty",
                    field
                )));
            }
        }

        if self.seasons.policy == SeasonPolicy::Strict && self.seasons.labels.is_empty() {
            return Err(AppError::Config(
                "Strict season policy requires at least one season label".to_string(),
            ));
        }

        if let Some(filter) = &self.filter {
            if filter.start > filter.end {
                return Err(AppError::Config(format!(
                    "Initial filter start {} is after end {}",
                    filter.start, filter.end
                )));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(AppError::Config(
                "HTTP timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| AppError::Config(format!("Invalid substitution pattern: {}", e)))?;

    let mut missing_vars = Vec::new();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(value) => {
                result = result.replace(&cap[0], &value);
            }
            Err(_) => {
                missing_vars.push(var_name.to_string());
            }
        }
    }

    if !missing_vars.is_empty() {
        return Err(AppError::Config(format!(
            "Missing required environment variable{}: {}\n\n\
             To fix this:\n\
             1. Create a .env file in the project root (copy .env.example)\n\
             2. Set the missing variable{}: export {}=<value>\n\
             3. Or set {} in your environment before running",
            if missing_vars.len() > 1 { "s" } else { "" },
            missing_vars.join(", "),
            if missing_vars.len() > 1 { "s" } else { "" },
            missing_vars[0],
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}
