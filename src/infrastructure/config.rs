use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::application::scheduler::REFRESH_INTERVAL;
use crate::domain::query::{RefreshQuery, TimeWindow};

pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/${feed}.geojson";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub feed: FeedSettings,
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub url_template: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub time_window: String,
    pub min_magnitude: String,
    pub fetch_on_startup: bool,
}

impl FeedSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn initial_query(&self) -> RefreshQuery {
        RefreshQuery::new(TimeWindow::parse(&self.time_window), self.min_magnitude.as_str())
    }
}

/// Defaults, then `config/quakewatch.*` if present, then `QUAKEWATCH__*` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_app_config("config/quakewatch", environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("QUAKEWATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build_app_config(file: &str, environment: config::Environment) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("feed.url_template", DEFAULT_FEED_URL)?
        .set_default("feed.timeout_secs", 15)?
        .set_default("refresh.interval_secs", REFRESH_INTERVAL.as_secs())?
        .set_default("refresh.time_window", "day")?
        .set_default("refresh.min_magnitude", "2.5")?
        .set_default("refresh.fetch_on_startup", true)?
        .add_source(config::File::with_name(file).required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` placeholders in a template string
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("feed".to_string(), "4.5_week".to_string());

        let result = render_template(DEFAULT_FEED_URL, &vars);

        assert_eq!(
            result,
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/4.5_week.geojson"
        );
    }

    #[test]
    fn test_initial_query_falls_back_to_day() {
        let settings = RefreshSettings {
            interval_secs: 0,
            time_window: "decade".to_string(),
            min_magnitude: "significant".to_string(),
            fetch_on_startup: false,
        };

        assert_eq!(settings.initial_query(), RefreshQuery::new(TimeWindow::Day, "significant"));
        assert_eq!(settings.interval(), Duration::from_secs(1));
    }

    fn variables(pairs: &[(&str, &str)]) -> config::Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let app_config = build_app_config(
            "config/does-not-exist",
            variables(&[
                ("QUAKEWATCH__REFRESH__INTERVAL_SECS", "45"),
                ("QUAKEWATCH__REFRESH__FETCH_ON_STARTUP", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(app_config.refresh.interval_secs, 45);
        assert!(!app_config.refresh.fetch_on_startup);
        assert_eq!(app_config.server.bind, "0.0.0.0:8080");
        assert_eq!(app_config.feed.url_template, DEFAULT_FEED_URL);
        assert_eq!(app_config.feed.timeout_secs, 15);
        assert_eq!(app_config.refresh.time_window, "day");
        assert_eq!(app_config.refresh.min_magnitude, "2.5");
    }

    #[test]
    fn test_file_then_environment_layering() {
        let dir = std::env::temp_dir().join(format!("quakewatch-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("quakewatch.toml");
        std::fs::write(
            &file,
            "[refresh]\ninterval_secs = 30\ntime_window = \"week\"\n\n[feed]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let app_config = build_app_config(
            dir.join("quakewatch").to_str().unwrap(),
            variables(&[("QUAKEWATCH__REFRESH__INTERVAL_SECS", "60")]),
        )
        .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(app_config.refresh.interval_secs, 60);
        assert_eq!(app_config.refresh.time_window, "week");
        assert_eq!(app_config.feed.timeout_secs, 5);
        assert_eq!(app_config.refresh.min_magnitude, "2.5");
    }
}
