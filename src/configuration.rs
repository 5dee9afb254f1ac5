use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub crawler: CrawlerSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Everything the crawler needs to drive the screener page.
///
/// Timings are kept in milliseconds so env overrides stay plain numbers.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CrawlerSettings {
    pub webdriver_url: String,
    pub screener_url: String,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lookup_attempts: u8,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub lookup_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub find_stock_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub next_page_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_load_delay_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_settle_delay_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub crawl_timeout_secs: u64,
    pub selectors: ScreenerSelectors,
}

/// XPaths of the screener controls. They track a third-party page and
/// break whenever its layout changes, hence configurable.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScreenerSelectors {
    pub region_default: String,
    pub button_add: String,
    pub find_region: String,
    pub find_stock: String,
    pub next_page: String,
}

impl Default for ScreenerSelectors {
    fn default() -> Self {
        ScreenerSelectors {
            region_default: "//*[@id='screener-criteria']/div[2]/div[1]/div[1]/div[1]/div/div[2]/ul/li[1]/button".to_string(),
            button_add: "//*[@id='screener-criteria']/div[2]/div[1]/div[1]/div[1]/div/div[2]/ul/li/button".to_string(),
            find_region: "//*[@id='dropdown-menu']/div/div[1]/div/input".to_string(),
            find_stock: "//*[@id='screener-criteria']/div[2]/div[1]/div[3]/button[1]".to_string(),
            next_page: "//*[@id='scr-res-table']/div[2]/button[3]".to_string(),
        }
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        CrawlerSettings {
            webdriver_url: "http://localhost:9515".to_string(),
            screener_url: "https://finance.yahoo.com/screener/new".to_string(),
            headless: false,
            window_width: 1600,
            window_height: 1000,
            lookup_attempts: 10,
            lookup_timeout_ms: 2_000,
            find_stock_timeout_ms: 3_000,
            next_page_timeout_ms: 4_000,
            page_load_delay_ms: 5_000,
            page_settle_delay_ms: 3_000,
            max_pages: 500,
            crawl_timeout_secs: 15 * 60,
            selectors: ScreenerSelectors::default(),
        }
    }
}

impl CrawlerSettings {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn find_stock_timeout(&self) -> Duration {
        Duration::from_millis(self.find_stock_timeout_ms)
    }

    pub fn next_page_timeout(&self) -> Duration {
        Duration::from_millis(self.next_page_timeout_ms)
    }

    pub fn page_load_delay(&self) -> Duration {
        Duration::from_millis(self.page_load_delay_ms)
    }

    pub fn page_settle_delay(&self) -> Duration {
        Duration::from_millis(self.page_settle_delay_ms)
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// `HIDDENCRAWLER=1` switches the browser to headless mode. Anything else
/// (including a non-numeric value) means visible.
pub fn headless_from_env(value: Option<&str>) -> Option<bool> {
    value.map(|v| v.trim().parse::<i64>().map(|n| n == 1).unwrap_or(false))
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let hidden_crawler = std::env::var("HIDDENCRAWLER").ok();

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("crawler.headless", headless_from_env(hidden_crawler.as_deref()))?
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::{headless_from_env, CrawlerSettings, Environment};

    #[test]
    fn hidden_crawler_toggle() {
        assert_eq!(headless_from_env(Some("1")), Some(true));
        assert_eq!(headless_from_env(Some(" 1 ")), Some(true));
        assert_eq!(headless_from_env(Some("0")), Some(false));
        assert_eq!(headless_from_env(Some("yes")), Some(false));
        assert_eq!(headless_from_env(None), None);
    }

    #[test]
    fn environment_parsing() {
        assert!(matches!(
            Environment::try_from("Production".to_string()),
            Ok(Environment::Production)
        ));
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn crawler_defaults_match_screener_timings() {
        let settings = CrawlerSettings::default();

        assert_eq!(settings.lookup_attempts, 10);
        assert_eq!(settings.lookup_timeout().as_secs(), 2);
        assert_eq!(settings.find_stock_timeout().as_secs(), 3);
        assert_eq!(settings.next_page_timeout().as_secs(), 4);
        assert_eq!(settings.page_load_delay().as_secs(), 5);
        assert!(!settings.headless);
    }
}
