use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use thirtyfour::{
    error::WebDriverResult, prelude::ElementQueryable, By, CapabilitiesHelper,
    ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities, PageLoadStrategy,
    WebDriver, WebElement,
};

use crate::configuration::CrawlerSettings;

use super::ScreenerPage;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A live browser session on the configured WebDriver endpoint.
pub struct Droid {
    pub driver: WebDriver,
}

/// Chrome capabilities for a screener session: page-load strategy `none`,
/// plus the headless flags when `settings.headless` is set.
pub fn capabilities(settings: &CrawlerSettings) -> WebDriverResult<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    // Navigation returns immediately; load_page waits on its own.
    caps.set_page_load_strategy(PageLoadStrategy::None)?;

    if settings.headless {
        caps.set_headless()?;
        caps.set_disable_gpu()?;
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ))?;
    }

    Ok(caps)
}

impl Droid {
    pub async fn new(settings: &CrawlerSettings) -> anyhow::Result<Self> {
        let caps = capabilities(settings)?;

        log::info!(
            "Starting {} browser session on {}",
            if settings.headless { "headless" } else { "visible" },
            settings.webdriver_url
        );

        let driver = WebDriver::new(&settings.webdriver_url, caps)
            .await
            .with_context(|| format!("Failed to start driver at {}", settings.webdriver_url))?;
        driver
            .set_window_rect(0, 0, settings.window_width, settings.window_height)
            .await?;

        Ok(Droid { driver })
    }
}

#[async_trait]
impl ScreenerPage for Droid {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> anyhow::Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find(
        &self,
        xpath: &str,
        timeout: Duration,
    ) -> anyhow::Result<Option<Self::Element>> {
        let element = self
            .driver
            .query(By::XPath(xpath.to_string()))
            .wait(timeout, POLL_INTERVAL)
            .first_opt()
            .await?;
        Ok(element)
    }

    async fn click(&self, element: &Self::Element) -> anyhow::Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Self::Element, text: &str) -> anyhow::Result<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn disabled_attribute(
        &self,
        element: &Self::Element,
    ) -> anyhow::Result<Option<String>> {
        let value = element.attr("disabled").await?;
        Ok(value)
    }

    async fn page_source(&self) -> anyhow::Result<String> {
        let source = self.driver.source().await?;
        Ok(source)
    }

    async fn quit(self) -> anyhow::Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
