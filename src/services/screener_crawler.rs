use std::time::Duration;

use anyhow::Context;

use crate::{
    configuration::CrawlerSettings,
    domain::{parse_data, Region, StageError, StockRow},
};

use super::{
    element_is_disabled, generate_csv, load_page, locate, locate_and_click, CsvFile, Droid,
    ScreenerPage,
};

const STAGE: &str = "get_data_by_region";

/// Walks the screener UI for one region: pick the region filter, run the
/// search and collect every result page.
pub struct ScreenerCrawler<'a, P: ScreenerPage> {
    page: &'a P,
    settings: &'a CrawlerSettings,
}

impl<'a, P: ScreenerPage> ScreenerCrawler<'a, P> {
    pub fn new(page: &'a P, settings: &'a CrawlerSettings) -> Self {
        ScreenerCrawler { page, settings }
    }

    pub async fn collect_rows(&self, region: &Region) -> anyhow::Result<Vec<StockRow>> {
        load_page(
            self.page,
            &self.settings.screener_url,
            self.settings.page_load_delay(),
        )
        .await
        .with_context(|| format!("Failed to load {}", self.settings.screener_url))?;

        self.search_region(region).await?;
        self.paginate().await
    }

    async fn click(&self, xpath: &str, timeout: Duration) -> anyhow::Result<P::Element> {
        locate_and_click(self.page, xpath, timeout, self.settings.lookup_attempts).await
    }

    async fn search_region(&self, region: &Region) -> anyhow::Result<()> {
        let selectors = &self.settings.selectors;
        let timeout = self.settings.lookup_timeout();

        self.click(&selectors.region_default, timeout).await?;
        self.click(&selectors.button_add, timeout).await?;

        let find_region_input = locate(
            self.page,
            &selectors.find_region,
            timeout,
            self.settings.lookup_attempts,
        )
        .await?;
        self.page
            .send_keys(&find_region_input, region.as_str())
            .await?;

        self.click(&region.option_xpath(), timeout).await?;
        self.click(&selectors.find_stock, self.settings.find_stock_timeout())
            .await?;

        Ok(())
    }

    async fn paginate(&self) -> anyhow::Result<Vec<StockRow>> {
        let mut data = vec![];
        let mut page_number: u32 = 1;

        loop {
            tokio::time::sleep(self.settings.page_settle_delay()).await;

            let html = self.page.page_source().await?;
            let rows = parse_data(&html)
                .with_context(|| format!("Failed to parse results page {}", page_number))?;
            log::info!("Results page {}: {} rows", page_number, rows.len());
            data.extend(rows);

            let next_button = locate(
                self.page,
                &self.settings.selectors.next_page,
                self.settings.next_page_timeout(),
                self.settings.lookup_attempts,
            )
            .await?;
            if element_is_disabled(self.page, &next_button).await? {
                break;
            }
            if page_number >= self.settings.max_pages {
                log::warn!(
                    "Stopping after {} result pages, next page is still enabled",
                    page_number
                );
                break;
            }

            self.page.click(&next_button).await?;
            page_number += 1;
        }

        Ok(data)
    }
}

/// Scrapes every screener row for `region` into a temporary CSV.
///
/// Never panics on a failed crawl: every failure comes back as a
/// [`StageError`] tagged `get_data_by_region`.
pub async fn get_data_by_region(
    region: &str,
    settings: &CrawlerSettings,
) -> Result<CsvFile, StageError> {
    let region = Region::parse(region).map_err(|e| StageError::new(STAGE, e))?;

    let startup = tokio::time::timeout(settings.crawl_timeout(), Droid::new(settings)).await;
    let droid = match startup {
        Ok(droid) => droid.map_err(|e| StageError::from_anyhow(STAGE, e))?,
        Err(_) => {
            log::error!("Browser session at {} did not start", settings.webdriver_url);
            return Err(StageError::new(
                STAGE,
                format!(
                    "Browser session did not start within {} seconds",
                    settings.crawl_timeout_secs
                ),
            ));
        }
    };

    get_data_by_region_on(droid, &region, settings).await
}

/// Runs the crawl on an already started page and always quits it afterwards.
pub async fn get_data_by_region_on<P: ScreenerPage>(
    page: P,
    region: &Region,
    settings: &CrawlerSettings,
) -> Result<CsvFile, StageError> {
    log::info!("Crawling screener for region: {}", region);

    let crawl = {
        let crawler = ScreenerCrawler::new(&page, settings);
        tokio::time::timeout(settings.crawl_timeout(), crawler.collect_rows(region)).await
    };

    if let Err(e) = page.quit().await {
        log::error!("Failed to quit browser session: {:?}", e);
    }

    let rows = match crawl {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            log::error!("Crawl for region {} failed: {:#}", region, e);
            return Err(StageError::from_anyhow(STAGE, e));
        }
        Err(_) => {
            log::error!("Crawl for region {} timed out", region);
            return Err(StageError::new(
                STAGE,
                format!(
                    "Crawl did not finish within {} seconds",
                    settings.crawl_timeout_secs
                ),
            ));
        }
    };

    log::info!("Collected {} rows for region {}", rows.len(), region);

    generate_csv(&rows).map_err(|e| StageError::new(STAGE, e))
}
