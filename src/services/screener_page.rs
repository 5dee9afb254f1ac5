use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;

/// The handful of browser operations the screener sequence needs. `Droid`
/// drives a real WebDriver session through it; tests drive a scripted page.
#[async_trait]
pub trait ScreenerPage: Send + Sync {
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> anyhow::Result<()>;

    /// Waits up to `timeout` for an element matching `xpath`. `Ok(None)`
    /// means it never showed up; `Err` is reserved for driver failures.
    async fn find(&self, xpath: &str, timeout: Duration)
        -> anyhow::Result<Option<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> anyhow::Result<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> anyhow::Result<()>;

    async fn disabled_attribute(&self, element: &Self::Element)
        -> anyhow::Result<Option<String>>;

    async fn page_source(&self) -> anyhow::Result<String>;

    async fn quit(self) -> anyhow::Result<()>
    where
        Self: Sized;
}

/// Navigates and then just waits; the screener renders client-side and
/// offers nothing reliable to wait on.
pub async fn load_page<P: ScreenerPage>(
    page: &P,
    url: &str,
    delay: Duration,
) -> anyhow::Result<()> {
    page.goto(url).await?;
    tokio::time::sleep(delay).await;
    Ok(())
}

/// Retry-wait lookup: up to `attempts` tries, each waiting up to `timeout`.
/// Returns on the first hit.
pub async fn locate<P: ScreenerPage>(
    page: &P,
    xpath: &str,
    timeout: Duration,
    attempts: u8,
) -> anyhow::Result<P::Element> {
    for attempt in 1..=attempts {
        match page.find(xpath, timeout).await? {
            Some(element) => return Ok(element),
            None => log::warn!(
                "Element not present yet (attempt {}/{}): {}",
                attempt,
                attempts,
                xpath
            ),
        }
    }

    bail!("Element with XPATH: {} not found", xpath)
}

/// Same as [`locate`], then waits `timeout` once more before clicking so the
/// control has settled.
pub async fn locate_and_click<P: ScreenerPage>(
    page: &P,
    xpath: &str,
    timeout: Duration,
    attempts: u8,
) -> anyhow::Result<P::Element> {
    let element = locate(page, xpath, timeout, attempts).await?;
    tokio::time::sleep(timeout).await;
    page.click(&element).await?;

    Ok(element)
}

pub fn is_truthy_attribute(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}

pub async fn element_is_disabled<P: ScreenerPage>(
    page: &P,
    element: &P::Element,
) -> anyhow::Result<bool> {
    let value = page.disabled_attribute(element).await?;
    Ok(is_truthy_attribute(value.as_deref()))
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::{is_truthy_attribute, locate, locate_and_click, ScreenerPage};

    /// Answers `None` for the first `misses` lookups, then finds the element.
    struct FlakyPage {
        misses: u8,
        finds: Mutex<u8>,
        clicks: Mutex<Vec<String>>,
        broken: bool,
    }

    impl FlakyPage {
        fn new(misses: u8) -> Self {
            FlakyPage {
                misses,
                finds: Mutex::new(0),
                clicks: Mutex::new(vec![]),
                broken: false,
            }
        }
    }

    #[async_trait]
    impl ScreenerPage for FlakyPage {
        type Element = String;

        async fn goto(&self, _url: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn find(
            &self,
            xpath: &str,
            _timeout: Duration,
        ) -> anyhow::Result<Option<Self::Element>> {
            if self.broken {
                return Err(anyhow!("session deleted"));
            }
            let mut finds = self.finds.lock().unwrap();
            *finds += 1;
            match *finds > self.misses {
                true => Ok(Some(xpath.to_string())),
                false => Ok(None),
            }
        }

        async fn click(&self, element: &Self::Element) -> anyhow::Result<()> {
            self.clicks.lock().unwrap().push(element.clone());
            Ok(())
        }

        async fn send_keys(&self, _element: &Self::Element, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn disabled_attribute(
            &self,
            _element: &Self::Element,
        ) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn page_source(&self) -> anyhow::Result<String> {
            Ok(String::new())
        }

        async fn quit(self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn locate_returns_on_first_success() {
        let page = FlakyPage::new(0);

        let element = locate(&page, "//button", Duration::ZERO, 10).await.unwrap();

        assert_eq!(element, "//button");
        assert_eq!(*page.finds.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn locate_retries_until_present() {
        let page = FlakyPage::new(3);

        let element = locate(&page, "//input", Duration::ZERO, 10).await.unwrap();

        assert_eq!(element, "//input");
        assert_eq!(*page.finds.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn locate_gives_up_after_all_attempts() {
        let page = FlakyPage::new(u8::MAX);

        let error = locate(&page, "//missing", Duration::ZERO, 10)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Element with XPATH: //missing not found");
        assert_eq!(*page.finds.lock().unwrap(), 10);
    }

    #[tokio::test]
    async fn locate_propagates_driver_errors() {
        let mut page = FlakyPage::new(0);
        page.broken = true;

        let error = locate(&page, "//button", Duration::ZERO, 10)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "session deleted");
    }

    #[tokio::test]
    async fn locate_and_click_clicks_found_element() {
        let page = FlakyPage::new(1);

        locate_and_click(&page, "//a", Duration::ZERO, 10)
            .await
            .unwrap();

        assert_eq!(*page.clicks.lock().unwrap(), vec!["//a".to_string()]);
    }

    #[test]
    fn element_is_disabled_only_for_truthy_strings() {
        assert!(is_truthy_attribute(Some("true")));
        assert!(is_truthy_attribute(Some("disabled")));
        assert!(!is_truthy_attribute(Some("")));
        assert!(!is_truthy_attribute(None));
    }
}
