use std::fmt;

const MAX_REGION_LEN: usize = 128;

/// Market region typed into the screener filter. Caller input, so it is
/// validated once here and only ever leaves as an escaped literal or a
/// sanitized file name.
#[derive(Debug, Clone)]
pub struct Region(String);

impl Region {
    pub fn parse(raw: &str) -> Result<Region, String> {
        let region = raw.trim();

        if region.is_empty() {
            return Err("Region must not be empty".to_string());
        }
        if region.chars().count() > MAX_REGION_LEN {
            return Err(format!(
                "Region must be at most {} characters long",
                MAX_REGION_LEN
            ));
        }
        if region.chars().any(char::is_control) {
            return Err("Region must not contain control characters".to_string());
        }

        Ok(Region(region.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Locator for the dropdown option whose text is exactly this region.
    pub fn option_xpath(&self) -> String {
        format!("//span[normalize-space(text())={}]", xpath_literal(&self.0))
    }

    /// Download name offered to the browser, e.g. `Technology.csv`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() => c,
                ' ' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();
        let stem = stem.trim_matches('.');

        match stem.is_empty() {
            true => "region.csv".to_string(),
            false => format!("{}.csv", stem),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// XPath 1.0 has no escape sequences, so a value holding both quote kinds
/// has to be stitched together with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .enumerate()
        .flat_map(|(i, part)| {
            let quote = (i > 0).then(|| r#""'""#.to_string());
            let part = (!part.is_empty()).then(|| format!("'{}'", part));
            quote.into_iter().chain(part)
        })
        .collect();

    format!("concat({})", parts.join(", "))
}
