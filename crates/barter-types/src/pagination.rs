use serde::Serialize;

/// Listing pages are a fixed size.
pub const PAGE_SIZE: u32 = 6;

/// Which slice of a result set to fetch, already clamped to what exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub total_count: u64,
    pub page_size: u32,
}

impl PageWindow {
    /// Resolve a raw `page` query value against a result count.
    ///
    /// Missing or non-numeric values land on page 1; numbers outside
    /// `1..=num_pages` land on the last page. An empty result set still has
    /// one (empty) page.
    pub fn resolve(requested: Option<&str>, total_count: u64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let num_pages = total_count.div_ceil(u64::from(page_size)).max(1);
        let num_pages = u32::try_from(num_pages).unwrap_or(u32::MAX);

        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && n <= i64::from(num_pages) => n as u32,
            Some(Ok(_)) => num_pages,
        };

        Self { number, num_pages, total_count, page_size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total_count: self.total_count,
            page_size: self.page_size,
            has_next: self.number < self.num_pages,
            has_previous: self.number > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total_count: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}
