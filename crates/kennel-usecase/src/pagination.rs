//! Page-number pagination
//!
//! Pages are 1-based. An empty listing still has a single, empty page 1,
//! so `?page=1` never fails.

use crate::error::{PetServiceError, Result};

/// Which page a client asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(u64),
    Last,
}

impl Default for PageSelector {
    fn default() -> Self {
        PageSelector::Number(1)
    }
}

impl PageSelector {
    /// Parse the raw `page` query parameter
    ///
    /// Absent means page 1; `last` selects the final page.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(PageSelector::default()),
            Some("last") => Ok(PageSelector::Last),
            Some(s) => match s.parse::<u64>() {
                Ok(n) if n >= 1 => Ok(PageSelector::Number(n)),
                _ => Err(PetServiceError::InvalidPage(s.to_string())),
            },
        }
    }
}

/// Position of a page within a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: usize,
    pub limit: usize,
}

/// Locate `selector` in a listing of `count` items
pub fn locate(count: usize, page_size: usize, selector: PageSelector) -> Result<PageWindow> {
    let page_size = page_size.max(1);
    let num_pages = (count.div_ceil(page_size)).max(1) as u64;

    let number = match selector {
        PageSelector::Last => num_pages,
        PageSelector::Number(n) if n <= num_pages => n,
        PageSelector::Number(n) => return Err(PetServiceError::InvalidPage(n.to_string())),
    };

    Ok(PageWindow {
        number,
        num_pages,
        offset: (number as usize - 1) * page_size,
        limit: page_size,
    })
}

/// One page of results plus what's needed to link its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total items across all pages
    pub count: usize,
    pub number: u64,
    pub num_pages: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            number: self.number,
            num_pages: self.num_pages,
        }
    }
}
