use std::sync::Mutex;

/// Running tally of service fetches.
#[derive(Debug)]
pub struct FetchCounters {
    inner: Mutex<Counts>,
}

#[derive(Debug)]
struct Counts {
    fetched: usize,
    errors: usize,
}

impl FetchCounters {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counts {
                fetched: 0,
                errors: 0,
            }),
        }
    }

    pub fn record_fetched(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.fetched += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.errors += 1;
        }
    }

    /// `(fetched, errors)`.
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(counts) = self.inner.lock() {
            (counts.fetched, counts.errors)
        } else {
            (0, 0)
        }
    }
}

impl Default for FetchCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_independently() {
        let counters = FetchCounters::new();
        counters.record_fetched();
        counters.record_fetched();
        counters.record_error();
        assert_eq!(counters.snapshot(), (2, 1));
    }
}
