use qh_core::{normalize_name, Candidate, CurationSheet, Direction, Observation, QhError, Result};
use std::collections::HashMap;
use std::hash::Hash;

/// Sums counts per key and remembers the order keys were first seen.
#[derive(Debug, Clone)]
struct RankedCounter<K> {
    index: HashMap<K, usize>,
    slots: Vec<(K, u64)>,
}

impl<K: Eq + Hash + Clone> RankedCounter<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// Returns the new total, or `None` (leaving the total untouched) on overflow.
    fn add(&mut self, key: K, count: u64) -> Option<u64> {
        match self.index.get(&key) {
            Some(&i) => {
                let total = self.slots[i].1.checked_add(count)?;
                self.slots[i].1 = total;
                Some(total)
            }
            None => {
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push((key, count));
                Some(count)
            }
        }
    }

    fn get(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|&i| self.slots[i].1)
    }

    /// Descending by count. The sort is stable, so ties keep first-seen order.
    fn into_ranked(self) -> Vec<(K, u64)> {
        let mut slots = self.slots;
        slots.sort_by(|a, b| b.1.cmp(&a.1));
        slots
    }
}

#[derive(Debug, Clone)]
struct DirectionCounts {
    names: RankedCounter<String>,
    pairs: RankedCounter<(String, String)>,
}

impl DirectionCounts {
    fn new() -> Self {
        Self {
            names: RankedCounter::new(),
            pairs: RankedCounter::new(),
        }
    }
}

/// Merges observations into the four frequency-ranked candidate lists.
///
/// Every observation counts toward its `(direction, name)` bucket. Only
/// observations with a non-empty literal value also count toward
/// `(direction, name, value)`, so a name's count is never below any of its
/// pair counts. Counts that would overflow `u64` abort the run.
#[derive(Debug, Clone)]
pub struct HeaderAggregator {
    request: DirectionCounts,
    response: DirectionCounts,
    observed: usize,
}

impl Default for HeaderAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderAggregator {
    pub fn new() -> Self {
        Self {
            request: DirectionCounts::new(),
            response: DirectionCounts::new(),
            observed: 0,
        }
    }

    fn counts_mut(&mut self, direction: Direction) -> &mut DirectionCounts {
        match direction {
            Direction::Request => &mut self.request,
            Direction::Response => &mut self.response,
        }
    }

    fn counts(&self, direction: Direction) -> &DirectionCounts {
        match direction {
            Direction::Request => &self.request,
            Direction::Response => &self.response,
        }
    }

    pub fn observe(&mut self, obs: &Observation) -> Result<()> {
        let index = self.observed;
        let direction = obs.direction;
        let overflow = |key: String| {
            QhError::malformed(
                format!("{direction} aggregation"),
                index,
                format!("count for `{key}` overflows u64"),
            )
        };

        let counts = self.counts_mut(direction);
        counts
            .names
            .add(obs.name.clone(), obs.count)
            .ok_or_else(|| overflow(obs.name.clone()))?;
        if let Some(value) = obs.value.pair_value() {
            counts
                .pairs
                .add((obs.name.clone(), value.to_string()), obs.count)
                .ok_or_else(|| overflow(format!("{}:{}", obs.name, value)))?;
        }
        self.observed += 1;
        Ok(())
    }

    pub fn extend<'a>(
        &mut self,
        observations: impl IntoIterator<Item = &'a Observation>,
    ) -> Result<()> {
        for obs in observations {
            self.observe(obs)?;
        }
        Ok(())
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Aggregated count for a name, anonymized observations included.
    pub fn name_count(&self, direction: Direction, name: &str) -> Option<u64> {
        self.counts(direction).names.get(&normalize_name(name))
    }

    pub fn pair_count(&self, direction: Direction, name: &str, value: &str) -> Option<u64> {
        self.counts(direction)
            .pairs
            .get(&(normalize_name(name), value.to_string()))
    }

    /// Consumes the aggregator and ranks every bucket. Rows carry no status;
    /// curation adds it.
    pub fn finish(self) -> Result<CurationSheet> {
        let pairs = |c: RankedCounter<(String, String)>| -> Vec<Candidate> {
            c.into_ranked()
                .into_iter()
                .map(|((name, value), count)| Candidate::pair(name, value, count))
                .collect()
        };
        let names = |c: RankedCounter<String>| -> Vec<Candidate> {
            c.into_ranked()
                .into_iter()
                .map(|(name, count)| Candidate::name_only(name, count))
                .collect()
        };

        let mut sheet = CurationSheet {
            request_complete: pairs(self.request.pairs),
            request_names: names(self.request.names),
            response_complete: pairs(self.response.pairs),
            response_names: names(self.response.names),
            summary: None,
        };
        sheet.summary = Some(sheet.summarize()?);
        Ok(sheet)
    }
}

/// One-shot aggregation over an already concatenated record stream.
pub fn aggregate(observations: &[Observation]) -> Result<CurationSheet> {
    let mut aggregator = HeaderAggregator::new();
    aggregator.extend(observations)?;
    aggregator.finish()
}
