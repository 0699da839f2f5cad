use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::{bail, Context};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Interval {
    start: u64,
    // inclusive
    end: u64,
}

/// A MySQL GTID set such as `3E11FA47-71CA-11E1-9E33-C80AA9429562:1-5:7,uuid2:3`.
///
/// Intervals are kept sorted and merged per server uuid, so two sets holding
/// the same transactions always print the same text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GtidSet {
    sets: BTreeMap<String, Vec<Interval>>,
}

impl GtidSet {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut gtid_set = Self::default();
        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let mut tokens = part.split(':');
            let uuid = match tokens.next() {
                Some(uuid) if !uuid.trim().is_empty() => uuid.trim().to_lowercase(),
                _ => bail!("invalid gtid set: [{}], missing server uuid", text),
            };

            let mut has_interval = false;
            for token in tokens {
                let interval = Self::parse_interval(token)
                    .with_context(|| format!("invalid gtid set: [{}]", text))?;
                gtid_set.sets.entry(uuid.clone()).or_default().push(interval);
                has_interval = true;
            }
            if !has_interval {
                bail!("invalid gtid set: [{}], no interval for {}", text, uuid)
            }
        }
        gtid_set.normalize();
        Ok(gtid_set)
    }

    /// Splits a single gtid like `uuid:23` into its server uuid and transaction id.
    pub fn parse_gtid(gtid: &str) -> anyhow::Result<(String, u64)> {
        match gtid.trim().rsplit_once(':') {
            Some((uuid, id)) if !uuid.is_empty() => {
                let id: u64 = id
                    .parse()
                    .with_context(|| format!("invalid gtid: [{}]", gtid))?;
                if id == 0 {
                    bail!("invalid gtid: [{}], transaction id starts from 1", gtid)
                }
                Ok((uuid.to_lowercase(), id))
            }
            _ => bail!("invalid gtid: [{}]", gtid),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn add(&mut self, gtid: &str) -> anyhow::Result<()> {
        let (uuid, id) = Self::parse_gtid(gtid)?;
        self.sets
            .entry(uuid)
            .or_default()
            .push(Interval { start: id, end: id });
        self.normalize();
        Ok(())
    }

    pub fn remove(&mut self, gtid: &str) -> anyhow::Result<()> {
        let (uuid, id) = Self::parse_gtid(gtid)?;
        if let Some(intervals) = self.sets.get_mut(&uuid) {
            let mut remained = Vec::with_capacity(intervals.len() + 1);
            for interval in intervals.iter() {
                if id < interval.start || id > interval.end {
                    remained.push(*interval);
                    continue;
                }
                if interval.start < id {
                    remained.push(Interval {
                        start: interval.start,
                        end: id - 1,
                    });
                }
                if id < interval.end {
                    remained.push(Interval {
                        start: id + 1,
                        end: interval.end,
                    });
                }
            }
            *intervals = remained;
        }
        self.normalize();
        Ok(())
    }

    pub fn contains(&self, gtid: &str) -> anyhow::Result<bool> {
        let (uuid, id) = Self::parse_gtid(gtid)?;
        Ok(self
            .sets
            .get(&uuid)
            .is_some_and(|intervals| intervals.iter().any(|i| i.start <= id && id <= i.end)))
    }

    pub fn contains_set(&self, other: &GtidSet) -> bool {
        other.sets.iter().all(|(uuid, other_intervals)| {
            let Some(intervals) = self.sets.get(uuid) else {
                return false;
            };
            // both sides are merged, so a covered interval lies inside a single one
            other_intervals.iter().all(|o| {
                intervals
                    .iter()
                    .any(|i| i.start <= o.start && o.end <= i.end)
            })
        })
    }

    fn parse_interval(token: &str) -> anyhow::Result<Interval> {
        let token = token.trim();
        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (start.trim().parse::<u64>()?, end.trim().parse::<u64>()?),
            None => {
                let id = token.parse::<u64>()?;
                (id, id)
            }
        };
        if start == 0 || start > end {
            bail!("invalid gtid interval: [{}]", token)
        }
        Ok(Interval { start, end })
    }

    fn normalize(&mut self) {
        for intervals in self.sets.values_mut() {
            intervals.sort_by_key(|i| i.start);
            let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
            for interval in intervals.drain(..) {
                match merged.last_mut() {
                    Some(last) if interval.start <= last.end.saturating_add(1) => {
                        last.end = last.end.max(interval.end);
                    }
                    _ => merged.push(interval),
                }
            }
            *intervals = merged;
        }
        self.sets.retain(|_, intervals| !intervals.is_empty());
    }
}

impl FromStr for GtidSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GtidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (uuid, intervals) in self.sets.iter() {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{}", uuid)?;
            for interval in intervals {
                if interval.start == interval.end {
                    write!(f, ":{}", interval.start)?;
                } else {
                    write!(f, ":{}-{}", interval.start, interval.end)?;
                }
            }
        }
        Ok(())
    }
}
