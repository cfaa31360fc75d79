//! Staged needs matching
//!
//! A run splits a disaster's needs into batches by position. Every open
//! need in the current batch climbs a 0-100 progress counter in random
//! steps; when it tops out, the need's matched quantity closes part of its
//! remaining gap according to its priority. The numbers are presentation
//! only: no supply, capacity or competing disasters are considered.

use super::scheduler::TimerScope;
use super::OpsEvent;
use crate::config::MatchingConfig;
use crate::data::{Disaster, Id, Need, Priority};
use crate::{OpsError, OpsResult};
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

/// Narrative shown while a run progresses
pub const STAGES: [&str; 5] = [
    "Analyzing disaster needs",
    "Scanning partner inventories",
    "Matching priority items to stock",
    "Optimizing delivery routes",
    "Finalizing allocations",
];

pub const COMPLETE_MESSAGE: &str = "Matching complete: allocations ready for dispatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Matching,
    /// Between batches
    Pausing,
    /// All batches done; waiting for the run to be cleared
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemProgress {
    pub need: usize,
    pub percent: f64,
    pub done: bool,
}

#[derive(Debug)]
pub struct MatchingRun {
    pub disaster: Id,
    batches: Vec<Range<usize>>,
    batch: usize,
    items: Vec<ItemProgress>,
    progress: f64,
    stage: usize,
    phase: RunPhase,
    scope: TimerScope<OpsEvent>,
}

/// Split `len` positions into `batches` consecutive ranges of at most
/// `ceil(len / batches)`; trailing ranges may be empty.
pub fn partition(len: usize, batches: usize) -> Vec<Range<usize>> {
    let batches = batches.max(1);
    let size = len.div_ceil(batches).max(1);
    (0..batches)
        .map(|b| {
            let start = (b * size).min(len);
            let end = ((b + 1) * size).min(len);
            start..end
        })
        .collect()
}

/// Quantity a need gains when its progress counter completes
pub fn completion_bump<R: Rng>(need: &Need, rng: &mut R) -> u32 {
    let factor = need.priority.base_efficiency() + rng.gen_range(0.0..0.2);
    (need.gap() as f64 * factor).ceil() as u32
}

impl MatchingRun {
    /// Begin a run over `disaster`, arming its first batch in `scope`
    pub fn start<R: Rng>(
        disaster: &Disaster,
        config: &MatchingConfig,
        scope: TimerScope<OpsEvent>,
        rng: &mut R,
    ) -> OpsResult<Self> {
        let rate = disaster.match_rate();
        if rate >= config.ceiling_percent {
            return Err(OpsError::MatchingRefused(format!(
                "{} is already {:.0}% matched",
                disaster.name, rate
            )));
        }

        let mut run = Self {
            disaster: disaster.id.clone(),
            batches: partition(disaster.needs.len(), config.batches),
            batch: 0,
            items: Vec::new(),
            progress: 0.0,
            stage: 0,
            phase: RunPhase::Matching,
            scope,
        };
        run.begin_batch(disaster, config, rng);
        Ok(run)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn items(&self) -> &[ItemProgress] {
        &self.items
    }

    pub fn stage_label(&self) -> &'static str {
        match self.phase {
            RunPhase::Complete => COMPLETE_MESSAGE,
            _ => STAGES[self.stage],
        }
    }

    fn begin_batch<R: Rng>(&mut self, disaster: &Disaster, config: &MatchingConfig, rng: &mut R) {
        self.phase = RunPhase::Matching;
        let range = self.batches[self.batch].clone();
        self.items = range
            .filter(|&i| !disaster.needs[i].is_fully_matched())
            .map(|need| ItemProgress {
                need,
                percent: 0.0,
                done: false,
            })
            .collect();

        if self.items.is_empty() {
            self.finish_batch(config);
            return;
        }
        for need in self.items.iter().map(|i| i.need).collect::<Vec<_>>() {
            self.arm_step(need, config, rng);
        }
    }

    fn arm_step<R: Rng>(&self, need: usize, config: &MatchingConfig, rng: &mut R) {
        let delay = rng.gen_range(config.step_interval_min_ms..config.step_interval_max_ms);
        self.scope
            .after(Duration::from_millis(delay), OpsEvent::MatchStep { need });
    }

    /// Advance one item's counter. Returns the quantity applied to the
    /// need if this step completed it.
    pub fn on_step<R: Rng>(
        &mut self,
        need: usize,
        disaster: &mut Disaster,
        config: &MatchingConfig,
        rng: &mut R,
    ) -> Option<u32> {
        let step = rng.gen_range(config.step_min..config.step_max);
        let item = self.items.iter_mut().find(|i| i.need == need && !i.done)?;
        item.percent = (item.percent + step).min(100.0);

        if item.percent < 100.0 {
            self.arm_step(need, config, rng);
            return None;
        }

        item.done = true;
        let target = disaster.needs.get_mut(need)?;
        let bump = completion_bump(target, rng);
        let applied = target.add_matched(bump);

        if self.items.iter().all(|i| i.done) {
            self.finish_batch(config);
        }
        Some(applied)
    }

    fn finish_batch(&mut self, config: &MatchingConfig) {
        let total = self.batches.len();
        self.progress = (self.batch + 1) as f64 / total as f64 * 100.0;
        self.stage = (self.stage + 1).min(STAGES.len() - 1);

        if self.batch + 1 < total {
            self.phase = RunPhase::Pausing;
            self.scope.after(config.batch_pause(), OpsEvent::MatchNextBatch);
        } else {
            self.phase = RunPhase::Complete;
            self.scope.after(config.finish_delay(), OpsEvent::MatchFinish);
        }
    }

    /// Leave the inter-batch pause
    pub fn on_next_batch<R: Rng>(&mut self, disaster: &Disaster, config: &MatchingConfig, rng: &mut R) {
        if self.phase != RunPhase::Pausing {
            return;
        }
        self.batch += 1;
        self.begin_batch(disaster, config, rng);
    }
}

/// Background nudge: maybe push one open need a little closer.
///
/// Returns the need index and the quantity applied. Fully matched needs
/// are never picked.
pub fn nudge<R: Rng>(disaster: &mut Disaster, config: &MatchingConfig, rng: &mut R) -> Option<(usize, u32)> {
    if !rng.gen_bool(config.nudge_chance) {
        return None;
    }

    let open: Vec<usize> = disaster.unmet_needs().map(|(i, _)| i).collect();
    let high: Vec<usize> = open
        .iter()
        .copied()
        .filter(|&i| disaster.needs[i].priority == Priority::High)
        .collect();

    let pool = if !high.is_empty() && rng.gen_bool(config.high_priority_bias) {
        &high
    } else {
        &open
    };
    let &idx = pool.choose(rng)?;

    let need = &mut disaster.needs[idx];
    let max_step = (need.requested / 20).max(1);
    let amount = rng.gen_range(1..=max_step);
    Some((idx, need.add_matched(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DisasterType, Location, Severity};
    use crate::ops::scheduler::Scheduler;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn disaster(needs: Vec<Need>) -> Disaster {
        Disaster {
            id: Id::from("DIS-T"),
            name: "Test quake".to_string(),
            disaster_type: DisasterType::Earthquake,
            location: Location::new(27.7, 85.3, "Kathmandu"),
            severity: Severity::Critical,
            affected_population: 10_000,
            timestamp: Utc::now(),
            needs,
        }
    }

    fn drive(
        sched: &Scheduler<OpsEvent>,
        run: &mut Option<MatchingRun>,
        d: &mut Disaster,
        config: &MatchingConfig,
        rng: &mut StdRng,
    ) {
        let deadline = Duration::from_secs(120);
        while let Some(event) = sched.pop_due(deadline) {
            let Some(r) = run.as_mut() else { break };
            match event {
                OpsEvent::MatchStep { need } => {
                    r.on_step(need, d, config, rng);
                }
                OpsEvent::MatchNextBatch => r.on_next_batch(d, config, rng),
                OpsEvent::MatchFinish => *run = None,
                _ => {}
            }
            for n in &d.needs {
                assert!(n.matched() <= n.requested);
            }
        }
    }

    #[test]
    fn partition_by_position() {
        assert_eq!(partition(7, 3), vec![0..3, 3..6, 6..7]);
        assert_eq!(partition(1, 3), vec![0..1, 1..1, 1..1]);
        assert_eq!(partition(0, 3), vec![0..0, 0..0, 0..0]);
        assert_eq!(partition(6, 3), vec![0..2, 2..4, 4..6]);
    }

    #[test]
    fn completion_bump_respects_priority_band() {
        let mut rng = StdRng::seed_from_u64(3);
        let need = Need::new("Water", "Water", 100, Priority::High, "x");
        for _ in 0..100 {
            let b = completion_bump(&need, &mut rng);
            assert!((70..=90).contains(&b), "bump {} outside band", b);
        }
    }

    #[test]
    fn refuses_above_ceiling() {
        let sched = Scheduler::new();
        let d = disaster(vec![
            Need::new("Water", "Water", 100, Priority::High, "x").with_matched(96),
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = MatchingRun::start(&d, &MatchingConfig::default(), sched.scope(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, OpsError::MatchingRefused(_)));
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn run_walks_every_batch_then_clears() {
        let sched = Scheduler::new();
        let config = MatchingConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut d = disaster(vec![
            Need::new("Water", "Water", 1000, Priority::High, "x"),
            Need::new("Food", "Rice", 500, Priority::Medium, "x"),
            Need::new("Shelter", "Tents", 80, Priority::Low, "x"),
            Need::new("Medical", "Kits", 40, Priority::High, "x").with_matched(40),
        ]);
        let before: Vec<u32> = d.needs.iter().map(|n| n.matched()).collect();

        let mut run = Some(MatchingRun::start(&d, &config, sched.scope(), &mut rng).unwrap());
        assert_eq!(run.as_ref().map(|r| r.stage_label()), Some(STAGES[0]));

        drive(&sched, &mut run, &mut d, &config, &mut rng);

        assert!(run.is_none());
        assert_eq!(sched.pending(), 0);
        for (n, b) in d.needs.iter().zip(before) {
            if b < n.requested {
                assert!(n.matched() > b);
            }
        }
    }

    #[test]
    fn progress_and_stage_advance_per_batch() {
        let sched = Scheduler::new();
        let config = MatchingConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut d = disaster(vec![
            Need::new("Water", "Water", 10, Priority::High, "x"),
            Need::new("Food", "Rice", 10, Priority::High, "x"),
            Need::new("Food", "Beans", 10, Priority::High, "x"),
        ]);
        let mut run = MatchingRun::start(&d, &config, sched.scope(), &mut rng).unwrap();

        let mut seen = Vec::new();
        while let Some(event) = sched.pop_due(Duration::from_secs(60)) {
            match event {
                OpsEvent::MatchStep { need } => {
                    run.on_step(need, &mut d, &config, &mut rng);
                }
                OpsEvent::MatchNextBatch => run.on_next_batch(&d, &config, &mut rng),
                OpsEvent::MatchFinish => break,
                _ => {}
            }
            if run.phase() != RunPhase::Matching {
                seen.push((run.progress().round() as u32, run.stage_label()));
            }
        }
        seen.dedup();
        assert_eq!(
            seen,
            vec![(33, STAGES[1]), (67, STAGES[2]), (100, COMPLETE_MESSAGE)]
        );
    }

    #[test]
    fn dropping_run_cancels_pending_steps() {
        let sched = Scheduler::new();
        let mut rng = StdRng::seed_from_u64(2);
        let d = disaster(vec![Need::new("Water", "Water", 100, Priority::High, "x")]);
        let run = MatchingRun::start(&d, &MatchingConfig::default(), sched.scope(), &mut rng).unwrap();
        assert!(sched.pending() > 0);
        drop(run);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn nudge_never_touches_full_needs() {
        let config = MatchingConfig {
            nudge_chance: 1.0,
            ..MatchingConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let mut d = disaster(vec![
            Need::new("Water", "Water", 50, Priority::High, "x").with_matched(50),
            Need::new("Food", "Rice", 400, Priority::Low, "x"),
        ]);
        for _ in 0..200 {
            match nudge(&mut d, &config, &mut rng) {
                Some((idx, applied)) => {
                    assert_eq!(idx, 1);
                    assert!(applied >= 1);
                }
                None => break,
            }
        }
        assert!(d.needs[1].matched() > 0);
        assert!(d.needs[1].matched() <= 400);
    }

    #[test]
    fn nudge_on_fully_matched_disaster_is_noop() {
        let config = MatchingConfig {
            nudge_chance: 1.0,
            ..MatchingConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let mut d = disaster(vec![
            Need::new("Water", "Water", 50, Priority::High, "x").with_matched(50),
        ]);
        assert_eq!(nudge(&mut d, &config, &mut rng), None);
    }
}
