use chrono::Utc;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use relief_ops::config::{Config, DemoConfig, MatchingConfig};
use relief_ops::ops::fixtures::Fixtures;
use relief_ops::ops::matching;
use relief_ops::ops::Operations;
use relief_ops::{Disaster, DisasterType, Id, Location, Need, OpsError, Priority, Severity};
use std::time::Duration;

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn need() -> impl Strategy<Value = Need> {
    (0_u32..5_000, 0_u32..=100, priority()).prop_map(|(requested, pct, priority)| {
        Need::new("Relief", "Supplies", requested, priority, "Partner").with_matched(requested * pct / 100)
    })
}

fn disaster(needs: Vec<Need>) -> Disaster {
    Disaster {
        id: Id::from("DIS-P"),
        name: "Generated".to_string(),
        disaster_type: DisasterType::Earthquake,
        location: Location::new(0.0, 0.0, "Nowhere"),
        severity: Severity::Medium,
        affected_population: 1_000,
        timestamp: Utc::now(),
        needs,
    }
}

fn operations(seed: u64, nudge_chance: f64, d: Disaster) -> Operations {
    let config = Config {
        seed: Some(seed),
        matching: MatchingConfig {
            nudge_chance,
            ..MatchingConfig::default()
        },
        demo: DemoConfig {
            enabled: false,
            ..DemoConfig::default()
        },
        ..Config::default()
    };
    let mut fixtures = Fixtures::empty();
    fixtures.disasters.push(d);
    Operations::with_fixtures(config, fixtures)
}

fn matched(ops: &Operations) -> Vec<u32> {
    ops.store().disasters[0].needs.iter().map(|n| n.matched()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matched_never_exceeds_requested(
        seed in any::<u64>(),
        needs in prop::collection::vec(need(), 1..8)
    ) {
        let mut ops = operations(seed, 1.0, disaster(needs));
        ops.select_disaster(&Id::from("DIS-P")).unwrap();
        let _ = ops.start_matching();
        ops.advance(Duration::from_secs(90));

        for n in &ops.store().disasters[0].needs {
            prop_assert!(n.matched() <= n.requested);
        }
    }

    #[test]
    fn a_run_strictly_raises_every_open_need(
        seed in any::<u64>(),
        needs in prop::collection::vec(need(), 1..8)
    ) {
        let d = disaster(needs);
        let refused = d.match_rate() >= MatchingConfig::default().ceiling_percent;
        let mut ops = operations(seed, 0.0, d);
        ops.select_disaster(&Id::from("DIS-P")).unwrap();
        let before = matched(&ops);

        let started = ops.start_matching();
        if refused {
            prop_assert!(matches!(started, Err(OpsError::MatchingRefused(_))));
        } else {
            prop_assert!(started.is_ok());
        }
        ops.advance(Duration::from_secs(60));
        prop_assert!(!ops.is_matching());

        let after = matched(&ops);
        for ((n, b), a) in ops.store().disasters[0].needs.iter().zip(&before).zip(&after) {
            if refused || *b >= n.requested {
                prop_assert_eq!(a, b);
            } else {
                prop_assert!(a > b);
            }
        }
    }

    #[test]
    fn nudge_skips_fully_matched_needs(
        seed in any::<u64>(),
        needs in prop::collection::vec(need(), 1..8)
    ) {
        let mut d = disaster(needs);
        let config = MatchingConfig { nudge_chance: 1.0, ..MatchingConfig::default() };
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..50 {
            let full: Vec<bool> = d.needs.iter().map(|n| n.is_fully_matched()).collect();
            let before: Vec<u32> = d.needs.iter().map(|n| n.matched()).collect();

            match matching::nudge(&mut d, &config, &mut rng) {
                Some((idx, applied)) => {
                    prop_assert!(!full[idx]);
                    prop_assert!(applied >= 1);
                }
                None => prop_assert!(full.iter().all(|f| *f)),
            }
            for (i, n) in d.needs.iter().enumerate() {
                if full[i] {
                    prop_assert_eq!(n.matched(), before[i]);
                }
                prop_assert!(n.matched() <= n.requested);
            }
        }
    }
}
