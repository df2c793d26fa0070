use proptest::prelude::*;
use provis_kernel::prelude::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
struct Pool {
    size: u16,
    name: String,
}

impl Default for Pool {
    fn default() -> Self {
        Self { size: 4, name: "default".to_owned() }
    }
}

#[derive(Debug, Default, Clone)]
struct PartialPool {
    size: Option<u16>,
    name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PoolFeature {
    Metrics,
    Tracing,
    Label,
}

impl fmt::Display for PoolFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for PoolFeature {
    type Err = ();

    fn from_str(_: &str) -> Result<Self, Self::Err> {
        Err(())
    }
}

impl FeatureKind for PoolFeature {
    fn is_exclusive(self) -> bool {
        !matches!(self, Self::Label)
    }
}

const LABELS: Capability = Capability::new("pool.labels");

impl Composable for Pool {
    type Partial = PartialPool;
    type Kind = PoolFeature;

    const CAPABILITY: Capability = Capability::new("pool.config");

    fn merge(self, partial: PartialPool) -> Self {
        Self { size: partial.size.unwrap_or(self.size), name: partial.name.unwrap_or(self.name) }
    }

    fn strategies(&self) -> Vec<Registration> {
        Vec::new()
    }

    fn sinks(&self) -> Vec<Registration> {
        Vec::new()
    }
}

fn feature(kind: PoolFeature, tag: u8) -> Feature<PoolFeature> {
    Feature::new(kind, vec![Registration::value(LABELS, tag).multi()])
}

fn kind() -> impl Strategy<Value = PoolFeature> {
    prop_oneof![Just(PoolFeature::Metrics), Just(PoolFeature::Tracing), Just(PoolFeature::Label)]
}

fn partial() -> impl Strategy<Value = PartialPool> {
    (proptest::option::of(any::<u16>()), proptest::option::of("[a-z]{1,8}"))
        .prop_map(|(size, name)| PartialPool { size, name })
}

proptest! {
    #[test]
    fn merged_config_is_defaults_with_overrides(partial in partial()) {
        let registrations = compose::<Pool>(partial.clone(), []).unwrap();
        let expected = Pool {
            size: partial.size.unwrap_or(4),
            name: partial.name.unwrap_or_else(|| "default".to_owned()),
        };
        prop_assert_eq!(&registrations[0], &Registration::value(Pool::CAPABILITY, expected));
    }

    #[test]
    fn compose_is_idempotent(
        partial in partial(),
        kinds in proptest::collection::vec(kind(), 0..6),
    ) {
        let features = || kinds.iter().enumerate().map(|(i, k)| feature(*k, i as u8)).collect::<Vec<_>>();
        let first = compose::<Pool>(partial.clone(), features());
        let second = compose::<Pool>(partial, features());
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "outcomes differ"),
        }
    }

    #[test]
    fn valid_feature_lists_keep_caller_order(labels in 0_u8..8, metrics in any::<bool>()) {
        let mut features: Vec<_> = (0..labels).map(|i| feature(PoolFeature::Label, i)).collect();
        if metrics {
            features.insert(features.len() / 2, feature(PoolFeature::Metrics, 200));
        }
        let expected: Vec<Registration> =
            features.iter().flat_map(|f| f.registrations().to_vec()).collect();

        let registrations = compose::<Pool>(PartialPool::default(), features).unwrap();
        prop_assert_eq!(&registrations[1..], expected.as_slice());
    }

    #[test]
    fn conflicts_are_detected_in_any_order(
        kinds in proptest::collection::vec(kind(), 0..6).prop_shuffle(),
    ) {
        let duplicated = [PoolFeature::Metrics, PoolFeature::Tracing]
            .into_iter()
            .find(|k| kinds.iter().filter(|x| *x == k).count() > 1);

        let features: Vec<_> = kinds.iter().map(|k| feature(*k, 0)).collect();
        let mut reversed = features.clone();
        reversed.reverse();

        let forward = compose::<Pool>(PartialPool::default(), features);
        let backward = compose::<Pool>(PartialPool::default(), reversed);

        match duplicated {
            Some(kind) => {
                for outcome in [forward, backward] {
                    let err = outcome.unwrap_err();
                    prop_assert!(
                        matches!(&err, ComposeError::ConfigurationConflict { kind: k, .. } if k == &kind.to_string()),
                        "unexpected error {:?}", err
                    );
                }
            },
            None => {
                prop_assert!(forward.is_ok());
                prop_assert!(backward.is_ok());
            },
        }
    }
}
