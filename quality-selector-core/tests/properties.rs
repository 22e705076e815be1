use proptest::prelude::*;
use quality_selector_core::{
    Height, MenuEntry, Quality, QualityFilter, QualityLevel, QualityLevelSource, QualityLevels, QualitySelector,
    RebuildPolicy, SelectError, Selector,
};
use std::rc::Rc;

fn arb_levels() -> impl Strategy<Value = Vec<QualityLevel>> {
    prop::collection::vec(
        (
            prop::sample::select(vec![0u32, 240, 360, 480, 720, 1080]),
            prop::sample::select(vec![0u64, 400_000, 800_000, 1_500_000, 3_000_000]),
            any::<bool>(),
        ),
        0..8,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (height, bitrate, enabled))| {
                let mut level = QualityLevel::new(format!("level-{i}"), height, bitrate);
                level.enabled = enabled;
                level
            })
            .collect()
    })
}

fn arb_filter() -> impl Strategy<Value = QualityFilter> {
    (
        prop::option::of(prop::sample::select(vec![0u32, 360, 480, 720, 2160])),
        prop::option::of(prop::sample::select(vec![0u64, 800_000, 3_000_000, 9_000_000])),
    )
        .prop_map(|(height, bitrate)| QualityFilter {
            name: None,
            bitrate,
            height: height.map(Height::Pixels),
        })
}

fn setup(levels: &[QualityLevel]) -> (QualityLevels, QualitySelector) {
    let source = QualityLevels::new();
    for level in levels {
        source.add_level(level.clone());
    }
    let mut selector = QualitySelector::new(Rc::new(source.clone()), RebuildPolicy::PreserveSelection);
    selector.on_level_added();
    (source, selector)
}

fn selected_count(entries: &[MenuEntry]) -> usize {
    entries.iter().filter(|entry| entry.selected).count()
}

proptest! {
    #[test]
    fn unconstrained_filter_picks_first_level(levels in arb_levels()) {
        let (source, mut selector) = setup(&levels);
        let result = selector.set_quality(&QualityFilter::default());
        match levels.first() {
            Some(first) => {
                let quality = result.unwrap();
                prop_assert_eq!(quality.level_id(), Some(first.id.as_str()));
                let enabled: Vec<bool> = source.levels().iter().map(|level| level.enabled).collect();
                prop_assert_eq!(enabled.iter().filter(|e| **e).count(), 1);
                prop_assert!(enabled[0]);
            }
            None => prop_assert_eq!(result, Err(SelectError::NoMatch)),
        }
    }

    #[test]
    fn failed_selection_is_a_no_op(levels in arb_levels(), first in arb_filter(), second in arb_filter()) {
        let (source, mut selector) = setup(&levels);
        let _ = selector.set_quality(&first);
        let before_levels = source.levels();
        let before_quality = selector.quality();
        let before_entries = selector.entries().to_vec();

        if selector.set_quality(&second).is_err() {
            prop_assert_eq!(source.levels(), before_levels);
            prop_assert_eq!(selector.quality(), before_quality);
            prop_assert_eq!(selector.entries(), before_entries.as_slice());
        }
    }

    #[test]
    fn auto_always_enables_everything(levels in arb_levels(), prior in arb_filter()) {
        let (source, mut selector) = setup(&levels);
        let _ = selector.set_quality(&prior);

        prop_assert_eq!(selector.set_quality(&QualityFilter::auto()), Ok(Quality::Auto));
        prop_assert!(source.levels().iter().all(|level| level.enabled));
        prop_assert_eq!(selector.quality(), Quality::Auto);
    }

    #[test]
    fn successful_selection_marks_one_entry(levels in arb_levels(), filter in arb_filter()) {
        let (source, mut selector) = setup(&levels);
        if let Ok(quality) = selector.set_quality(&filter) {
            prop_assert_eq!(selected_count(selector.entries()), 1);
            let entry = selector.entries().iter().find(|entry| entry.selected).unwrap();
            match quality {
                Quality::Auto => prop_assert!(entry.is_auto()),
                Quality::Level(level) => {
                    prop_assert_eq!(entry.height, Height::Pixels(level.height));
                    let enabled: Vec<String> = source
                        .levels()
                        .into_iter()
                        .filter(|level| level.enabled)
                        .map(|level| level.id)
                        .collect();
                    prop_assert_eq!(enabled, vec![level.id]);
                }
            }
        }
    }

    #[test]
    fn rebuilt_entries_are_sorted_unique_and_end_with_auto(levels in arb_levels()) {
        let (_source, selector) = setup(&levels);
        let entries = selector.entries();
        prop_assert!(entries.last().unwrap().is_auto());
        let heights: Vec<Height> = entries.iter().map(|entry| entry.height).collect();
        prop_assert!(heights.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(selected_count(entries), 1);
    }
}
