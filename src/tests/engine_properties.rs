//! Property-based tests for reveal and crossing invariants.

use crate::model::{ElementId, RevealOptions, RootMargin, Threshold};
use crate::observer::{ManualObserver, ViewportObserver, VisibilityChange};
use crate::store::{RevealPhase, RevealTarget};
use crate::test_harness::{approx, RevealHarness};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// ===== Strategies =====

#[derive(Debug, Clone)]
enum Action {
    Show(f64),
    Hide,
    Wait(f64),
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0.0f64..=1.0).prop_map(Action::Show),
        Just(Action::Hide),
        (0.0f64..0.5).prop_map(Action::Wait),
    ]
}

proptest! {
    #[test]
    fn reveal_happens_at_most_once(
        threshold in 0.0f64..=1.0,
        delay in 0.0f64..1.0,
        actions in prop::collection::vec(arb_action(), 0..40),
    ) {
        let mut harness = RevealHarness::new();
        let element = harness.register(
            RevealOptions::default().with_threshold(threshold).with_delay(delay),
        );

        let mut was_revealed = false;
        for action in actions {
            match action {
                Action::Show(fraction) => harness.show(element, fraction),
                Action::Hide => harness.hide(element),
                Action::Wait(seconds) => harness.advance(seconds),
            }
            let revealed = harness.fx().is_revealed(element);
            prop_assert!(!was_revealed || revealed, "revealed must never revert");
            was_revealed = revealed;
        }
        harness.advance(2.0);

        let count = harness.reveals().len();
        prop_assert!(count <= 1);
        prop_assert_eq!(count == 1, harness.fx().phase(element) == Some(RevealPhase::Revealed));
    }

    #[test]
    fn stagger_children_fire_at_index_times_delay(
        count in 0usize..12,
        millis in 0u64..500,
        entry in 0.0f64..3.0,
    ) {
        let stagger = millis as f64 / 1000.0;
        let mut harness = RevealHarness::new();
        let (parent, children) =
            harness.register_staggered(RevealOptions::default().with_stagger(stagger), count);

        harness.advance(entry);
        let entered_at = harness.fx().now().as_secs_f64();
        harness.show(parent, 1.0);
        harness.advance(stagger * count as f64 + 1.0);

        let reveals = harness.reveals();
        prop_assert_eq!(reveals.len(), count);
        for reveal in reveals {
            let RevealTarget::Child { child, index, .. } = reveal.target else {
                return Err(TestCaseError::fail("parent emitted a directive"));
            };
            prop_assert_eq!(child, children[index]);
            prop_assert!(
                approx(reveal.at, entered_at + index as f64 * stagger),
                "child {} at {} expected {}",
                index,
                reveal.at,
                entered_at + index as f64 * stagger
            );
        }
    }

    #[test]
    fn unregister_before_delay_emits_nothing(
        delay in 0.1f64..5.0,
        fraction_of_delay in 0.0f64..0.99,
        stagger in any::<bool>(),
    ) {
        let mut harness = RevealHarness::new();
        let options = if stagger {
            // The first child fires at entry, so only later ones can be cancelled.
            RevealOptions::default().with_stagger(delay)
        } else {
            RevealOptions::default().with_delay(delay)
        };
        let (element, _) = harness.register_staggered(options, 3);
        harness.show(element, 1.0);
        let fired_at_entry = harness.reveals().len();

        harness.advance(delay * fraction_of_delay);
        harness.fx_mut().unregister(element);
        harness.advance(delay * 10.0);

        prop_assert_eq!(harness.reveals().len(), fired_at_entry);
        prop_assert_eq!(fired_at_entry, usize::from(stagger));
    }

    #[test]
    fn entries_match_upward_crossings(
        threshold in 0.05f64..=1.0,
        fractions in prop::collection::vec(prop::option::of(0.0f64..=1.0), 0..30),
    ) {
        let mut observer = ManualObserver::new();
        let element = ElementId::new(1);
        observer.register(element, Threshold::new(threshold).unwrap(), RootMargin::ZERO);

        let mut above = false;
        let mut expected = 0;
        for sample in &fractions {
            match sample {
                Some(fraction) => {
                    observer.set_visible_fraction(element, *fraction);
                }
                None => {
                    observer.set_hidden(element);
                }
            }
            let now_above = sample.is_some_and(|f| f >= threshold);
            if now_above && !above {
                expected += 1;
            }
            above = now_above;
        }

        let entries = observer
            .take_events()
            .iter()
            .filter(|e| e.change == VisibilityChange::Entered)
            .count();
        prop_assert_eq!(entries, expected);
    }
}
