//! Keyboard navigation: gating, bindings and step-driven autoscroll

mod support;

use ferrex_carousel::{
    CarouselConfig, FocusTarget, KeyOutcome, NavKey, ScrollRequest,
    StepDirection, StepOutcome,
};

use support::{Harness, HarnessOptions};

fn scroll_of(outcome: &KeyOutcome) -> Option<ScrollRequest> {
    match outcome {
        KeyOutcome::Stepped { scroll, .. } => *scroll,
        other => panic!("expected a step, got {other:?}"),
    }
}

async fn focused_at_one(options: HarnessOptions) -> Harness {
    let mut harness = Harness::mounted(options);
    harness.load_at_least(20).await;
    harness.carousel.set_focus(FocusTarget::Index(1));
    harness
}

#[tokio::test]
async fn editable_focus_suppresses_navigation() {
    let mut harness = focused_at_one(HarnessOptions::default()).await;

    harness.arbiter.set_editing(true);
    assert_eq!(harness.carousel.on_key(NavKey::ArrowRight), KeyOutcome::Suppressed);
    assert_eq!(harness.carousel.current().unwrap().index, 1);

    harness.arbiter.set_editing(false);
    let outcome = harness.carousel.on_key(NavKey::ArrowRight);
    assert!(matches!(
        outcome,
        KeyOutcome::Stepped { step: StepOutcome::Moved(item), scroll: None } if item.index == 2
    ));
}

#[tokio::test]
async fn unbound_keys_are_ignored() {
    let mut harness = focused_at_one(HarnessOptions::default()).await;
    assert_eq!(harness.carousel.on_key(NavKey::PageDown), KeyOutcome::Ignored);
    assert_eq!(harness.carousel.on_key(NavKey::Char('x')), KeyOutcome::Ignored);
    assert_eq!(harness.carousel.current().unwrap().index, 1);
}

#[tokio::test]
async fn every_third_step_requests_a_scroll() {
    let mut harness = focused_at_one(HarnessOptions::default()).await;

    let forward: Vec<Option<ScrollRequest>> = (0..6)
        .map(|_| scroll_of(&harness.carousel.on_key(NavKey::ArrowRight)))
        .collect();
    let expected = Some(ScrollRequest {
        direction: StepDirection::Next,
        items: 3,
        pixels: 645.0,
    });
    assert_eq!(forward, vec![None, None, expected, None, None, expected]);
    assert_eq!(harness.carousel.current().unwrap().index, 7);

    // Changing direction restarts the count.
    let back: Vec<bool> = (0..3)
        .map(|_| scroll_of(&harness.carousel.on_key(NavKey::ArrowLeft)).is_some())
        .collect();
    assert_eq!(back, vec![false, false, true]);
    assert_eq!(harness.carousel.current().unwrap().index, 4);
}

#[tokio::test]
async fn boundary_presses_do_not_count_toward_scroll() {
    let mut harness = focused_at_one(HarnessOptions::default()).await;

    for _ in 0..3 {
        let outcome = harness.carousel.on_key(NavKey::ArrowLeft);
        assert_eq!(
            outcome,
            KeyOutcome::Stepped {
                step: StepOutcome::Boundary,
                scroll: None,
            }
        );
    }
    assert_eq!(harness.carousel.current().unwrap().index, 1);
}

#[tokio::test]
async fn click_resets_the_step_streak() {
    let mut harness = focused_at_one(HarnessOptions::default()).await;

    harness.carousel.on_key(NavKey::ArrowRight);
    harness.carousel.on_key(NavKey::ArrowRight);
    let id = harness.id_at(10);
    harness.carousel.on_item_click(id);

    let scrolls: Vec<bool> = (0..3)
        .map(|_| scroll_of(&harness.carousel.on_key(NavKey::ArrowRight)).is_some())
        .collect();
    assert_eq!(scrolls, vec![false, false, true]);
    assert_eq!(harness.carousel.current().unwrap().index, 13);
}

#[tokio::test]
async fn configured_bindings_and_cadence_apply() {
    let config = CarouselConfig {
        page_size: Some(10),
        prev_key: Some("h".into()),
        next_key: Some("l".into()),
        autoscroll_every_steps: Some(2),
        autoscroll_items: Some(1),
        item_width: Some(100.0),
        item_spacing: Some(0.0),
        ..CarouselConfig::default()
    };
    let mut harness = focused_at_one(HarnessOptions {
        config,
        ..HarnessOptions::default()
    })
    .await;

    assert_eq!(harness.carousel.on_key(NavKey::ArrowRight), KeyOutcome::Ignored);
    assert_eq!(scroll_of(&harness.carousel.on_key(NavKey::Char('L'))), None);
    assert_eq!(
        scroll_of(&harness.carousel.on_key(NavKey::Char('l'))),
        Some(ScrollRequest {
            direction: StepDirection::Next,
            items: 1,
            pixels: 100.0,
        })
    );
    assert_eq!(harness.carousel.current().unwrap().index, 3);
}

#[tokio::test]
async fn zero_cadence_disables_autoscroll() {
    let config = CarouselConfig {
        page_size: Some(10),
        autoscroll_every_steps: Some(0),
        ..CarouselConfig::default()
    };
    let mut harness = focused_at_one(HarnessOptions {
        config,
        ..HarnessOptions::default()
    })
    .await;

    for _ in 0..6 {
        assert_eq!(scroll_of(&harness.carousel.on_key(NavKey::ArrowRight)), None);
    }
    assert_eq!(harness.carousel.current().unwrap().index, 7);
}

#[tokio::test]
async fn stepping_past_loaded_prefix_still_counts() {
    let mut harness = Harness::mounted(HarnessOptions::default());
    harness.batch(1).await;
    harness.carousel.set_focus(FocusTarget::Index(8));

    let outcomes: Vec<KeyOutcome> = (0..3)
        .map(|_| harness.carousel.on_key(NavKey::ArrowRight))
        .collect();

    assert!(matches!(
        &outcomes[2],
        KeyOutcome::Stepped { step: StepOutcome::Loading { target: 11, .. }, scroll: Some(_) }
    ));
}
