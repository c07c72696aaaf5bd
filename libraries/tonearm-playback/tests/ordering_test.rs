//! Next/previous ordering through the public state API

use rand::rngs::StdRng;
use rand::SeedableRng;
use tonearm_playback::{PlayContext, PlaybackState};

fn playing(ids: Vec<i64>, active: i64) -> PlaybackState {
    let mut state = PlaybackState::new();
    state.play(ids, active, PlayContext::Playlist, Some("42".to_string()));
    state
}

#[test]
fn queue_head_wins_over_every_mode() {
    for (shuffle, repeat, autoplay) in [
        (false, false, false),
        (true, false, false),
        (false, true, false),
        (true, true, true),
    ] {
        let mut state = playing(vec![1, 2, 3], 3);
        state.set_shuffle(shuffle);
        state.set_repeat(repeat);
        state.enqueue_many([7, 8]);

        assert_eq!(state.resolve_next(autoplay), Some(7));
        assert_eq!(state.queue().to_vec(), vec![8]);
        assert!(state.playing_from_queue());
    }
}

#[test]
fn queue_is_served_with_an_empty_context() {
    let mut state = PlaybackState::new();
    state.enqueue(5);

    assert_eq!(state.resolve_next(false), Some(5));
    assert_eq!(state.resolve_next(false), None);
}

#[test]
fn context_order_resumes_after_queue_excursion() {
    let mut state = playing(vec![1, 2, 3], 2);
    state.enqueue(9);

    assert_eq!(state.resolve_next(false), Some(9));
    assert!(state.playing_from_queue());
    assert_eq!(state.last_context_id(), Some(2));

    assert_eq!(state.resolve_next(false), Some(3));
    assert!(!state.playing_from_queue());
}

#[test]
fn consecutive_queue_items_keep_the_first_anchor() {
    let mut state = playing(vec![1, 2, 3, 4], 2);
    state.enqueue_many([10, 11]);

    assert_eq!(state.activate_next(false), Some(10));
    assert_eq!(state.activate_next(false), Some(11));
    assert_eq!(state.last_context_id(), Some(2));
    assert_eq!(state.activate_next(false), Some(3));
    assert_eq!(state.last_context_id(), Some(3));
}

#[test]
fn queued_track_also_in_context_does_not_move_anchor() {
    // 3 is both queued and part of the listing
    let mut state = playing(vec![1, 2, 3, 4], 1);
    state.enqueue(3);

    assert_eq!(state.activate_next(false), Some(3));
    assert_eq!(state.last_context_id(), Some(1));
    assert_eq!(state.activate_next(false), Some(2));
}

#[test]
fn end_of_context_without_autoplay_stops() {
    let mut state = playing(vec![1, 2, 3], 3);
    assert!(state.is_at_context_end());
    assert_eq!(state.resolve_next(false), None);
}

#[test]
fn end_of_context_with_autoplay_wraps() {
    let mut state = playing(vec![1, 2, 3], 3);
    assert_eq!(state.resolve_next(true), Some(1));
}

#[test]
fn end_of_context_with_repeat_wraps() {
    let mut state = playing(vec![1, 2, 3], 3);
    state.set_repeat(true);
    assert_eq!(state.resolve_next(false), Some(1));
}

#[test]
fn active_outside_context_starts_from_anchor() {
    let mut state = playing(vec![1, 2, 3], 2);
    state.set_active(99);

    assert_eq!(state.resolve_next(false), Some(3));
    assert_eq!(state.resolve_previous(), Some(1));
}

#[test]
fn no_reference_starts_at_the_edges() {
    let mut state = PlaybackState::new();
    state.set_context_list(vec![4, 5, 6]);

    assert_eq!(state.resolve_next(false), Some(4));
    assert_eq!(state.resolve_previous(), Some(6));
}

#[test]
fn previous_wraps_to_last() {
    let mut state = playing(vec![1, 2, 3], 1);
    assert_eq!(state.resolve_previous(), Some(3));

    state.set_shuffle(true);
    assert_eq!(state.resolve_previous(), Some(3));
}

#[test]
fn previous_ignores_shuffle() {
    let mut state = playing(vec![1, 2, 3, 4, 5], 3);
    state.set_shuffle(true);

    for _ in 0..20 {
        assert_eq!(state.resolve_previous(), Some(2));
    }
}

#[test]
fn previous_ignores_the_queue() {
    let mut state = playing(vec![1, 2, 3], 2);
    state.enqueue(9);

    assert_eq!(state.activate_previous(), Some(1));
    assert_eq!(state.queue().to_vec(), vec![9]);
}

#[test]
fn shuffle_picks_from_context() {
    let mut state = playing(vec![10, 20, 30, 40], 10);
    state.set_shuffle(true);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let next = state.resolve_next_with(false, &mut rng);
        assert!(matches!(next, Some(10 | 20 | 30 | 40)));
    }
}

#[test]
fn empty_everything_resolves_nothing() {
    let mut state = PlaybackState::new();
    assert_eq!(state.resolve_next(true), None);
    assert_eq!(state.resolve_previous(), None);
}

#[test]
fn removal_takes_first_match_only() {
    let mut state = PlaybackState::new();
    state.enqueue_many([5, 6, 5, 7]);

    assert!(state.remove_from_queue(5));
    assert_eq!(state.queue().to_vec(), vec![6, 5, 7]);

    assert!(!state.remove_from_queue(42));
    assert_eq!(state.queue().to_vec(), vec![6, 5, 7]);
}

#[test]
fn play_starts_a_new_session() {
    let mut state = playing(vec![1, 2], 1);
    let first = state.playback_id();

    state.play(vec![1, 2], 1, PlayContext::Playlist, Some("42".to_string()));
    assert_eq!(state.playback_id(), first + 1);
    assert!(state.is_playing());
    assert_eq!(state.play_context(), PlayContext::Playlist);
    assert_eq!(state.play_context_id(), Some("42"));
}
