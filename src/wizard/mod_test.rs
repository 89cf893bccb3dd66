use super::*;

#[test]
fn navigator_starts_at_idea() {
    let nav = Navigator::new();
    assert_eq!(nav.current(), WizardStep::Idea);
    assert_eq!(nav.progress(), (1, 5));
}

#[test]
fn next_walks_all_five_steps_in_order() {
    let mut nav = Navigator::new();
    assert_eq!(nav.next(), WizardStep::Hook);
    assert_eq!(nav.next(), WizardStep::Structure);
    assert_eq!(nav.next(), WizardStep::Captions);
    assert_eq!(nav.next(), WizardStep::Performance);
}

#[test]
fn next_saturates_at_performance() {
    let mut nav = Navigator::new();
    nav.go_to(WizardStep::Performance);
    assert_eq!(nav.next(), WizardStep::Performance);
    assert_eq!(nav.current(), WizardStep::Performance);
}

#[test]
fn previous_saturates_at_idea() {
    let mut nav = Navigator::new();
    assert_eq!(nav.previous(), WizardStep::Idea);
}

#[test]
fn previous_remains_available_after_last_step() {
    // The machine has no terminal state: performance does not lock.
    let mut nav = Navigator::new();
    nav.go_to(WizardStep::Performance);
    assert_eq!(nav.previous(), WizardStep::Captions);
}

#[test]
fn go_to_jumps_anywhere() {
    let mut nav = Navigator::new();
    nav.go_to(WizardStep::Captions);
    assert_eq!(nav.current(), WizardStep::Captions);
    assert_eq!(nav.progress(), (4, 5));
    nav.go_to(WizardStep::Idea);
    assert_eq!(nav.current(), WizardStep::Idea);
}

#[test]
fn step_identifiers_round_trip() {
    for step in WizardStep::ALL {
        assert_eq!(WizardStep::from_str(step.as_str()), Some(step));
    }
    assert_eq!(WizardStep::from_str("intro"), None);
}

#[test]
fn step_order_matches_index() {
    for (i, step) in WizardStep::ALL.iter().enumerate() {
        assert_eq!(step.index(), i);
    }
}

#[test]
fn successor_and_predecessor_agree() {
    assert_eq!(WizardStep::Idea.predecessor(), None);
    assert_eq!(WizardStep::Performance.successor(), None);
    assert_eq!(WizardStep::Hook.successor(), Some(WizardStep::Structure));
    assert_eq!(WizardStep::Structure.predecessor(), Some(WizardStep::Hook));
}
