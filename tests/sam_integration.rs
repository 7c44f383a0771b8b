//! Integration tests for the Sam engine
//!
//! Runs against the shipped simulation script

use std::collections::BTreeSet;
use std::sync::Arc;
use clinsim::core::sam::APOLOGY_TEXT;
use clinsim::core::{load_script_set, SamEngine, SequenceDice, StdDice};
use clinsim::types::{EngineConfig, NaturalizerConfig, SamConfig, SamScript, SelectionRule};
use clinsim::{RESISTANCE_INITIAL, RESISTANCE_MIN};

const SCRIPTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scripts");

const INPUTS: &[&str] = &[
    "Good morning, thanks for meeting with me.",
    "I know staff are stretched thin.",
    "The vaccine itself costs the facility nothing.",
    "We could run it in the intake area.",
    "The data from other jails shows fewer outbreaks.",
    "What happened with the program last year?",
    "Inmates can refuse, it is voluntary.",
    "We will handle all documentation ourselves.",
    "Could we compromise with a small pilot?",
    "Security can count every needle.",
    "It is important that we protect your staff.",
    "We can work around the count schedule.",
    "okay",
];

fn sam_script() -> Arc<SamScript> {
    load_script_set(SCRIPTS).unwrap().simulation
}

fn deterministic(config: SamConfig) -> SamEngine<SequenceDice> {
    SamEngine::with_dice(sam_script(), config, NaturalizerConfig::quiet(), SequenceDice::zeros())
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let config = EngineConfig::default();
    let mut a = SamEngine::new(sam_script(), &config, Some(42));
    let mut b = SamEngine::new(sam_script(), &config, Some(42));

    for input in INPUTS {
        assert_eq!(a.process_user_input(input), b.process_user_input(input));
    }
}

#[test]
fn test_state_invariants_over_long_conversations() {
    let script = sam_script();
    let categories: BTreeSet<String> = script.categories().map(String::from).collect();
    let config = EngineConfig::default();

    for seed in 0..25u64 {
        let mut sam = SamEngine::with_dice(
            script.clone(),
            config.sam.clone(),
            config.naturalizer.clone(),
            StdDice::seeded(seed),
        );
        let mut used_before = BTreeSet::new();
        let mut topics_before = BTreeSet::new();
        let mut resistance_before = RESISTANCE_INITIAL;
        let mut closings = 0;

        for turn in 0..40 {
            let input = INPUTS[(turn + seed as usize) % INPUTS.len()];
            let reply = sam.respond(input);
            assert!(!reply.text.trim().is_empty());
            if reply.source.as_deref() == Some("closing_remarks") {
                closings += 1;
            }

            let state = sam.state();
            assert!(used_before.is_subset(&state.used_categories));
            assert!(topics_before.is_subset(&state.topics_addressed));
            assert!(state.topics_addressed.is_subset(&categories));
            assert!(state.previous_responses.len() <= 3);
            assert!(state.key_phrases.len() <= state.key_phrases.capacity());
            assert_eq!(state.key_phrases.capacity(), 5);
            assert!(state.resistance_level() <= resistance_before);
            assert!(state.resistance_level() >= RESISTANCE_MIN);
            assert_eq!(state.conversation_depth, turn as u32 + 1);

            used_before = state.used_categories.clone();
            topics_before = state.topics_addressed.clone();
            resistance_before = state.resistance_level();
        }
        assert!(closings <= 1, "seed {} closed {} times", seed, closings);
    }
}

#[test]
fn test_each_objection_reachable_by_keyword() {
    let cases = [
        ("staff", "staffing_issues"),
        ("security", "security_concerns"),
        ("space", "space_limitations"),
        ("paperwork", "paperwork_burden"),
        ("budget", "budget_concerns"),
        ("inmate", "inmate_resistance"),
        ("schedule", "scheduling_disruptions"),
        ("previous", "past_failures"),
        ("research", "evidence_response"),
        ("compromise", "alternative_suggestions"),
    ];
    let config = SamConfig {
        quote_probability: 0.0,
        ..SamConfig::default()
    };

    for (input, category) in cases {
        let mut sam = deterministic(config.clone());
        let reply = sam.respond(input);
        assert_eq!(reply.rule, SelectionRule::S103_NEW_TOPIC, "input {}", input);
        assert_eq!(reply.source.as_deref(), Some(category), "input {}", input);
        assert!(sam.state().topics_addressed.contains(category));
    }
}

#[test]
fn test_opening_stance_without_keywords() {
    let mut sam = deterministic(SamConfig::default());
    let reply = sam.respond("Hello, nice to meet you.");
    assert_eq!(reply.rule, SelectionRule::S101_OPENING);
    let first_opening = &sam_script().responses["opening_interaction"][0];
    assert_eq!(&reply.text, first_opening);
}

#[test]
fn test_unknown_category_apologizes() {
    let mut sam = deterministic(SamConfig::default());
    assert_eq!(sam.get_response("weather_small_talk"), APOLOGY_TEXT);
    assert!(!sam.state().has_used("weather_small_talk"));
}

#[test]
fn test_contracted_variants_reach_the_student() {
    let mut sam = deterministic(SamConfig::default());
    let text = sam.get_response("staffing_issues");
    // "I do not have the officers to escort inmates to a clinic. ..."
    assert!(text.starts_with("I don't have the officers"), "{}", text);
    assert!(!text.contains("do not"));
}
