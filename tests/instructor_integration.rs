//! Integration tests for the instructor engine
//!
//! Pre-brief and de-brief against the shipped scripts

use clinsim::core::naturalizer::acknowledgments;
use clinsim::core::{load_script_set, InstructorEngine, SequenceDice};
use clinsim::types::{
    DialogueMode, Emotion, EngineConfig, InstructorConfig, NaturalizerConfig, ScriptSet,
    SelectionRule,
};

const SCRIPTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/scripts");

fn scripts() -> ScriptSet {
    load_script_set(SCRIPTS).unwrap()
}

fn quiet(mode: DialogueMode, naturalizer: NaturalizerConfig) -> InstructorEngine<SequenceDice> {
    let set = scripts();
    let script = match mode {
        DialogueMode::Prebrief => set.prebrief,
        DialogueMode::Debrief => set.debrief,
    };
    let config = InstructorConfig {
        follow_up_probability: 0.0,
        ..InstructorConfig::default()
    };
    InstructorEngine::with_dice(script, mode, config, naturalizer, SequenceDice::zeros())
}

#[test]
fn test_prebrief_progression_reaches_sticky_closing() {
    let mut noa = InstructorEngine::new(
        scripts().prebrief,
        DialogueMode::Prebrief,
        &EngineConfig::default(),
        Some(7),
    );

    let rules: Vec<SelectionRule> = (0..5).map(|_| noa.respond("ok").rule).collect();
    assert_eq!(rules[0], SelectionRule::I201_INTRODUCTION);
    assert!(rules[1..].iter().all(|r| *r == SelectionRule::I203_PROGRESSION));
    assert_eq!(noa.state().sections_covered.len(), 5);
    assert!(noa.closing_reached());

    for input in ["ok", "What are the objectives again?", "Tell me about Sam"] {
        let reply = noa.respond(input);
        assert_eq!(reply.source.as_deref(), Some("closing"), "input {}", input);
    }
}

#[test]
fn test_keywords_route_before_closing() {
    let mut noa = quiet(DialogueMode::Prebrief, NaturalizerConfig::quiet());
    assert_eq!(noa.respond("Tell me about Sam").source.as_deref(), Some("character_profile"));
    assert_eq!(noa.respond("Any tips?").source.as_deref(), Some("preparation_tips"));
    assert_eq!(noa.respond("What is the context here").source.as_deref(), Some("scenario_background"));
}

#[test]
fn test_quiet_reply_is_joined_paragraphs() {
    let set = scripts();
    let mut noa = quiet(DialogueMode::Prebrief, NaturalizerConfig::quiet());
    let reply = noa.respond("ok");
    assert_eq!(reply.text, set.prebrief.sections["introduction"].join(" "));
}

#[test]
fn test_debrief_acknowledges_observed_emotion() {
    let naturalizer = NaturalizerConfig {
        acknowledgment_probability: 1.0,
        ..NaturalizerConfig::quiet()
    };
    let mut noa = quiet(DialogueMode::Debrief, naturalizer);
    let reply = noa.respond("This was so frustrating");

    assert!(noa.state().observed_emotions.contains(&Emotion::Frustration));
    let first = acknowledgments(Emotion::Frustration)[0];
    assert!(reply.text.starts_with(first), "{}", reply.text);
}

#[test]
fn test_emotions_accumulate_as_a_set() {
    let mut noa = quiet(DialogueMode::Debrief, NaturalizerConfig::quiet());
    noa.respond("It was hard");
    noa.respond("Really hard, and I felt confused");
    noa.respond("But I tried my best");
    let emotions: Vec<Emotion> = noa.state().observed_emotions.iter().copied().collect();
    assert_eq!(
        emotions,
        vec![Emotion::Frustration, Emotion::Uncertainty, Emotion::Determination]
    );
}

#[test]
fn test_prebrief_does_not_track_emotions() {
    let mut noa = quiet(DialogueMode::Prebrief, NaturalizerConfig::quiet());
    noa.respond("I'm confused and this is hard");
    assert!(noa.state().observed_emotions.is_empty());
}

#[test]
fn test_follow_up_uses_phrase_from_earlier_turn() {
    let set = scripts();
    let config = InstructorConfig {
        follow_up_probability: 1.0,
        ..InstructorConfig::default()
    };
    let mut noa = InstructorEngine::with_dice(
        set.debrief,
        DialogueMode::Debrief,
        config,
        NaturalizerConfig::quiet(),
        SequenceDice::zeros(),
    );

    let first = noa.respond("Sam kept bringing up overtime for his officers.");
    assert_ne!(first.rule, SelectionRule::I204_FOLLOW_UP);

    let second = noa.respond("ok");
    assert_eq!(second.rule, SelectionRule::I204_FOLLOW_UP);
    assert!(second.text.contains("when you mentioned '"), "{}", second.text);
}
