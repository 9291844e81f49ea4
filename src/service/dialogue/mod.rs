pub mod model;

use model::{CalmExercise, DialogueState, Effect, Flow, FlowInput, Prompt, Synthesis};

use crate::service::user::Profile;

/// Starts `flow` from scratch. Whatever state the user was in is abandoned.
pub fn enter(flow: Flow) -> (DialogueState, Vec<Effect>) {
    let (state, prompt) = match flow {
        Flow::Profile => (DialogueState::AwaitingLanguage, Prompt::Language),
        Flow::Quiz => (DialogueState::AwaitingQuizTopic, Prompt::QuizTopic),
        Flow::Answer => (DialogueState::AwaitingAnswers, Prompt::Answers),
        Flow::Flashcards => (DialogueState::AwaitingFlashcardsTopic, Prompt::FlashcardsTopic),
        Flow::SimPatient => (DialogueState::AwaitingSymptoms, Prompt::Symptoms),
        Flow::Mood => (DialogueState::AwaitingMoodRating, Prompt::MoodRating),
        Flow::Reflect => (DialogueState::AwaitingWentWell, Prompt::WentWell),
        Flow::Calm => (DialogueState::AwaitingCalmChoice, Prompt::CalmMenu),
        Flow::DailyPlan => (DialogueState::AwaitingGoals, Prompt::Goals),
    };
    (state, vec![Effect::Prompt(prompt)])
}

/// Pure step function: consumes one input in `state`.
///
/// Cancel is accepted everywhere and always lands in `Idle`. Input that cannot be
/// used (blank text, out-of-range scale, unknown menu choice) keeps the state and
/// re-prompts.
pub fn transition(state: DialogueState, input: FlowInput) -> (DialogueState, Vec<Effect>) {
    let text = match input {
        FlowInput::Cancel => return (DialogueState::Idle, vec![Effect::Cancelled]),
        FlowInput::Text(text) => text.trim().to_string(),
    };

    if state.is_idle() {
        return (DialogueState::Idle, Vec::new());
    }

    if text.is_empty() {
        return (state, vec![Effect::Prompt(Prompt::EmptyInput)]);
    }

    match state {
        DialogueState::Idle => (DialogueState::Idle, Vec::new()),

        DialogueState::AwaitingLanguage => (
            DialogueState::AwaitingCountry {
                language: text.to_lowercase(),
            },
            vec![Effect::Prompt(Prompt::Country)],
        ),
        DialogueState::AwaitingCountry { language } => (
            DialogueState::AwaitingLevel {
                language,
                country: text.to_lowercase(),
            },
            vec![Effect::Prompt(Prompt::Level)],
        ),
        DialogueState::AwaitingLevel { language, country } => (
            DialogueState::Idle,
            vec![Effect::SaveProfile(Profile {
                language,
                country,
                level: text.to_lowercase(),
            })],
        ),

        DialogueState::AwaitingQuizTopic => (
            DialogueState::Idle,
            vec![Effect::Synthesize(Synthesis::Quiz { topic: text })],
        ),
        DialogueState::AwaitingAnswers => (
            DialogueState::Idle,
            vec![Effect::Synthesize(Synthesis::GradeAnswers { answers: text })],
        ),
        DialogueState::AwaitingFlashcardsTopic => (
            DialogueState::Idle,
            vec![Effect::Synthesize(Synthesis::Flashcards { topic: text })],
        ),
        DialogueState::AwaitingSymptoms => (
            DialogueState::Idle,
            vec![Effect::Synthesize(Synthesis::SimPatient { symptoms: text })],
        ),

        DialogueState::AwaitingMoodRating => match parse_scale(&text) {
            Some(rating) => (
                DialogueState::AwaitingStress { rating },
                vec![Effect::Prompt(Prompt::Stress)],
            ),
            None => (
                DialogueState::AwaitingMoodRating,
                vec![Effect::Prompt(Prompt::InvalidScale)],
            ),
        },
        DialogueState::AwaitingStress { rating } => match parse_scale(&text) {
            Some(stress) => (
                DialogueState::AwaitingWorry { rating, stress },
                vec![Effect::Prompt(Prompt::Worry)],
            ),
            None => (
                DialogueState::AwaitingStress { rating },
                vec![Effect::Prompt(Prompt::InvalidScale)],
            ),
        },
        DialogueState::AwaitingWorry { rating, stress } => (
            DialogueState::Idle,
            vec![
                Effect::SaveMood {
                    rating,
                    stress,
                    worry: text.clone(),
                },
                Effect::Synthesize(Synthesis::MoodSupport {
                    rating,
                    stress,
                    worry: text,
                }),
            ],
        ),

        DialogueState::AwaitingWentWell => (
            DialogueState::AwaitingChallenge { went_well: text },
            vec![Effect::Prompt(Prompt::Challenge)],
        ),
        DialogueState::AwaitingChallenge { went_well } => (
            DialogueState::AwaitingTomorrow {
                went_well,
                challenge: text,
            },
            vec![Effect::Prompt(Prompt::Tomorrow)],
        ),
        DialogueState::AwaitingTomorrow { went_well, challenge } => (
            DialogueState::Idle,
            vec![Effect::SaveReflection {
                went_well,
                challenge,
                tomorrow: text,
            }],
        ),

        DialogueState::AwaitingCalmChoice => match CalmExercise::from_choice(&text) {
            Some(exercise) => (DialogueState::Idle, vec![Effect::Calm(exercise)]),
            None => (
                DialogueState::AwaitingCalmChoice,
                vec![Effect::Prompt(Prompt::InvalidCalmChoice)],
            ),
        },

        DialogueState::AwaitingGoals => {
            let goals = split_goals(&text);
            if goals.is_empty() {
                (DialogueState::AwaitingGoals, vec![Effect::Prompt(Prompt::EmptyInput)])
            } else {
                (DialogueState::Idle, vec![Effect::SaveDailyPlan(goals)])
            }
        }
    }
}

/// Accepts an integer on the 1..=10 scale.
pub fn parse_scale(text: &str) -> Option<u8> {
    text.trim().parse::<u8>().ok().filter(|n| (1..=10).contains(n))
}

/// Goals are separated by `;` or line breaks.
pub fn split_goals(text: &str) -> Vec<String> {
    text.split(|c: char| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|goal| !goal.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FlowInput {
        FlowInput::Text(s.to_string())
    }

    /// Feeds `inputs` after entering `flow` and returns the last state and all effects.
    fn run(flow: Flow, inputs: &[&str]) -> (DialogueState, Vec<Effect>) {
        let (mut state, mut effects) = enter(flow);
        for input in inputs {
            let (next, mut step) = transition(state, text(input));
            state = next;
            effects.append(&mut step);
        }
        (state, effects)
    }

    fn synthesizes(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::Synthesize(_)))
    }

    const ALL_FLOWS: [(Flow, &[&str]); 9] = [
        (Flow::Profile, &["EN", "LT", "Studentas"]),
        (Flow::Quiz, &["astma"]),
        (Flow::Answer, &["A B C"]),
        (Flow::Flashcards, &["kardiologija"]),
        (Flow::SimPatient, &["kosulys, karščiavimas"]),
        (Flow::Mood, &["7", "4", "egzaminas"]),
        (Flow::Reflect, &["learned ECG", "too little sleep", "start earlier"]),
        (Flow::Calm, &["2"]),
        (Flow::DailyPlan, &["anatomy; pharmacology"]),
    ];

    #[test]
    fn test_every_flow_completes_and_returns_to_idle() {
        for (flow, inputs) in ALL_FLOWS {
            let (entered, _) = enter(flow);
            assert_eq!(entered.flow(), Some(flow));

            let (state, _) = run(flow, inputs);
            assert_eq!(state, DialogueState::Idle, "{flow:?} did not finish");
        }
    }

    #[test]
    fn test_cancel_at_every_intermediate_state() {
        for (flow, inputs) in ALL_FLOWS {
            for answered in 0..inputs.len() {
                let (state, mut effects) = run(flow, &inputs[..answered]);
                assert!(!state.is_idle());

                let (state, mut step) = transition(state, FlowInput::Cancel);
                effects.append(&mut step);

                assert_eq!(state, DialogueState::Idle);
                assert_eq!(effects.last(), Some(&Effect::Cancelled));
                assert!(!synthesizes(&effects), "{flow:?} generated before finishing");
            }
        }
    }

    #[test]
    fn test_profile_flow_collects_answers() {
        let (_, effects) = run(Flow::Profile, &["EN", " lt ", "Gydytojas"]);
        assert_eq!(
            effects,
            vec![
                Effect::Prompt(Prompt::Language),
                Effect::Prompt(Prompt::Country),
                Effect::Prompt(Prompt::Level),
                Effect::SaveProfile(Profile {
                    language: "en".to_string(),
                    country: "lt".to_string(),
                    level: "gydytojas".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_quiz_topic_triggers_synthesis() {
        let (_, effects) = run(Flow::Quiz, &["  astma  "]);
        assert_eq!(
            effects.last(),
            Some(&Effect::Synthesize(Synthesis::Quiz {
                topic: "astma".to_string()
            }))
        );
    }

    #[test]
    fn test_mood_rejects_out_of_range_rating() {
        let (state, effects) = run(Flow::Mood, &["11", "zero"]);
        assert_eq!(state, DialogueState::AwaitingMoodRating);
        assert_eq!(effects.last(), Some(&Effect::Prompt(Prompt::InvalidScale)));

        let (state, effects) = run(Flow::Mood, &["11", "3", "8", "nothing"]);
        assert!(state.is_idle());
        assert!(effects.contains(&Effect::SaveMood {
            rating: 3,
            stress: 8,
            worry: "nothing".to_string()
        }));
        assert!(synthesizes(&effects));
    }

    #[test]
    fn test_reflection_and_plan_do_not_generate() {
        let (_, effects) = run(Flow::Reflect, &["a", "b", "c"]);
        assert!(!synthesizes(&effects));
        assert_eq!(
            effects.last(),
            Some(&Effect::SaveReflection {
                went_well: "a".to_string(),
                challenge: "b".to_string(),
                tomorrow: "c".to_string(),
            })
        );

        let (_, effects) = run(Flow::DailyPlan, &["anatomy;\n pharmacology ;;"]);
        assert!(!synthesizes(&effects));
        assert_eq!(
            effects.last(),
            Some(&Effect::SaveDailyPlan(vec![
                "anatomy".to_string(),
                "pharmacology".to_string()
            ]))
        );
    }

    #[test]
    fn test_calm_menu() {
        let (state, effects) = run(Flow::Calm, &["9"]);
        assert_eq!(state, DialogueState::AwaitingCalmChoice);
        assert_eq!(effects.last(), Some(&Effect::Prompt(Prompt::InvalidCalmChoice)));

        let (_, effects) = run(Flow::Calm, &["1"]);
        assert_eq!(effects.last(), Some(&Effect::Calm(CalmExercise::Breathing)));
    }

    #[test]
    fn test_blank_input_reprompts() {
        let (state, effects) = run(Flow::Quiz, &["   "]);
        assert_eq!(state, DialogueState::AwaitingQuizTopic);
        assert_eq!(effects.last(), Some(&Effect::Prompt(Prompt::EmptyInput)));

        let (state, _) = run(Flow::DailyPlan, &[";;"]);
        assert_eq!(state, DialogueState::AwaitingGoals);
    }

    #[test]
    fn test_entering_a_flow_abandons_the_previous_one() {
        let (state, _) = run(Flow::Reflect, &["went well"]);
        assert_eq!(state.flow(), Some(Flow::Reflect));

        let (state, effects) = enter(Flow::Quiz);
        assert_eq!(state, DialogueState::AwaitingQuizTopic);
        assert_eq!(effects, vec![Effect::Prompt(Prompt::QuizTopic)]);
    }

    #[test]
    fn test_idle_ignores_text() {
        let (state, effects) = transition(DialogueState::Idle, text("hello"));
        assert!(state.is_idle());
        assert!(effects.is_empty());
    }
}
