use serde::{Deserialize, Serialize};

use crate::service::user::Profile;

/// The guided dialogues a user can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    Profile,
    Quiz,
    Answer,
    Flashcards,
    SimPatient,
    Mood,
    Reflect,
    Calm,
    DailyPlan,
}

/// Per-user dialogue position. Answers collected so far travel inside the variant,
/// so leaving a state drops them.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
pub enum DialogueState {
    #[default]
    Idle,
    // Profile
    AwaitingLanguage,
    AwaitingCountry {
        language: String,
    },
    AwaitingLevel {
        language: String,
        country: String,
    },
    // Study
    AwaitingQuizTopic,
    AwaitingAnswers,
    AwaitingFlashcardsTopic,
    AwaitingSymptoms,
    // Wellbeing
    AwaitingMoodRating,
    AwaitingStress {
        rating: u8,
    },
    AwaitingWorry {
        rating: u8,
        stress: u8,
    },
    AwaitingWentWell,
    AwaitingChallenge {
        went_well: String,
    },
    AwaitingTomorrow {
        went_well: String,
        challenge: String,
    },
    AwaitingCalmChoice,
    AwaitingGoals,
}

impl DialogueState {
    pub fn flow(&self) -> Option<Flow> {
        match self {
            DialogueState::Idle => None,
            DialogueState::AwaitingLanguage
            | DialogueState::AwaitingCountry { .. }
            | DialogueState::AwaitingLevel { .. } => Some(Flow::Profile),
            DialogueState::AwaitingQuizTopic => Some(Flow::Quiz),
            DialogueState::AwaitingAnswers => Some(Flow::Answer),
            DialogueState::AwaitingFlashcardsTopic => Some(Flow::Flashcards),
            DialogueState::AwaitingSymptoms => Some(Flow::SimPatient),
            DialogueState::AwaitingMoodRating
            | DialogueState::AwaitingStress { .. }
            | DialogueState::AwaitingWorry { .. } => Some(Flow::Mood),
            DialogueState::AwaitingWentWell
            | DialogueState::AwaitingChallenge { .. }
            | DialogueState::AwaitingTomorrow { .. } => Some(Flow::Reflect),
            DialogueState::AwaitingCalmChoice => Some(Flow::Calm),
            DialogueState::AwaitingGoals => Some(Flow::DailyPlan),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlowInput {
    Text(String),
    Cancel,
}

/// What a dialogue step asks the user for next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Language,
    Country,
    Level,
    QuizTopic,
    Answers,
    FlashcardsTopic,
    Symptoms,
    MoodRating,
    Stress,
    Worry,
    WentWell,
    Challenge,
    Tomorrow,
    CalmMenu,
    Goals,
    InvalidScale,
    InvalidCalmChoice,
    EmptyInput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalmExercise {
    Breathing,
    Grounding,
    MuscleRelaxation,
}

impl CalmExercise {
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(CalmExercise::Breathing),
            "2" => Some(CalmExercise::Grounding),
            "3" => Some(CalmExercise::MuscleRelaxation),
            _ => None,
        }
    }
}

/// A terminal step that needs the text generator.
#[derive(Clone, Debug, PartialEq)]
pub enum Synthesis {
    Quiz { topic: String },
    GradeAnswers { answers: String },
    Flashcards { topic: String },
    SimPatient { symptoms: String },
    MoodSupport { rating: u8, stress: u8, worry: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Prompt(Prompt),
    SaveProfile(Profile),
    SaveMood { rating: u8, stress: u8, worry: String },
    SaveReflection {
        went_well: String,
        challenge: String,
        tomorrow: String,
    },
    SaveDailyPlan(Vec<String>),
    Calm(CalmExercise),
    Synthesize(Synthesis),
    Cancelled,
}
