use crate::service::dialogue::model::{CalmExercise, Prompt, Synthesis};
use crate::service::LastQuiz;

use super::event::Reply;
use super::intent::Intent;

pub const SYSTEM_PROMPT: &str = "\n⚠️ Šis DI skirtas tik mokymuisi. \
Tu esi ‘Medic Assistant’ – aiškini laboratorinius tyrimus, simptomus, diagnostikos algoritmus; \
visi atsakymai turi būti pagrįsti tik recenzuotais medicinos šaltiniais: \
PubMed, UpToDate, Cochrane, ECDC gairėmis ir SAM.lt rekomendacijomis.";

pub const SUPPORT_SYSTEM_PROMPT: &str = "Tu esi empatiškas ir ramus pagalbininkas medicinos studentams. \
Išklausyk, patvirtink jausmus ir pasiūlyk trumpus, praktiškus savipagalbos žingsnius. \
Nediagnozuok ir, jei kyla pavojus, ragink kreiptis pagalbos telefonu 112.";

pub const IMAGE_SYSTEM_PROMPT: &str = "Analizuok medicininę nuotrauką.";
pub const IMAGE_PROMPT: &str = "Prašau išanalizuoti nuotrauką.";

const DEFAULT_LEVEL: &str = "studentas";

pub fn system_prompt(support_mode: bool) -> &'static str {
    if support_mode {
        SUPPORT_SYSTEM_PROMPT
    } else {
        SYSTEM_PROMPT
    }
}

pub fn quiz_prompt(topic: &str, level: Option<&str>) -> String {
    format!(
        "Sukurk 3 pasirenkamo atsakymo klausimus ({} lygiui) apie: {}. \
         Formatuok su pažymėtais atsakymais A), B), C). Prie teisingo atsakymo pridėk ✅.",
        level.unwrap_or(DEFAULT_LEVEL),
        topic
    )
}

pub fn flashcards_prompt(topic: &str) -> String {
    format!("Sukurk 5 flashcards tema: {}, klausimas ir trumpas atsakymas.", topic)
}

pub fn notes_prompt(topic: &str) -> String {
    format!(
        "Sukurk glaustą, aiškų medicininį konspektą studentui apie {}, \
         naudodamasis PubMed, Cochrane ir UpToDate duomenimis. Struktūruok punktuose.",
        topic
    )
}

pub fn literature_prompt(reference: &str) -> String {
    format!(
        "Remiantis straipsniu (DOI arba pavadinimu: {}), \
         pateik mokslinę santrauką, klinikinę reikšmę ir kontekstą. Naudok tik recenzuotus šaltinius.",
        reference
    )
}

pub fn grade_prompt(quiz: &LastQuiz, answers: &str) -> String {
    format!(
        "Tekstas su ✅ teisingais atsakymais: {} Vartotojo atsakymai: {}. Įvertink ir paaiškink.",
        quiz.content, answers
    )
}

pub fn simpatient_prompt(symptoms: &str) -> String {
    format!(
        "Remdamasis simptomais: {}, sukurk klinikinį atvejį su anamneze, tyrimais, diagnozę.",
        symptoms
    )
}

pub fn mood_prompt(rating: u8, stress: u8, worry: &str) -> String {
    format!(
        "Studento nuotaika {}/10, streso lygis {}/10. Jį neramina: {}. \
         Atsakyk palaikančiai, trumpai ir pasiūlyk vieną konkretų žingsnį šiandienai.",
        rating, stress, worry
    )
}

/// User prompt for idle free text.
pub fn intent_prompt(intent: &Intent, level: Option<&str>) -> String {
    match intent {
        Intent::Quiz { topic } => quiz_prompt(topic, level),
        Intent::Flashcards { topic } => flashcards_prompt(topic),
        Intent::Notes { topic } => notes_prompt(topic),
        Intent::Literature { reference } => literature_prompt(reference),
        Intent::FreeForm { text } => text.clone(),
    }
}

/// Logged question and interaction feature for a dialogue synthesis.
pub fn synthesis_label(synthesis: &Synthesis) -> (&str, &'static str) {
    match synthesis {
        Synthesis::Quiz { topic } => (topic, "quiz"),
        Synthesis::GradeAnswers { answers } => (answers, "answer"),
        Synthesis::Flashcards { topic } => (topic, "flashcards"),
        Synthesis::SimPatient { symptoms } => (symptoms, "simpatient"),
        Synthesis::MoodSupport { worry, .. } => (worry, "mood"),
    }
}

pub fn synthesis_reply(synthesis: &Synthesis, result: &str) -> String {
    match synthesis {
        Synthesis::Quiz { topic } => t!("flows.quiz.result", topic = topic, content = result).to_string(),
        Synthesis::GradeAnswers { .. } => t!("flows.answer.result", content = result).to_string(),
        Synthesis::Flashcards { .. } => t!("flows.flashcards.result", content = result).to_string(),
        Synthesis::SimPatient { .. } => t!("flows.simpatient.result", content = result).to_string(),
        Synthesis::MoodSupport { .. } => t!("flows.mood.result", content = result).to_string(),
    }
}

fn choices(text: impl Into<String>, rows: &[&[&str]]) -> Reply {
    Reply::Choices {
        text: text.into(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

pub fn prompt_reply(prompt: Prompt) -> Reply {
    match prompt {
        Prompt::Language => choices(t!("flows.profile.language"), &[&["lt", "en"], &["ru", "pl"]]),
        Prompt::Country => choices(t!("flows.profile.country"), &[&["lt", "uk"], &["us", "de"]]),
        Prompt::Level => choices(
            t!("flows.profile.level"),
            &[&["studentas", "gydytojas", "mokslininkas"]],
        ),
        Prompt::QuizTopic => Reply::text(t!("flows.quiz.topic")),
        Prompt::Answers => Reply::text(t!("flows.answer.prompt")),
        Prompt::FlashcardsTopic => Reply::text(t!("flows.flashcards.topic")),
        Prompt::Symptoms => Reply::text(t!("flows.simpatient.symptoms")),
        Prompt::MoodRating => Reply::text(t!("flows.mood.rating")),
        Prompt::Stress => Reply::text(t!("flows.mood.stress")),
        Prompt::Worry => Reply::text(t!("flows.mood.worry")),
        Prompt::WentWell => Reply::text(t!("flows.reflect.went_well")),
        Prompt::Challenge => Reply::text(t!("flows.reflect.challenge")),
        Prompt::Tomorrow => Reply::text(t!("flows.reflect.tomorrow")),
        Prompt::CalmMenu => choices(t!("flows.calm.menu"), &[&["1", "2", "3"]]),
        Prompt::Goals => Reply::text(t!("flows.daily_plan.goals")),
        Prompt::InvalidScale => Reply::text(t!("flows.invalid_scale")),
        Prompt::InvalidCalmChoice => choices(t!("flows.calm.invalid"), &[&["1", "2", "3"]]),
        Prompt::EmptyInput => Reply::text(t!("flows.empty_input")),
    }
}

pub fn calm_text(exercise: CalmExercise) -> String {
    match exercise {
        CalmExercise::Breathing => t!("flows.calm.breathing").to_string(),
        CalmExercise::Grounding => t!("flows.calm.grounding").to_string(),
        CalmExercise::MuscleRelaxation => t!("flows.calm.muscle_relaxation").to_string(),
    }
}
