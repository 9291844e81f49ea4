use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use crate::service::dialogue::{
    self,
    model::{Effect, FlowInput, Synthesis},
};
use crate::service::{
    resolve_language, DailyPlan, Feature, Language, LastQuiz, MoodEntry, Reflection, UserRecord,
};

use super::{
    intent::{classify, Intent},
    outcome::AssistError,
    prompts, Engine, Reply,
};

/// One call to the text generator and what to do with its answer.
struct Generation {
    system_prompt: &'static str,
    user_prompt: String,
    image: Option<Vec<u8>>,
    language: Language,
    question: String,
    feature: Option<&'static str>,
    quiz_topic: Option<String>,
}

type UserGuard<'a> = MutexGuard<'a, UserRecord>;

impl Engine {
    pub(super) async fn handle_text(&self, user_id: u64, text: String) -> Vec<Reply> {
        let record = self.services.users.record(user_id);
        let user = record.lock().await;

        if user.dialogue.is_idle() {
            if text.is_empty() {
                return Vec::new();
            }
            self.route(user_id, &record, user, text).await
        } else {
            self.advance_flow(user_id, &record, user, FlowInput::Text(text)).await
        }
    }

    /// Idle free text: keyword rules, then DOI, then an open question.
    async fn route(&self, user_id: u64, record: &Arc<Mutex<UserRecord>>, mut user: UserGuard<'_>, text: String) -> Vec<Reply> {
        let intent = classify(&text);

        if matches!(intent, Intent::Flashcards { .. }) {
            if let Err(e) = self.entitle(user_id, &user, Feature::Flashcards) {
                return vec![e.into()];
            }
        }
        if let Err(e) = self.charge(user_id, &mut user) {
            return vec![e.into()];
        }

        let mut replies = Vec::new();
        if user.profile.is_none() && !user.session.profile_prompted {
            user.session.profile_prompted = true;
            replies.push(Reply::text(t!("hints.profile")));
        }

        let system_prompt = match intent {
            Intent::FreeForm { .. } => prompts::system_prompt(user.session.support_mode),
            _ => prompts::SYSTEM_PROMPT,
        };
        let job = Generation {
            system_prompt,
            user_prompt: prompts::intent_prompt(&intent, user.profile_level()),
            image: None,
            language: resolve_language(user.profile_language(), &text),
            question: text,
            feature: intent.feature(),
            quiz_topic: match &intent {
                Intent::Quiz { topic } => Some(topic.clone()),
                _ => None,
            },
        };

        match self.run_generation(user_id, record, user, job).await {
            Ok(Some(answer)) => replies.push(Reply::Text(answer)),
            Ok(None) => {}
            Err(e) => replies.push(e.into()),
        }
        replies
    }

    pub(super) async fn advance_flow(
        &self,
        user_id: u64,
        record: &Arc<Mutex<UserRecord>>,
        mut user: UserGuard<'_>,
        input: FlowInput,
    ) -> Vec<Reply> {
        let state = std::mem::take(&mut user.dialogue);
        let (next, effects) = dialogue::transition(state, input);
        user.dialogue = next;

        let mut replies = Vec::new();
        let mut synthesis = None;

        for effect in effects {
            match effect {
                Effect::Prompt(prompt) => replies.push(prompts::prompt_reply(prompt)),
                Effect::SaveProfile(profile) => {
                    info!("User {} saved profile", user_id);
                    replies.push(Reply::text(t!(
                        "flows.profile.saved",
                        language = &profile.language,
                        country = &profile.country,
                        level = &profile.level
                    )));
                    user.profile = Some(profile);
                }
                Effect::SaveMood { rating, stress, worry } => user.moods.push(MoodEntry {
                    rating,
                    stress,
                    worry,
                    recorded_at: Utc::now(),
                }),
                Effect::SaveReflection {
                    went_well,
                    challenge,
                    tomorrow,
                } => {
                    user.reflections.push(Reflection {
                        went_well,
                        challenge,
                        tomorrow,
                        recorded_at: Utc::now(),
                    });
                    replies.push(Reply::text(t!("flows.reflect.saved")));
                }
                Effect::SaveDailyPlan(goals) => {
                    let list = goals
                        .iter()
                        .enumerate()
                        .map(|(i, goal)| format!("{}. {}", i + 1, goal))
                        .collect::<Vec<_>>()
                        .join("\n");
                    replies.push(Reply::text(t!("flows.daily_plan.saved", goals = list)));
                    user.save_plan(DailyPlan {
                        date: Utc::now().date_naive(),
                        goals,
                    });
                }
                Effect::Calm(exercise) => replies.push(Reply::Text(prompts::calm_text(exercise))),
                Effect::Synthesize(s) => synthesis = Some(s),
                Effect::Cancelled => replies.push(Reply::text(t!("commands.cancel"))),
            }
        }

        if let Some(synthesis) = synthesis {
            match self.synthesize(user_id, record, user, synthesis).await {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => {}
                Err(e) => replies.push(e.into()),
            }
        }

        replies
    }

    /// Terminal step of a generating flow. The flow is already back to idle here,
    /// so a rejected quota ends it.
    async fn synthesize(
        &self,
        user_id: u64,
        record: &Arc<Mutex<UserRecord>>,
        mut user: UserGuard<'_>,
        synthesis: Synthesis,
    ) -> Result<Option<Reply>, AssistError> {
        let (system_prompt, user_prompt) = match &synthesis {
            Synthesis::Quiz { topic } => (prompts::SYSTEM_PROMPT, prompts::quiz_prompt(topic, user.profile_level())),
            Synthesis::GradeAnswers { answers } => {
                let quiz = user
                    .session
                    .last_quiz
                    .as_ref()
                    .ok_or(AssistError::NoPriorContext { missing: "quiz" })?;
                (prompts::SYSTEM_PROMPT, prompts::grade_prompt(quiz, answers))
            }
            Synthesis::Flashcards { topic } => (prompts::SYSTEM_PROMPT, prompts::flashcards_prompt(topic)),
            Synthesis::SimPatient { symptoms } => (prompts::SYSTEM_PROMPT, prompts::simpatient_prompt(symptoms)),
            Synthesis::MoodSupport { rating, stress, worry } => (
                prompts::SUPPORT_SYSTEM_PROMPT,
                prompts::mood_prompt(*rating, *stress, worry),
            ),
        };

        self.charge(user_id, &mut user)?;

        let (question, feature) = prompts::synthesis_label(&synthesis);
        let job = Generation {
            system_prompt,
            user_prompt,
            image: None,
            language: resolve_language(user.profile_language(), question),
            question: question.to_string(),
            feature: Some(feature),
            quiz_topic: match &synthesis {
                Synthesis::Quiz { topic } => Some(topic.clone()),
                _ => None,
            },
        };

        let answer = self.run_generation(user_id, record, user, job).await?;
        Ok(answer.map(|answer| Reply::Text(prompts::synthesis_reply(&synthesis, &answer))))
    }

    pub(super) async fn handle_photo(&self, user_id: u64, caption: Option<String>, photo: Vec<u8>) -> Vec<Reply> {
        let record = self.services.users.record(user_id);
        let mut user = record.lock().await;

        if let Err(e) = self.entitle(user_id, &user, Feature::ImageAnalysis) {
            return vec![e.into()];
        }
        if let Err(e) = self.charge(user_id, &mut user) {
            return vec![e.into()];
        }

        let language = match &caption {
            Some(caption) => resolve_language(user.profile_language(), caption),
            None => user
                .profile_language()
                .and_then(|code| code.parse::<Language>().ok())
                .unwrap_or_default(),
        };
        let job = Generation {
            system_prompt: prompts::IMAGE_SYSTEM_PROMPT,
            user_prompt: caption.clone().unwrap_or_else(|| prompts::IMAGE_PROMPT.to_string()),
            image: Some(photo),
            language,
            question: caption.unwrap_or_else(|| "[photo]".to_string()),
            feature: Some("image"),
            quiz_topic: None,
        };

        match self.run_generation(user_id, &record, user, job).await {
            Ok(Some(answer)) => vec![Reply::Text(answer)],
            Ok(None) => Vec::new(),
            Err(e) => vec![e.into()],
        }
    }

    /// Releases the user lock for the generator call and re-takes it to store the
    /// answer. Returns `Ok(None)` when the user cancelled or reset meanwhile.
    async fn run_generation(
        &self,
        user_id: u64,
        record: &Arc<Mutex<UserRecord>>,
        user: UserGuard<'_>,
        job: Generation,
    ) -> Result<Option<String>, AssistError> {
        let epoch = user.cancel_epoch;
        drop(user);

        let generator = &self.services.generator;
        let result = match &job.image {
            Some(image) => {
                generator
                    .analyze_image(job.system_prompt, &job.user_prompt, image, job.language)
                    .await
            }
            None => generator.generate(job.system_prompt, &job.user_prompt, job.language).await,
        };

        let answer = result.map_err(|e| {
            if e.is_retryable() {
                warn!("Transient generation failure for user {}: {}", user_id, e);
            } else {
                error!("Generation failed for user {}: {}", user_id, e);
            }
            AssistError::Generation(e)
        })?;

        {
            let mut user = record.lock().await;
            if user.cancel_epoch != epoch {
                info!("Discarding generated answer for user {} after cancel", user_id);
                return Ok(None);
            }
            user.session.last_reply = Some(answer.clone());
            if let Some(topic) = job.quiz_topic {
                user.session.last_quiz = Some(LastQuiz {
                    topic,
                    content: answer.clone(),
                });
            }
        }

        self.services
            .interactions
            .record(user_id, &job.question, &answer, job.feature);

        Ok(Some(answer))
    }
}
