use std::time::Duration;

use chrono::Utc;

use crate::command::Command;
use crate::service::dialogue::{
    self,
    model::{Effect, Flow, FlowInput},
};
use crate::service::render::{DocumentKind, RenderError};
use crate::service::{Feature, HistoryEntry, InteractionRecord, MetricPoint, MoodEntry, Tier, UserRecord};
use crate::utils::seconds_to_human_readable;

use super::{outcome::AssistError, prompts, Engine, Reply};

const MAX_REMINDER_MINUTES: u64 = 24 * 60;
const RECENT_EVENTS: usize = 10;

impl Engine {
    pub(super) async fn handle_command(&self, user_id: u64, command: Command) -> Vec<Reply> {
        match self.run_command(user_id, command).await {
            Ok(replies) => replies,
            Err(e) => vec![e.into()],
        }
    }

    async fn run_command(&self, user_id: u64, command: Command) -> Result<Vec<Reply>, AssistError> {
        let record = self.services.users.record(user_id);
        let mut user = record.lock().await;

        let replies = match command {
            Command::Start => vec![
                Reply::text(t!("commands.start.greeting")),
                Reply::text(t!("commands.start.commands")),
            ],
            Command::Method => vec![Reply::text(t!("commands.method"))],

            Command::Profile => start_flow(&mut user, Flow::Profile),
            Command::Quiz => start_flow(&mut user, Flow::Quiz),
            Command::Answer => {
                if user.session.last_quiz.is_none() {
                    return Err(AssistError::NoPriorContext { missing: "quiz" });
                }
                start_flow(&mut user, Flow::Answer)
            }
            Command::Flashcards => {
                self.entitle(user_id, &user, Feature::Flashcards)?;
                start_flow(&mut user, Flow::Flashcards)
            }
            Command::SimPatient => start_flow(&mut user, Flow::SimPatient),
            Command::Mood => start_flow(&mut user, Flow::Mood),
            Command::Reflect => start_flow(&mut user, Flow::Reflect),
            Command::Calm => start_flow(&mut user, Flow::Calm),
            Command::DailyPlan => start_flow(&mut user, Flow::DailyPlan),

            Command::Cancel => {
                let state = std::mem::take(&mut user.dialogue);
                let (next, effects) = dialogue::transition(state, FlowInput::Cancel);
                user.dialogue = next;
                user.cancel_epoch += 1;
                effects
                    .into_iter()
                    .filter(|effect| matches!(effect, Effect::Cancelled))
                    .map(|_| Reply::text(t!("commands.cancel")))
                    .collect()
            }
            Command::ResetContext => {
                user.reset_context();
                info!("User {} reset their context", user_id);
                vec![Reply::text(t!("commands.resetcontext"))]
            }

            Command::Review => {
                let quiz = user
                    .session
                    .last_quiz
                    .as_ref()
                    .ok_or(AssistError::NoPriorContext { missing: "quiz" })?;
                vec![Reply::text(t!(
                    "commands.review",
                    topic = &quiz.topic,
                    content = &quiz.content
                ))]
            }
            Command::ExportPdf => {
                self.entitle(user_id, &user, Feature::Pdf)?;
                let text = user
                    .session
                    .last_reply
                    .clone()
                    .ok_or(AssistError::NoPriorContext { missing: "reply" })?;
                drop(user);
                vec![self.render_document("reply", &text, DocumentKind::Pdf)?]
            }
            Command::ExportTest => {
                self.entitle(user_id, &user, Feature::Pdf)?;
                let quiz = user
                    .session
                    .last_quiz
                    .clone()
                    .ok_or(AssistError::NoPriorContext { missing: "quiz" })?;
                drop(user);
                let text = t!(
                    "documents.quiz",
                    topic = &quiz.topic,
                    content = &quiz.content
                );
                vec![self.render_document("testas", &text, DocumentKind::Pdf)?]
            }
            Command::ExportHistory(format) => {
                drop(user);
                let kind = format
                    .parse::<DocumentKind>()
                    .map_err(|_| AssistError::Usage("export_history"))?;
                let history = self.services.interactions.history(user_id);
                if history.is_empty() {
                    return Err(AssistError::NoPriorContext { missing: "history" });
                }
                let text = format_history(&history, kind)?;
                let mut replies = vec![self.render_document("history", &text, kind)?];

                let total = self.services.interactions.total(user_id);
                if total > history.len() as u64 {
                    replies.push(Reply::text(t!(
                        "commands.export_history_truncated",
                        shown = history.len(),
                        total = total
                    )));
                }
                replies
            }

            Command::Guideline => {
                drop(user);
                vec![self.guideline().await]
            }

            Command::Progress => vec![Reply::text(t!("commands.progress", count = user.progress_count))],
            Command::ProgressPdf => {
                self.entitle(user_id, &user, Feature::Pdf)?;
                let count = user.progress_count;
                drop(user);
                let text = t!("documents.progress", user_id = user_id, count = count);
                vec![self.render_document("progress", &text, DocumentKind::Pdf)?]
            }
            Command::SubscriptionStatus => vec![self.subscription_status(user_id, &user)],
            Command::Upgrade => vec![Reply::text(t!(
                "commands.upgrade",
                url = &self.settings.upgrade_url
            ))],

            Command::CreateRoom(name) => {
                self.entitle(user_id, &user, Feature::Rooms)?;
                let name = room_name(&name).ok_or(AssistError::Usage("create_room"))?;
                self.services.rooms.create(&name, user_id);
                info!("User {} created room {}", user_id, name);
                vec![Reply::text(t!("commands.rooms.created", room = &name))]
            }
            Command::JoinRoom(name) => {
                self.entitle(user_id, &user, Feature::Rooms)?;
                let name = room_name(&name).ok_or(AssistError::Usage("join_room"))?;
                if !self.services.rooms.join(&name, user_id) {
                    return Err(AssistError::RoomNotFound(name));
                }
                vec![Reply::text(t!("commands.rooms.joined", room = &name))]
            }
            Command::ListRooms => {
                self.entitle(user_id, &user, Feature::Rooms)?;
                let names = self.services.rooms.names();
                if names.is_empty() {
                    vec![Reply::text(t!("commands.rooms.none"))]
                } else {
                    let rooms = names
                        .iter()
                        .map(|name| {
                            let members = self.services.rooms.members(name).map_or(0, |m| m.len());
                            format!("- {} ({})", name, members)
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    vec![Reply::text(t!("commands.rooms.list", rooms = rooms))]
                }
            }

            Command::UpdateMetric(args) => {
                let (name, value) = parse_metric(&args).ok_or(AssistError::Usage("update_metric"))?;
                user.record_metric(
                    &name,
                    MetricPoint {
                        value,
                        recorded_at: Utc::now(),
                    },
                );
                vec![Reply::text(t!(
                    "commands.metrics.updated",
                    name = name.to_lowercase(),
                    value = value
                ))]
            }
            Command::MetricsProgress => vec![Reply::Text(metrics_summary(&user))],

            Command::Remind(args) => {
                let (minutes, text) = parse_reminder(&args).ok_or(AssistError::Usage("remind"))?;
                vec![
                    Reply::text(t!("commands.remind.scheduled", minutes = minutes)),
                    Reply::Delayed {
                        after: Duration::from_secs(minutes * 60),
                        text: t!("commands.remind.message", text = text).to_string(),
                    },
                ]
            }

            Command::MoodProgress => vec![Reply::Text(mood_summary(&user.moods))],
            Command::Panic => vec![Reply::text(t!("commands.panic"))],
            Command::Mode(mode) => match mode.trim().to_lowercase().as_str() {
                "" => {
                    let current = if user.session.support_mode { "support" } else { "study" };
                    vec![Reply::text(t!("commands.mode.current", mode = current))]
                }
                "study" => {
                    user.session.support_mode = false;
                    vec![Reply::text(t!("commands.mode.study"))]
                }
                "support" => {
                    user.session.support_mode = true;
                    vec![Reply::text(t!("commands.mode.support"))]
                }
                _ => return Err(AssistError::Usage("mode")),
            },

            Command::UsageLog => {
                drop(user);
                if !self.services.users.is_admin(user_id) {
                    return Ok(Vec::new());
                }
                vec![Reply::Text(self.usage_report())]
            }
            Command::SetTier(args) => {
                drop(user);
                if !self.services.users.is_admin(user_id) {
                    return Ok(Vec::new());
                }
                let (target, tier) = parse_tier_grant(&args).ok_or(AssistError::Usage("set_tier"))?;
                self.services.users.set_tier(target, tier).await;
                vec![Reply::text(t!(
                    "commands.set_tier",
                    user_id = target,
                    tier = tier.label()
                ))]
            }
        };

        Ok(replies)
    }

    /// Per-user interaction counts followed by the newest analytics events.
    fn usage_report(&self) -> String {
        let counts = self.services.interactions.counts_by_user();
        if counts.is_empty() {
            return t!("commands.usage_log.empty").to_string();
        }

        let counts = counts
            .iter()
            .map(|(id, count)| format!("{}: {}", id, count))
            .collect::<Vec<_>>()
            .join("\n");
        let events = self.services.interactions.recent_events();
        let events = events
            .iter()
            .rev()
            .take(RECENT_EVENTS)
            .map(|event| {
                format!(
                    "{} {} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M"),
                    event.user_id,
                    event.feature
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        t!(
            "commands.usage_log.report",
            users = self.services.users.known_users(),
            counts = counts,
            events = events
        )
        .to_string()
    }

    fn render_document(&self, stem: &str, text: &str, kind: DocumentKind) -> Result<Reply, AssistError> {
        let bytes = self.services.renderer.render(stem, text, kind).map_err(|e| {
            error!("Failed to render {} as {}: {}", stem, kind, e);
            AssistError::Render(e)
        })?;
        Ok(Reply::Document {
            filename: kind.file_name(stem),
            bytes,
        })
    }

    async fn guideline(&self) -> Reply {
        let url = &self.settings.guideline_feed_url;
        match self.services.feed.fetch_latest(url, self.settings.guideline_feed_items).await {
            Ok(entries) if entries.is_empty() => Reply::text(t!("commands.guideline.empty")),
            Ok(entries) => {
                let lines = entries
                    .iter()
                    .map(|entry| {
                        if entry.link.is_empty() {
                            format!("- {}", entry.title)
                        } else {
                            format!("- {}: {}", entry.title, entry.link)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Reply::text(t!("commands.guideline.list", items = lines))
            }
            Err(e) => {
                warn!("Failed to fetch guideline feed {}: {}", url, e);
                Reply::text(t!("commands.guideline.unavailable"))
            }
        }
    }

    fn subscription_status(&self, user_id: u64, user: &UserRecord) -> Reply {
        let is_admin = self.services.users.is_admin(user_id);
        let usage = self
            .services
            .ledger
            .usage_info(&user.usage, user.tier, is_admin, Utc::now());

        let plan = t!("commands.subscription.plan", tier = user.tier.label());
        let detail = match (usage.quota, usage.remaining) {
            (Some(quota), Some(remaining)) => t!(
                "commands.subscription.usage",
                used = usage.used,
                quota = quota,
                remaining = remaining,
                reset = seconds_to_human_readable(usage.reset_in_secs)
            ),
            _ => t!("commands.subscription.unlimited"),
        };
        Reply::Text(format!("{}\n{}", plan, detail))
    }
}

/// Replaces whatever dialogue was active with the first step of `flow`.
fn start_flow(user: &mut UserRecord, flow: Flow) -> Vec<Reply> {
    if let Some(previous) = user.dialogue.flow() {
        debug!("Abandoning {:?} for {:?}", previous, flow);
    }
    let (state, effects) = dialogue::enter(flow);
    user.dialogue = state;

    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Prompt(prompt) => Some(prompts::prompt_reply(prompt)),
            _ => None,
        })
        .collect()
}

fn room_name(raw: &str) -> Option<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

/// `Q:`/`A:` blocks for text and PDF, an array of `{q, a}` for JSON.
fn format_history(history: &[InteractionRecord], kind: DocumentKind) -> Result<String, AssistError> {
    match kind {
        DocumentKind::Json => {
            let entries: Vec<HistoryEntry> = history.iter().map(HistoryEntry::from).collect();
            Ok(serde_json::to_string(&entries).map_err(RenderError::from)?)
        }
        DocumentKind::Txt | DocumentKind::Pdf => Ok(history
            .iter()
            .map(|record| format!("Q: {}\nA: {}", record.question, record.answer))
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}

/// `"<name> <value>"`, where the name may contain spaces and the value may use a decimal comma.
fn parse_metric(args: &str) -> Option<(String, f64)> {
    let (name, value) = args.trim().rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    let value = value.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())?;
    (!name.is_empty()).then(|| (name.to_string(), value))
}

/// `"<minutes> <text>"` with minutes in `1..=1440`.
fn parse_reminder(args: &str) -> Option<(u64, String)> {
    let (minutes, text) = args.trim().split_once(char::is_whitespace)?;
    let minutes = minutes.parse::<u64>().ok().filter(|m| (1..=MAX_REMINDER_MINUTES).contains(m))?;
    let text = text.trim();
    (!text.is_empty()).then(|| (minutes, text.to_string()))
}

/// `"<user id> <tier>"`, the tier as a number or a name.
fn parse_tier_grant(args: &str) -> Option<(u64, Tier)> {
    let (user_id, tier) = args.trim().split_once(char::is_whitespace)?;
    Some((user_id.parse().ok()?, tier.trim().parse().ok()?))
}

fn metrics_summary(user: &UserRecord) -> String {
    if user.metrics.is_empty() {
        return t!("commands.metrics.none").to_string();
    }

    let lines = user
        .metrics
        .iter()
        .filter_map(|(name, points)| {
            let first = points.first()?;
            let last = points.last()?;
            Some(format!(
                "{}: {} → {} ({:+}, {})",
                name,
                first.value,
                last.value,
                last.value - first.value,
                points.len()
            ))
        })
        .collect::<Vec<_>>()
        .join("\n");
    t!("commands.metrics.summary", metrics = lines).to_string()
}

fn mood_summary(moods: &[MoodEntry]) -> String {
    let Some(last) = moods.last() else {
        return t!("commands.mood_progress.none").to_string();
    };

    let count = moods.len() as f64;
    let mood = moods.iter().map(|m| f64::from(m.rating)).sum::<f64>() / count;
    let stress = moods.iter().map(|m| f64::from(m.stress)).sum::<f64>() / count;

    t!(
        "commands.mood_progress.summary",
        count = moods.len(),
        mood = format!("{:.1}", mood),
        stress = format!("{:.1}", stress),
        last_mood = last.rating,
        last_stress = last.stress,
        last_date = last.recorded_at.format("%Y-%m-%d")
    )
    .to_string()
}
