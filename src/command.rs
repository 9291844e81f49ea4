use teloxide::{
    macros::BotCommands,
    prelude::Requester,
    types::BotCommand,
    Bot,
};

use crate::error::HandlerResult;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    Start,
    Profile,
    Quiz,
    Answer,
    Review,
    ExportPdf,
    ExportTest,
    ExportHistory(String),
    Flashcards,
    Method,
    Guideline,
    #[command(rename = "simpatient")]
    SimPatient,
    Progress,
    ProgressPdf,
    SubscriptionStatus,
    Upgrade,
    CreateRoom(String),
    JoinRoom(String),
    ListRooms,
    #[command(rename = "resetcontext")]
    ResetContext,
    UpdateMetric(String),
    MetricsProgress,
    Remind(String),
    Mood,
    Reflect,
    Calm,
    DailyPlan,
    MoodProgress,
    Panic,
    Mode(String),
    UsageLog,
    SetTier(String),
    Cancel,
}

impl Command {
    pub fn user_commands() -> Vec<BotCommand> {
        [
            "start",
            "profile",
            "quiz",
            "answer",
            "review",
            "flashcards",
            "simpatient",
            "method",
            "guideline",
            "export_pdf",
            "export_test",
            "export_history",
            "progress",
            "progress_pdf",
            "subscription_status",
            "upgrade",
            "create_room",
            "join_room",
            "list_rooms",
            "update_metric",
            "metrics_progress",
            "remind",
            "mood",
            "mood_progress",
            "reflect",
            "calm",
            "daily_plan",
            "panic",
            "mode",
            "resetcontext",
            "cancel",
        ]
        .into_iter()
        .map(|name| BotCommand::new(name, t!(format!("commands.description.{}", name))))
        .collect()
    }
}

pub async fn setup_user_commands(bot: &Bot) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(Command::user_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use teloxide::utils::command::BotCommands;

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "medic_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/simpatient", "medic_bot").unwrap(), Command::SimPatient);
        assert_eq!(Command::parse("/resetcontext", "medic_bot").unwrap(), Command::ResetContext);
        assert_eq!(
            Command::parse("/export_history json", "medic_bot").unwrap(),
            Command::ExportHistory("json".into())
        );
        assert_eq!(
            Command::parse("/create_room study group", "medic_bot").unwrap(),
            Command::CreateRoom("study group".into())
        );
        assert_eq!(
            Command::parse("/subscription_status@medic_bot", "medic_bot").unwrap(),
            Command::SubscriptionStatus
        );
    }

    #[test]
    fn test_unknown_and_foreign_commands() {
        assert!(Command::parse("/teleport", "medic_bot").is_err());
        assert!(Command::parse("/start@other_bot", "medic_bot").is_err());
    }

    #[test]
    fn test_user_commands_cover_menu() {
        let commands = Command::user_commands();
        assert!(commands.iter().any(|c| c.command == "export_history"));
        assert!(!commands.iter().any(|c| c.command == "usage_log"));
        assert!(!commands.iter().any(|c| c.command == "set_tier"));
    }
}
