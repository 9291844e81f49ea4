use teloxide::dptree::deps;
use teloxide_tests::{MockBot, MockMessageText};

use crate::bot::BotService;
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::test::{test_config, test_engine};

fn state() -> AppState {
    AppState::with_engine(test_config(&[]), test_engine("").engine)
}

#[tokio::test]
async fn test_start_command() {
    let mock_message = MockMessageText::new().text("/start");
    let mut bot = MockBot::new(mock_message, get_handler());
    bot.dependencies(deps![state()]);

    bot.dispatch().await;

    let responses = bot.get_responses();
    assert_eq!(responses.sent_messages.len(), 2);

    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some(t!("commands.start.commands").as_ref()));
}

#[tokio::test]
async fn test_unknown_command() {
    let mock_message = MockMessageText::new().text("/teleport");
    let mut bot = MockBot::new(mock_message, get_handler());
    bot.dependencies(deps![state()]);

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some(t!("commands.unknown_command").as_ref()));
}

#[tokio::test]
async fn test_question_is_answered() {
    let mock_message = MockMessageText::new().text("Kas yra astma?");
    let mut bot = MockBot::new(mock_message, get_handler());
    bot.dependencies(deps![state()]);

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert_eq!(message.text(), Some("answer #1"));
}

#[tokio::test]
async fn test_profile_offers_keyboard() {
    let mock_message = MockMessageText::new().text("/profile");
    let mut bot = MockBot::new(mock_message, get_handler());
    bot.dependencies(deps![state()]);

    bot.dispatch().await;

    let responses = bot.get_responses();
    let sent = responses.sent_messages_text.last().expect("No sent messages were detected!");
    assert_eq!(sent.message.text(), Some(t!("flows.profile.language").as_ref()));
    assert!(sent.bot_request.reply_markup.is_some());
}

#[test]
fn test_bot_service_builds_telegram_client() {
    let service = BotService::new(state()).expect("bot service should build");
    assert_eq!(service.bot.token(), "test-token");
}
