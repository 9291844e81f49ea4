mod keyboard;
mod message;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    types::Update,
};

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message().endpoint(message::handle_message)
}
