use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// One-time reply keyboard for a dialogue step with fixed answers.
pub fn get_choices_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>()),
    )
    .one_time_keyboard()
    .resize_keyboard()
}
