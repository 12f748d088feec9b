mod types;

mod bullet;
mod code;
mod continue_writing;
mod divider;
mod h1;
mod h2;
mod h3;
mod image;
mod numbered;
mod quote;
mod text;
mod todo;
mod toggle;

pub use types::*;

pub fn all_commands() -> Vec<SlashCommand> {
    vec![
        text::CMD,
        h1::CMD,
        h2::CMD,
        h3::CMD,
        bullet::CMD,
        numbered::CMD,
        todo::CMD,
        toggle::CMD,
        quote::CMD,
        code::CMD,
        divider::CMD,
        image::CMD,
        continue_writing::CMD,
    ]
}

/// Commands whose name or title contains `query`, case-insensitively.
pub fn filter(query: &str) -> Vec<SlashCommand> {
    let q = query.to_lowercase();
    all_commands()
        .into_iter()
        .filter(|c| c.name.contains(&q) || c.title.to_lowercase().contains(&q))
        .collect()
}

/// Exact lookup of a typed command token such as `h2` or `todo`.
pub fn resolve(token: &str) -> Option<SlashCommand> {
    let token = token.trim().trim_start_matches('/').to_lowercase();
    all_commands().into_iter().find(|c| c.name == token)
}

/// Detects if the user just typed '/' at a position that should open the menu.
/// `cursor` is a char index just past the typed character.
///
/// Triggers at the start of the block or after whitespace, never mid-word
/// (e.g. "http:/").
pub fn detect_trigger(text: &str, cursor: usize) -> Option<usize> {
    if cursor == 0 {
        return None;
    }
    let chars: Vec<char> = text.chars().collect();
    let slash_pos = cursor - 1;
    if chars.get(slash_pos) != Some(&'/') {
        return None;
    }
    if slash_pos == 0 || chars[slash_pos - 1].is_whitespace() {
        Some(slash_pos)
    } else {
        None
    }
}

impl SlashMenuState {
    pub fn open(slash_pos: usize) -> Self {
        Self {
            query: String::new(),
            commands: all_commands(),
            selected: 0,
            slash_pos,
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.commands = filter(query);
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if !self.commands.is_empty() {
            self.selected = (self.selected + 1) % self.commands.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.commands.is_empty() {
            self.selected = (self.selected + self.commands.len() - 1) % self.commands.len();
        }
    }

    pub fn current(&self) -> Option<&SlashCommand> {
        self.commands.get(self.selected)
    }
}
