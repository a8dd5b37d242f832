use colored::Colorize;
use indice::api::{CmdMessage, MessageLevel};
use indice::config::IndiceConfig;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_outline(outline: &str) {
    let trimmed = outline.trim_matches('\n');
    if !trimmed.is_empty() {
        println!("{}", trimmed);
    }
}

pub(super) fn print_config(config: &IndiceConfig) {
    print!("{}", render_config(config));
}

fn render_config(config: &IndiceConfig) -> String {
    let mut output = String::new();
    for key in IndiceConfig::KEYS {
        let value = config.get(key).unwrap_or_default();
        output.push_str(&format!("{} = {}\n", key, value));
    }
    output
}
