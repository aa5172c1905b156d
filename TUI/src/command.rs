use crate::action::Action;
use crate::theme::Theme;

pub struct CommandParser;

impl CommandParser {
    pub fn parse(input: &str) -> Result<Action, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Err("Not a command".to_string());
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let args = args.trim();

        match cmd {
            "/help" => Ok(Action::Help),
            "/new" => Ok(Action::NewChat),
            "/delete" => Ok(Action::DeleteChat),
            "/clear" => Ok(Action::ClearChat),
            "/export" => Ok(Action::ExportChat),
            "/sort" => Ok(Action::SortChats),
            "/search" => Ok(Action::Search {
                query: args.to_string(),
            }),
            "/theme" => {
                if args.is_empty() {
                    Ok(Action::Theme { theme: None })
                } else {
                    Theme::parse(args)
                        .map(|t| Action::Theme { theme: Some(t) })
                        .ok_or_else(|| format!("Unknown theme: {}. Use dark, light or auto.", args))
                }
            }
            "/copy" => Self::index(args).map(|index| Action::Copy { index }),
            "/like" => Self::index(args).map(|index| Action::Like { index }),
            "/dislike" => Self::index(args).map(|index| Action::Dislike { index }),
            "/more" => Self::index(args).map(|index| Action::More { index }),
            "/mute" => Ok(Action::Mute),
            "/archive" => Ok(Action::Archive),
            "/read" => Ok(Action::MarkAllRead),
            "/notify" => Ok(Action::EnableNotifications),
            "/voice" => Ok(Action::ToggleVoice),
            "/settings" => Ok(Action::Settings),
            "/quit" => Ok(Action::Quit),
            _ => Err(format!("Unknown command: {}. Type /help for available commands.", cmd)),
        }
    }

    fn index(args: &str) -> Result<Option<usize>, String> {
        if args.is_empty() {
            return Ok(None);
        }
        match args.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(format!("Expected a message number, got: {}", args)),
        }
    }
}
