/// Commands the bot answers. Anything else falls through to the
/// unsupported-message notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let cmd = parse_command(text)?;
        match cmd.as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

fn parse_command(text: &str) -> Option<String> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split(char::is_whitespace).next().unwrap_or("");
    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some(cmd)
}
