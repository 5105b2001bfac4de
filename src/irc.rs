//! Minimal IRC line codec used by the stdio driver.

/// One raw line: `[:prefix] COMMAND params... [:trailing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    /// Middle params followed by the trailing param, if any.
    pub params: Vec<&'a str>,
}

pub fn parse_line(raw: &str) -> Option<Line<'_>> {
    let mut rest = raw.trim_end_matches(['\r', '\n']);

    let prefix = match rest.strip_prefix(':') {
        Some(after) => {
            let (prefix, tail) = after.split_once(' ')?;
            rest = tail;
            Some(prefix)
        }
        None => None,
    };

    let (head, trailing) = match rest.split_once(" :") {
        Some((head, trailing)) => (head, Some(trailing)),
        None => (rest, None),
    };

    let mut words = head.split_whitespace();
    let command = words.next()?;
    let mut params: Vec<&str> = words.collect();
    params.extend(trailing);

    Some(Line {
        prefix,
        command,
        params,
    })
}

/// The nickname part of `nick!user@host`.
pub fn nick_of(prefix: &str) -> &str {
    prefix.split_once('!').map_or(prefix, |(nick, _)| nick)
}

pub fn privmsg(destination: &str, text: &str) -> String {
    format!("PRIVMSG {destination} :{text}")
}

/// A command line addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub who: String,
    /// Where replies go: the sender for private messages, else the channel.
    pub context: String,
    pub text: String,
}

/// Route a PRIVMSG. Private messages are always for us; channel messages
/// only when they start with `<nick>:` or `<nick>,`.
pub fn route_privmsg(nickname: &str, prefix: &str, target: &str, text: &str) -> Option<Incoming> {
    let who = nick_of(prefix).to_string();

    if target.eq_ignore_ascii_case(nickname) {
        return Some(Incoming {
            context: who.to_lowercase(),
            who,
            text: text.to_string(),
        });
    }

    let addressed = text
        .get(..nickname.len())
        .filter(|head| head.eq_ignore_ascii_case(nickname))
        .and_then(|_| text[nickname.len()..].strip_prefix([':', ',']))?;

    Some(Incoming {
        who,
        context: target.to_lowercase(),
        text: addressed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privmsg() {
        let line = parse_line(":alice!a@host PRIVMSG #builds :warden: force build\r\n").unwrap();
        assert_eq!(line.prefix, Some("alice!a@host"));
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.params, vec!["#builds", "warden: force build"]);
    }

    #[test]
    fn test_parse_without_prefix_or_trailing() {
        let line = parse_line("PING server1").unwrap();
        assert_eq!(line.prefix, None);
        assert_eq!(line.command, "PING");
        assert_eq!(line.params, vec!["server1"]);
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(parse_line("").is_none());
        assert!(parse_line(":prefix-only").is_none());
    }

    #[test]
    fn test_nick_of() {
        assert_eq!(nick_of("alice!a@host"), "alice");
        assert_eq!(nick_of("NickServ"), "NickServ");
    }

    #[test]
    fn test_route_private_message() {
        let incoming = route_privmsg("warden", "Alice!a@host", "Warden", "deploy now").unwrap();
        assert_eq!(incoming.who, "Alice");
        assert_eq!(incoming.context, "alice");
        assert_eq!(incoming.text, "deploy now");
    }

    #[test]
    fn test_route_addressed_channel_message() {
        let colon = route_privmsg("warden", "bob!b@h", "#Builds", "warden: status").unwrap();
        assert_eq!(colon.context, "#builds");
        assert_eq!(colon.text, " status");

        let comma = route_privmsg("warden", "bob!b@h", "#builds", "Warden,status").unwrap();
        assert_eq!(comma.text, "status");
    }

    #[test]
    fn test_route_ignores_unaddressed_channel_chatter() {
        assert!(route_privmsg("warden", "bob!b@h", "#builds", "status please").is_none());
        assert!(route_privmsg("warden", "bob!b@h", "#builds", "wardens: status").is_none());
        assert!(route_privmsg("warden", "bob!b@h", "#builds", "war").is_none());
    }

    #[test]
    fn test_privmsg_render() {
        assert_eq!(privmsg("#builds", "Done"), "PRIVMSG #builds :Done");
    }
}
