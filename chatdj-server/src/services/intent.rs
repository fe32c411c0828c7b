//! Free-text command extraction
//!
//! Turns "play the album 'Scorpion' by Drake" into a [`Command`]. Extraction is an
//! ordered cascade of matcher rules evaluated top to bottom; the first rule that
//! matches decides both the media kind and the captured name.
//!
//! Tier order (earlier tiers pre-empt later ones):
//! 1. Album: quoted+artist, quoted, unquoted+artist, unquoted
//! 2. Podcast: quoted, unquoted, then a name followed by a trailing "podcast" word
//! 3. Song: quoted+artist, quoted, unquoted+artist ("by" then "from")
//! 4. Generic: any remaining "play X" / "add X to queue" / "queue X", as a song
//!
//! Within every group the verbs are tried as play, add-to-queue, queue. The
//! add form precedes the bare queue form so that a trailing "to queue" marker is
//! never read as the queue verb. Quoted forms run before unquoted ones, and an
//! unquoted name never starts with a quote, so a quoted title containing "by" or
//! "from" stays whole.
//!
//! A capture that is only "the" or a bare kind word ("play the album") is not a
//! name; the rule does not match.
//!
//! When a rule captures both a name and an artist, the command name is
//! "<name> <artist>" because the combination searches better. Only album rules also
//! keep the artist as a separate field.

use chatdj_common::{Action, Command, MediaKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Words that are never a name on their own
const KIND_WORDS: &[&str] = &["song", "track", "album", "podcast"];

/// Quote characters accepted around explicit names
const QUOTE_CHARS: &[char] = &['\'', '"', '“', '”'];

/// Quoted name: the user's explicit disambiguation
const QUOTED: &str = r#"['"“”]([^'"“”]+)['"“”]"#;
/// Lazy name, bounded by whatever literal follows it
const NAME: &str = r"([^.!?]+?)";
/// Lazy name that does not open with a quote (unquoted name+artist forms)
const BARE_NAME: &str = r#"([^.!?'"“”][^.!?]*?)"#;
/// Greedy capture up to the end of the sentence
const REST: &str = r"([^.!?]+)";
const TO_QUEUE: &str = r"\s+to\s+(?:the\s+|my\s+)?queue";
/// Optional "the song [called]" lead-in in front of unquoted song names
const SONG_LEAD: &str = r"(?:(?:the\s+)?song\s+(?:called\s+)?)?";
const SONG: &str = r"(?:the\s+)?song\s+(?:called\s+)?";
const ALBUM: &str = r"(?:the\s+)?album\s+";
const PODCAST: &str = r"(?:the\s+)?podcast\s+";
/// "podcast" as the last word of the sentence
const TRAILING_PODCAST: &str = r"\s+podcast\s*(?:[.!?]|$)";

/// Cascade tier a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Album,
    Podcast,
    Song,
    Generic,
}

impl Tier {
    fn kind(self) -> MediaKind {
        match self {
            Tier::Album => MediaKind::Album,
            Tier::Podcast => MediaKind::Podcast,
            Tier::Song | Tier::Generic => MediaKind::Song,
        }
    }
}

/// One matcher: a pure `text -> Option<Command>` step of the cascade
struct Rule {
    tier: Tier,
    pattern: Regex,
}

impl Rule {
    fn new(tier: Tier, pattern: String) -> Self {
        let pattern = Regex::new(&format!("(?i){}", pattern))
            .unwrap_or_else(|e| panic!("invalid extraction pattern {}: {}", pattern, e));
        Self { tier, pattern }
    }

    fn apply(&self, text: &str) -> Option<Command> {
        let caps = self.pattern.captures(text)?;
        let name = clean(caps.get(1)?.as_str());
        if is_keyword_only(name) {
            return None;
        }
        let artist = caps
            .get(2)
            .map(|m| clean(m.as_str()))
            .filter(|a| !a.is_empty());

        let full_name = match artist {
            Some(artist) => format!("{} {}", name, artist),
            None => name.to_string(),
        };

        // A rule that captured only whitespace does not match
        let command = Command::new(Action::from_text(text), self.tier.kind(), full_name).ok()?;

        Some(match self.tier {
            Tier::Album => command.with_artist(artist),
            _ => command,
        })
    }
}

fn is_keyword_only(name: &str) -> bool {
    let lower = name.to_lowercase();
    let rest = match lower.strip_prefix("the") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => lower.as_str(),
    };
    rest.is_empty() || KIND_WORDS.contains(&rest)
}

fn clean(capture: &str) -> &str {
    capture.trim().trim_matches(QUOTE_CHARS).trim()
}

fn rules(tier: Tier, patterns: Vec<String>) -> impl Iterator<Item = Rule> {
    patterns.into_iter().map(move |p| Rule::new(tier, p))
}

fn album_rules() -> impl Iterator<Item = Rule> {
    rules(
        Tier::Album,
        vec![
            format!(r"\bplay\s+{ALBUM}{QUOTED}\s+by\s+{REST}"),
            format!(r"\badd\s+{ALBUM}{QUOTED}\s+by\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{ALBUM}{QUOTED}\s+by\s+{REST}"),
            format!(r"\bplay\s+{ALBUM}{QUOTED}"),
            format!(r"\badd\s+{ALBUM}{QUOTED}{TO_QUEUE}"),
            format!(r"\bqueue\s+{ALBUM}{QUOTED}"),
            format!(r"\bplay\s+{ALBUM}{BARE_NAME}\s+by\s+{REST}"),
            format!(r"\badd\s+{ALBUM}{BARE_NAME}\s+by\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{ALBUM}{BARE_NAME}\s+by\s+{REST}"),
            format!(r"\bplay\s+{ALBUM}{REST}"),
            format!(r"\badd\s+{ALBUM}{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{ALBUM}{REST}"),
        ],
    )
}

fn podcast_rules() -> impl Iterator<Item = Rule> {
    rules(
        Tier::Podcast,
        vec![
            format!(r"\bplay\s+{PODCAST}{QUOTED}"),
            format!(r"\badd\s+{PODCAST}{QUOTED}{TO_QUEUE}"),
            format!(r"\bqueue\s+{PODCAST}{QUOTED}"),
            format!(r"\bplay\s+{PODCAST}{REST}"),
            format!(r"\badd\s+{PODCAST}{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{PODCAST}{REST}"),
            // "play The Daily podcast": anything after the verb, minus the keyword
            format!(r"\bplay\s+{NAME}{TRAILING_PODCAST}"),
            format!(r"\badd\s+{NAME}\s+podcast{TO_QUEUE}"),
            format!(r"\bqueue\s+{NAME}{TRAILING_PODCAST}"),
        ],
    )
}

fn song_rules() -> impl Iterator<Item = Rule> {
    rules(
        Tier::Song,
        vec![
            format!(r"\bplay\s+{SONG}{QUOTED}\s+by\s+{REST}"),
            format!(r"\bplay\s+{QUOTED}\s+by\s+{REST}"),
            format!(r"\badd\s+{SONG}{QUOTED}\s+by\s+{NAME}{TO_QUEUE}"),
            format!(r"\badd\s+{QUOTED}\s+by\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{SONG}{QUOTED}\s+by\s+{REST}"),
            format!(r"\bqueue\s+{QUOTED}\s+by\s+{REST}"),
            format!(r"\bplay\s+{SONG}{QUOTED}"),
            format!(r"\bplay\s+{QUOTED}"),
            format!(r"\badd\s+{SONG}{QUOTED}{TO_QUEUE}"),
            format!(r"\badd\s+{QUOTED}{TO_QUEUE}"),
            format!(r"\bqueue\s+{SONG}{QUOTED}"),
            format!(r"\bqueue\s+{QUOTED}"),
            format!(r"\bplay\s+{SONG_LEAD}{BARE_NAME}\s+by\s+{REST}"),
            format!(r"\badd\s+{SONG_LEAD}{BARE_NAME}\s+by\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{SONG_LEAD}{BARE_NAME}\s+by\s+{REST}"),
            format!(r"\bplay\s+{SONG_LEAD}{BARE_NAME}\s+from\s+{REST}"),
            format!(r"\badd\s+{SONG_LEAD}{BARE_NAME}\s+from\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{SONG_LEAD}{BARE_NAME}\s+from\s+{REST}"),
        ],
    )
}

fn generic_rules() -> impl Iterator<Item = Rule> {
    rules(
        Tier::Generic,
        vec![
            format!(r"\bplay\s+{SONG}{REST}"),
            format!(r"\badd\s+{SONG}{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{SONG}{REST}"),
            format!(r"\bplay\s+{REST}"),
            format!(r"\badd\s+{NAME}{TO_QUEUE}"),
            format!(r"\bqueue\s+{REST}"),
        ],
    )
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    album_rules()
        .chain(podcast_rules())
        .chain(song_rules())
        .chain(generic_rules())
        .collect()
});

/// Classify free text into a playback command
///
/// Returns `None` when no rule matches; callers should ask the user to clarify
/// rather than contact the playback service.
pub fn extract(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    RULES.iter().enumerate().find_map(|(index, rule)| {
        let command = rule.apply(text)?;
        debug!(
            rule = index,
            tier = ?rule.tier,
            action = %command.action,
            kind = %command.kind,
            name = %command.name,
            "Extracted playback command"
        );
        Some(command)
    })
}
