//! Text patterns for contact mining

use regex::Regex;

/// Role keywords that mark someone as an organizer, longest first so the
/// most specific phrase wins ("conference chair" before "chair")
pub const ROLE_KEYWORDS: &[&str] = &[
    "conference chair",
    "program chair",
    "programme chair",
    "committee chair",
    "event director",
    "event manager",
    "general chair",
    "coordinator",
    "organiser",
    "organizer",
    "director",
    "manager",
    "chair",
    "lead",
    "head",
];

/// File suffixes that betray an image path masquerading as an email, e.g.
/// `logo@2x.png` inside a srcset
const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "ico"];

/// Local parts that are decoys rather than reachable people
const DECOY_LOCAL_PARTS: &[&str] = &["noreply", "no-reply", "donotreply", "do-not-reply"];

/// Capitalized words that fit the name shape but never start a real name
const NAME_STOPWORDS: &[&str] = &[
    "Contact", "About", "The", "Our", "Meet", "Email", "Phone", "Team", "Dear", "Hello",
    "From", "For", "Reach", "Call", "Visit", "Join", "Conference", "Chair", "Organizer",
    "Organiser", "Director", "Manager", "Program", "Programme", "Event", "Committee",
    "General", "Coordinator", "Head", "Lead", "Summit", "Registration", "Info",
];

/// Compiled patterns shared across every mined page
pub struct TextPatterns {
    email: Regex,
    phone: Regex,
    name: Regex,
}

impl TextPatterns {
    pub fn new() -> Self {
        Self {
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("email pattern is valid"),
            phone: Regex::new(r"\+?\(?\d[\d\s().\-/]{5,18}\d").expect("phone pattern is valid"),
            name: Regex::new(r"\b[A-Z][a-z]+(?: [A-Z][a-z]+){1,2}\b")
                .expect("name pattern is valid"),
        }
    }

    /// All email-shaped matches in `text`, in document order
    pub fn emails<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.email.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// First plausible phone number in `text`
    pub fn phone(&self, text: &str) -> Option<String> {
        self.phone
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .find(|candidate| is_plausible_phone(candidate))
            .map(|s| s.to_string())
    }

    /// First capitalized-name-shaped token sequence in `text`
    ///
    /// Sentence-initial words and role/label words match the capitalization
    /// shape too ("Contact Jane Doe"); leading stop tokens are trimmed and
    /// at least a first and last name must remain.
    pub fn name(&self, text: &str) -> Option<String> {
        for candidate in self.name.find_iter(text) {
            let tokens: Vec<&str> = candidate
                .as_str()
                .split(' ')
                .skip_while(|t| NAME_STOPWORDS.contains(t))
                .collect();
            if tokens.len() >= 2 {
                return Some(tokens.join(" "));
            }
        }
        None
    }
}

impl Default for TextPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates an email-shaped match as worth keeping
///
/// Rejects placeholder/example domains from the configured list, decoy
/// local parts, and image paths that happen to contain an `@`.
pub fn is_usable_email(email: &str, placeholder_domains: &[String]) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local = local.to_lowercase();
    let domain = domain.to_lowercase();

    if !domain.contains('.') {
        return false;
    }

    if let Some(suffix) = domain.rsplit('.').next() {
        if IMAGE_SUFFIXES.contains(&suffix) {
            return false;
        }
    }

    if DECOY_LOCAL_PARTS.iter().any(|d| local == *d) {
        return false;
    }

    !placeholder_domains
        .iter()
        .any(|p| domain == p.to_lowercase() || domain.ends_with(&format!(".{}", p.to_lowercase())))
}

/// A phone match must carry a sane digit count and not look like a year or
/// a timestamp
fn is_plausible_phone(candidate: &str) -> bool {
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return false;
    }
    let has_separator = candidate
        .chars()
        .any(|c| matches!(c, '+' | '(' | ')' | '-' | '.' | ' ' | '/'));
    has_separator || digits >= 9
}

/// Finds the most specific role keyword in `text`, returning it as written
/// on the page
pub fn find_role(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    for keyword in ROLE_KEYWORDS {
        if let Some(position) = lower.find(keyword) {
            return Some(text[position..position + keyword.len()].to_string());
        }
    }
    None
}
