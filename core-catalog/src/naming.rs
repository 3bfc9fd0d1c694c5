//! Filename conventions
//!
//! Pure functions mapping object keys to ids, titles and release dates.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

const COVER_EXTENSIONS: &[&str] = &[".jpg", ".png", ".jpeg"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a"];
const SIDECAR_EXTENSION: &str = ".txt";

fn trailing_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})$").expect("valid regex"))
}

fn sidecar_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Release Date:\s*(\d{4}-\d{2}-\d{2})").expect("valid regex"))
}

fn sidecar_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Title:[ \t\r]*([^\n]+)").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

pub fn is_cover_key(key: &str) -> bool {
    COVER_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

pub fn is_audio_key(key: &str) -> bool {
    AUDIO_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

pub fn is_sidecar_key(key: &str) -> bool {
    key.ends_with(SIDECAR_EXTENSION)
}

/// Last path segment of `key`.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// File name with a known cover or audio extension removed.
pub fn file_stem(key: &str) -> &str {
    let name = file_name(key);
    COVER_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS)
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Whitespace runs become `-`, then lowercase.
pub fn slugify(name: &str) -> String {
    whitespace_re().replace_all(name, "-").to_lowercase()
}

/// Album id from its folder name.
pub fn album_id(folder: &str) -> String {
    slugify(folder)
}

/// Display title: hyphens become spaces, case untouched.
pub fn display_title(name: &str) -> String {
    name.replace('-', " ")
}

pub fn song_id(album_id: &str, stem: &str) -> String {
    format!("{}-{}", album_id, slugify(stem))
}

/// Hyphen-separated words, each with an upper-cased first character and the
/// rest lower-cased.
pub fn title_case(stem: &str) -> String {
    stem.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Title and date parsed from a release cover file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverName {
    /// `None` when the stem is the bare word `cover` or only a date
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Parse `Fortune-Cookies-2025-09-20` into a title and a date.
///
/// A trailing date that is not a real calendar date is ignored and the
/// whole stem becomes the title. The date is only cut from the title when a
/// hyphen separates it from the rest of the stem.
pub fn parse_cover_stem(stem: &str) -> CoverName {
    if let Some(found) = trailing_date_re().find(stem) {
        if let Some(date) = parse_iso_date(found.as_str()) {
            let head = &stem[..found.start()];
            let title = match head.strip_suffix('-') {
                Some(prefix) => title_case(prefix),
                None if head.is_empty() => String::new(),
                None => title_case(stem),
            };
            return CoverName {
                title: (!title.trim().is_empty()).then_some(title),
                release_date: Some(date),
            };
        }
    }

    let title = title_case(stem);
    CoverName {
        title: (!title.eq_ignore_ascii_case("cover")).then_some(title),
        release_date: None,
    }
}

/// Fields read from a release sidecar text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidecar {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Parse `Release Date: 2024-12-31` and `Title: My New Album` lines.
pub fn parse_sidecar(text: &str) -> Sidecar {
    let release_date = sidecar_date_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_iso_date(m.as_str()));

    let title = sidecar_title_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());

    Sidecar {
        title,
        release_date,
    }
}
