//! Turns REPL lines into wizard actions.

use reqwest::Url;
use serde_json::{Map, Value};
use tarot_core::card;
use tarot_core::resume::ResumeParams;
use tarot_core::{ReadingTier, SpreadType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Back,
    Cards,
    Help,
    History,
    New,
    Random,
    Resume(String),
    Save,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Command(Command),
    Text(String),
}

pub fn parse(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line == "quit" || line == "exit" {
        return Input::Quit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Text(line.to_string());
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((rest, ""));
    let command = match name {
        "back" => Command::Back,
        "cards" => Command::Cards,
        "help" => Command::Help,
        "history" => Command::History,
        "new" => Command::New,
        "random" => Command::Random,
        "resume" => Command::Resume(arg.to_string()),
        "save" => Command::Save,
        other => Command::Unknown(other.to_string()),
    };
    Input::Command(command)
}

/// A card given by id (`17`) or by name (`the star`).
pub fn card_id(text: &str) -> Option<u8> {
    let text = text.trim();
    match text.parse::<u8>() {
        Ok(id) => card::card_by_id(id).map(|c| c.id),
        Err(_) => card::card_by_name(text).map(|c| c.id),
    }
}

/// Menu number (`1`..`4`) or `<spread> [premium]`.
pub fn spread_choice(text: &str) -> Option<(SpreadType, ReadingTier)> {
    let text = text.trim().to_lowercase();
    match text.as_str() {
        "1" => return Some((SpreadType::Single, ReadingTier::Free)),
        "2" => return Some((SpreadType::Universal6, ReadingTier::Free)),
        "3" => return Some((SpreadType::Single, ReadingTier::Premium)),
        "4" => return Some((SpreadType::Universal6, ReadingTier::Premium)),
        _ => {}
    }

    let mut words = text.split_whitespace();
    let spread = words.next()?.parse::<SpreadType>().ok()?;
    let tier = match words.next() {
        None | Some("free") => ReadingTier::Free,
        Some("premium") => ReadingTier::Premium,
        Some(_) => return None,
    };
    Some((spread, tier))
}

/// Reads resume parameters from the address the checkout page returned to.
///
/// Accepts a full URL or a bare query string. `continue=true` is implied.
pub fn resume_params(address: &str) -> Result<ResumeParams, String> {
    let address = address.trim();
    if address.is_empty() {
        return Err("Paste the address you were returned to after paying".to_string());
    }
    let url = if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!(
            "http://localhost/?{}",
            address.trim_start_matches('?')
        ))
    }
    .map_err(|err| format!("Not a valid address: {err}"))?;

    let mut fields = Map::new();
    for (key, value) in url.query_pairs() {
        fields.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    fields
        .entry("continue")
        .or_insert_with(|| Value::String("true".to_string()));

    serde_json::from_value(Value::Object(fields)).map_err(|err| err.to_string())
}
