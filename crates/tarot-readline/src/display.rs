use colored::Colorize;
use tarot_core::config::ProductConfig;
use tarot_core::reading::split_sections;
use tarot_core::spread::UNIVERSAL6_POSITIONS;
use tarot_core::{Card, Interpretation, MAJOR_ARCANA, ReadingResult, SpreadType};

pub fn card_table() -> String {
    MAJOR_ARCANA
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|card| format!("{:>3}  {:<22}", card.id, card.name))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn spread_menu(premium: Option<(&ProductConfig, &ProductConfig)>) -> String {
    let mut lines = vec![
        format!("  1  {} (free)", SpreadType::Single.title()),
        format!("  2  {} (free)", SpreadType::Universal6.title()),
    ];
    if let Some((single, universal6)) = premium {
        lines.push(format!("  3  {} ({})", single.name, single.price));
        lines.push(format!("  4  {} ({})", universal6.name, universal6.price));
    }
    lines.join("\n")
}

/// What the next pick stands for in a Universal 6 spread.
pub fn next_position(spread_type: SpreadType, picked: usize) -> Option<String> {
    if spread_type != SpreadType::Universal6 {
        return None;
    }
    UNIVERSAL6_POSITIONS
        .get(picked)
        .map(|p| format!("Position {}: {}", p.number, p.description))
}

pub fn selection(cards: &[&Card]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| format!("  {}. {}", i + 1, card.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn reading(result: &ReadingResult) -> String {
    let mut out = Vec::new();
    out.push(format!("{}", result.spread_type.title().bright_magenta().bold()));
    out.push(format!("{}", result.question.italic()));
    out.push(String::new());

    match &result.interpretation {
        Interpretation::Narrative(text) => {
            if let Some(card) = result.cards.first() {
                out.push(format!("{}", card.name.bright_yellow()));
            }
            out.push(text.clone());
        }
        Interpretation::Structured(structured) => {
            for position in &structured.positions {
                out.push(format!(
                    "{}",
                    format!("[{}] {}", position.position, position.card).bright_yellow()
                ));
                if !position.description.is_empty() {
                    out.push(format!("{}", position.description.bright_black()));
                }
                out.push(position.interpretation.clone());
                out.push(String::new());
            }
            out.push(format!("{}", "Overall".bright_magenta()));
            out.push(structured.overall.clone());
        }
        Interpretation::Unstructured(text) => {
            let sections = split_sections(text, result.cards.len());
            for (card, section) in result.cards.iter().zip(sections) {
                out.push(format!("{}", card.name.bright_yellow()));
                out.push(section);
                out.push(String::new());
            }
        }
    }
    out.join("\n").trim_end().to_string()
}

pub fn history_line(index: usize, result: &ReadingResult) -> String {
    let cards = result
        .cards
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:>2}. {}  {}  {} [{}]",
        index + 1,
        result.timestamp.format("%Y-%m-%d %H:%M"),
        result.spread_type.as_str(),
        result.question,
        cards
    )
}
