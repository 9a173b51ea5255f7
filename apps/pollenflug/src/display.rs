//! Terminal rendering of the pollen list.

use client_core::{ItemRow, PinSet, PresentationModel};
use colored::{ColoredString, Colorize};
use shared::{domain::Region, severity::SeverityTier};

fn tier_color(text: &str, tier: SeverityTier) -> ColoredString {
    match tier {
        SeverityTier::None => text.green(),
        SeverityTier::Low => text.yellow(),
        SeverityTier::Moderate => text.truecolor(255, 165, 0),
        SeverityTier::High => text.red().bold(),
        SeverityTier::Unrecognized => text.magenta().bold(),
    }
}

pub fn print_presentation(model: &PresentationModel) {
    println!(
        "{} {} · {}",
        "Pollenflug".bold(),
        model.day.label().cyan(),
        model.region.title().yellow()
    );
    if let Some(last_update) = &model.last_update {
        let next_update = model.next_update.as_deref().unwrap_or("-");
        println!(
            "{}",
            format!("Stand {last_update}, nächste Aktualisierung {next_update}").dimmed()
        );
    }
    if let Some(error) = &model.error {
        eprintln!("{} {}", "✗".red().bold(), error.message);
    }
    if model.is_loading {
        println!("{}", "Lade Daten…".dimmed().italic());
        return;
    }
    if model.pinned_items.is_empty() && model.unpinned_items.is_empty() {
        println!("{}", "(keine Daten für diese Region)".dimmed().italic());
        return;
    }

    if let Some(title) = model.pinned_section_title() {
        print_section(Some(title), &model.pinned_items);
    }
    print_section(model.other_section_title(), &model.unpinned_items);
}

fn print_section(title: Option<&str>, rows: &[ItemRow]) {
    println!();
    if let Some(title) = title {
        println!("{}", title.bold().underline());
    }
    let width = rows.iter().map(|row| row.name.chars().count()).max().unwrap_or(0);
    for row in rows {
        let padding = width - row.name.chars().count();
        println!(
            "  {}{}  {}",
            row.name,
            " ".repeat(padding),
            tier_color(&row.severity.label, row.severity.tier)
        );
    }
}

pub fn print_pins(pins: &PinSet) {
    if pins.is_empty() {
        println!("{}", "(keine angehefteten Einträge)".dimmed().italic());
        return;
    }
    for name in pins.iter() {
        println!("{}", pin_line(name));
    }
}

fn pin_line(name: &str) -> String {
    format!("  {} {}", "*".yellow(), name)
}

pub fn print_toggle_result(name: &str, pins: &PinSet) {
    let action = if pins.contains(name) { "Pinned" } else { "Unpinned" };
    println!("{} {action} {}", "✓".green().bold(), name.to_lowercase());
    print_pins(pins);
}

pub fn print_regions(regions: &[Region]) {
    for region in regions {
        println!("  {:>8}  {}", region.key().cyan(), region.title());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_lines_use_plain_marker() {
        colored::control::set_override(false);
        assert_eq!(pin_line("birke"), "  * birke");
        assert!(pin_line("erle").is_ascii());
    }
}
