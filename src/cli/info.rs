use anyhow::{Context, Result};
use std::path::PathBuf;

use sigtree::events::read_events;
use sigtree::signal;
use sigtree::store::{Dimension, Section, SectionEntry, StoreFile};

/// Display the structure of a sigtree store
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let store = StoreFile::open(&file).context("Failed to open sigtree store")?;

    println!("sigtree Store Information");
    println!("=========================");
    println!("File: {}", file.display());
    println!("Created: {}", store.created().to_rfc3339());
    println!("Converter: {}", store.converter());
    println!("Contents: {}", store.stats());
    println!();

    println!("Metadata:");
    for section in store.sections() {
        print_section(section, 1);
    }
    println!();

    for block in store.blocks() {
        println!("Block '{}' ({}):", block.name, block.type_tag);
        for array in block.data_arrays() {
            let dims: Vec<String> = array.dimensions.iter().map(describe).collect();
            println!(
                "  array '{}' ({}) shape {:?} [{}]",
                array.name,
                array.type_tag,
                array.shape,
                dims.join(", ")
            );
        }
        for group in block.groups() {
            println!(
                "  group '{}': {} arrays, {} tags",
                group.name,
                group.data_arrays.len(),
                group.multi_tags.len()
            );
        }
        for tag in block.multi_tags() {
            println!(
                "  tag '{}' ({}): {} references",
                tag.name,
                tag.type_tag,
                tag.references.len()
            );
        }

        if let Ok(layout) = signal::detect_layout(block) {
            println!("  signal layout: {}", layout);
        }
        if let Ok(events) = read_events(block) {
            if !events.is_empty() {
                println!("  events: {} ({})", events.len(), events.labels().join(", "));
            }
        }
    }

    Ok(())
}

fn print_section(section: &Section, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}{} [{}]", indent, section.name, section.type_tag);
    for entry in section.entries() {
        match entry {
            SectionEntry::Property(property) => {
                let values: Vec<String> = property.values.iter().map(|v| v.to_string()).collect();
                let preview = values.join(", ");
                let preview = if preview.chars().count() > 80 {
                    let head: String = preview.chars().take(80).collect();
                    format!("{}... ({} values)", head, values.len())
                } else {
                    preview
                };
                println!("{}  {} ({}) = {}", indent, property.name, property.type_tag, preview);
            }
            SectionEntry::Section(child) => print_section(child, depth + 1),
        }
    }
}

fn describe(dimension: &Dimension) -> String {
    match dimension {
        Dimension::Set { labels: Some(labels) } => format!("set of {} labels", labels.len()),
        Dimension::Set { labels: None } => "set".to_string(),
        Dimension::Range { ticks, unit, .. } => format!(
            "range of {} ticks{}",
            ticks.len(),
            unit.as_deref().map(|u| format!(" in {}", u)).unwrap_or_default()
        ),
    }
}
