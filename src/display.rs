//! Colored terminal rendering of catalog entities.
//!
//! Used by the `show` command. Every function writes to the given writer so
//! the output can be captured in tests.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::catalog::{Entity, KnowledgeDetail, PathwayDetail, QualityDetail, RoleDetail};

/// Maximum length for truncated descriptions.
const DEFAULT_MAX_LEN: usize = 80;

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize, raw_mode: bool) -> String {
    if raw_mode || s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let head: String = s.chars().take(max_len - 3).collect();
    format!("{head}...")
}

fn write_header(
    out: &mut impl Write,
    tag: &str,
    entity: &Entity,
    raw_mode: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        tag.blue().bold(),
        entity.name.bold(),
        format!("#{}", entity.id).dimmed()
    )?;
    if let Some(description) = &entity.description {
        writeln!(out, "  {}", truncate(description, DEFAULT_MAX_LEN, raw_mode))?;
    }
    Ok(())
}

fn write_section<'a>(
    out: &mut impl Write,
    title: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> io::Result<()> {
    writeln!(out, "{}", title.cyan().bold())?;
    let mut empty = true;
    for name in names {
        empty = false;
        writeln!(out, "  - {name}")?;
    }
    if empty {
        writeln!(out, "  {}", "(none)".dimmed())?;
    }
    Ok(())
}

fn entity_names(entities: &[Entity]) -> impl Iterator<Item = &str> {
    entities.iter().map(|e| e.name.as_str())
}

/// Write one line per entity.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_entity_list(
    out: &mut impl Write,
    title: &str,
    entities: &[Entity],
    raw_mode: bool,
) -> io::Result<()> {
    writeln!(out, "{} ({})", title.blue().bold(), entities.len())?;
    for entity in entities {
        let description = entity
            .description
            .as_deref()
            .map(|d| truncate(d, 60, raw_mode))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:>3}  {}  {}",
            entity.id.dimmed(),
            entity.name,
            description.dimmed()
        )?;
    }
    Ok(())
}

/// Write a role with its qualities, knowledge and pathways.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_role_detail(
    out: &mut impl Write,
    detail: &RoleDetail,
    raw_mode: bool,
) -> io::Result<()> {
    write_header(out, "[ROLE]", &detail.role, raw_mode)?;
    write_section(out, "Soft skills", entity_names(&detail.qualities))?;

    writeln!(out, "{}", "Knowledge".cyan().bold())?;
    if detail.knowledge.is_empty() {
        writeln!(out, "  {}", "(none)".dimmed())?;
    }
    for item in &detail.knowledge {
        let elective = if item.elective { " elective" } else { "" };
        writeln!(
            out,
            "  - {} {}",
            item.knowledge.name,
            format!("(level {}{elective})", item.level).dimmed()
        )?;
    }

    write_section(out, "Pathways", entity_names(&detail.pathways))
}

/// Write a quality with its roles and pathways.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_quality_detail(
    out: &mut impl Write,
    detail: &QualityDetail,
    raw_mode: bool,
) -> io::Result<()> {
    write_header(out, "[QUALITY]", &detail.quality, raw_mode)?;
    write_section(out, "Roles", entity_names(&detail.roles))?;
    write_section(out, "Pathways", entity_names(&detail.pathways))
}

/// Write a knowledge item with its roles, pathways, categories and related items.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_knowledge_detail(
    out: &mut impl Write,
    detail: &KnowledgeDetail,
    raw_mode: bool,
) -> io::Result<()> {
    write_header(out, "[KNOWLEDGE]", &detail.knowledge, raw_mode)?;
    write_section(
        out,
        "Categories",
        detail.categories.iter().map(|c| c.name.as_str()),
    )?;
    write_section(out, "Roles", entity_names(&detail.roles))?;
    write_section(out, "Pathways", entity_names(&detail.pathways))?;
    write_section(out, "Related", entity_names(&detail.related))
}

/// Write a pathway with its leveled knowledge and roles.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_pathway_detail(
    out: &mut impl Write,
    detail: &PathwayDetail,
    raw_mode: bool,
) -> io::Result<()> {
    write_header(out, "[PATHWAY]", &detail.pathway, raw_mode)?;
    if detail.knowledge_by_level.is_empty() {
        writeln!(out, "{}", "Knowledge".cyan().bold())?;
        writeln!(out, "  {}", "(none)".dimmed())?;
    }
    for group in &detail.knowledge_by_level {
        writeln!(out, "{}", format!("Level {}", group.level).cyan().bold())?;
        for item in &group.items {
            let mut marks = Vec::new();
            if item.key {
                marks.push("key");
            }
            if item.optional {
                marks.push("optional");
            }
            if marks.is_empty() {
                writeln!(out, "  - {}", item.knowledge.name)?;
            } else {
                writeln!(
                    out,
                    "  - {} {}",
                    item.knowledge.name,
                    format!("({})", marks.join(", ")).yellow()
                )?;
            }
        }
    }
    write_section(out, "Roles", entity_names(&detail.roles))
}
