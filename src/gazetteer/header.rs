//! Header classification for admin level sheets.
//!
//! Each sheet names its columns differently (`ADM2_PCODE`, `admin2Pcode`,
//! `ADM2_FR`, `name_2`, ...). Classification runs an ordered table of
//! [`ColumnRule`]s over the header row, then applies a tie-break per role
//! to settle on exactly one code column, one name column, and optional
//! parent and date columns.

use crate::config::Config;
use crate::constants::{
    ALTERNATE_NAME_MARKER, DATE_COLUMN, ENGLISH_SUFFIX, PCODE_MARKER, UNHCR_MARKER,
};
use crate::error::ClassificationError;
use crate::models::AdminLevel;
use regex::Regex;
use tracing::warn;

/// What a column is used for in the output record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The unit's own P-Code
    Code,
    /// Looser code pattern, used only when no `Code` column matches
    CodeFallback,
    /// Human-readable name
    Name,
    /// P-Code of the enclosing unit
    Parent,
    /// Per-row validity date
    Date,
}

/// A column chosen for a role, with its position in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

/// Column assignments for one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedColumns {
    pub code: ColumnRef,
    pub name: ColumnRef,
    pub parent: Option<ColumnRef>,
    pub date: Option<ColumnRef>,
}

/// Columns matching any include pattern and containing none of the
/// excluded substrings (case-insensitive)
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub role: ColumnRole,
    include: Vec<Regex>,
    exclude: &'static [&'static str],
}

impl ColumnRule {
    fn new(role: ColumnRole, patterns: &[String], exclude: &'static [&'static str]) -> Self {
        let include = patterns
            .iter()
            .map(|p| Regex::new(p).expect("column rule patterns are built from digits and constants"))
            .collect();
        Self {
            role,
            include,
            exclude,
        }
    }

    /// Whether `column` satisfies this rule
    pub fn matches(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.include.iter().any(|re| re.is_match(column))
            && !self.exclude.iter().any(|ex| lower.contains(ex))
    }

    /// Matching columns in header order
    pub fn candidates(&self, columns: &[String]) -> Vec<ColumnRef> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, column)| self.matches(column))
            .map(|(index, column)| ColumnRef {
                index,
                name: column.clone(),
            })
            .collect()
    }
}

/// Ordered rule table for a sheet at `level` whose parents live at `parent_level`
///
/// Patterns are anchored at the start of the column name only, so
/// `ADM2_PCODE_OLD` still counts as a level 2 code column.
pub fn rule_table(level: AdminLevel, parent_level: Option<AdminLevel>) -> Vec<ColumnRule> {
    let mut rules = vec![
        ColumnRule::new(
            ColumnRole::Code,
            &[format!(r"(?i)^.*{level}.*cod")],
            &[UNHCR_MARKER],
        ),
        ColumnRule::new(ColumnRole::CodeFallback, &[r"(?i)^.*pcod".to_string()], &[]),
        ColumnRule::new(
            ColumnRole::Name,
            &[
                format!(r"(?i)^adm(in)?{level}(name)?_?([a-z]{{2}}$|name$)"),
                format!(r"(?i)^name_?{level}"),
            ],
            &[ALTERNATE_NAME_MARKER],
        ),
    ];

    if let Some(parent) = parent_level {
        rules.push(ColumnRule::new(
            ColumnRole::Parent,
            &[format!(r"(?i)^.*{parent}.*cod")],
            &[UNHCR_MARKER],
        ));
    }

    rules.push(ColumnRule::new(
        ColumnRole::Date,
        &[format!(r"(?i)^{}$", regex::escape(DATE_COLUMN))],
        &[],
    ));

    rules
}

fn candidates_for(rules: &[ColumnRule], role: ColumnRole, columns: &[String]) -> Vec<ColumnRef> {
    rules
        .iter()
        .filter(|rule| rule.role == role)
        .flat_map(|rule| rule.candidates(columns))
        .collect()
}

/// Assign code, name, parent, and date columns for one sheet
///
/// `parent_level` is `None` for level 1 sheets, which never look for a
/// parent column. Ambiguities are settled by tie-break and logged as
/// warnings; a missing code or name column is an error for the sheet.
pub fn classify(
    columns: &[String],
    level: AdminLevel,
    parent_level: Option<AdminLevel>,
    country: &str,
    config: &Config,
) -> Result<ClassifiedColumns, ClassificationError> {
    let rules = rule_table(level, parent_level);

    let code = select_code(
        candidates_for(&rules, ColumnRole::Code, columns),
        || candidates_for(&rules, ColumnRole::CodeFallback, columns),
        country,
        level,
    )?;

    let forced_name = config
        .overrides_for(country)
        .and_then(|overrides| overrides.name_column_for(level));
    let name_candidates = match forced_name {
        Some(column) => vec![find_column(columns, &column).ok_or(
            ClassificationError::MissingOverrideColumn {
                level: level.get(),
                column,
            },
        )?],
        None => candidates_for(&rules, ColumnRole::Name, columns),
    };
    let name = select_name(name_candidates, config, country, level)?;

    let parent = match parent_level {
        Some(_) => select_parent(
            candidates_for(&rules, ColumnRole::Parent, columns),
            country,
            level,
        ),
        None => None,
    };

    let date = candidates_for(&rules, ColumnRole::Date, columns)
        .into_iter()
        .next();
    if date.is_none() {
        warn!(
            "{}: Can't find date header at adm{}, using dataset reference date",
            country, level
        );
    }

    Ok(ClassifiedColumns {
        code,
        name,
        parent,
        date,
    })
}

fn find_column(columns: &[String], wanted: &str) -> Option<ColumnRef> {
    columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(wanted))
        .map(|index| ColumnRef {
            index,
            name: columns[index].clone(),
        })
}

/// Prefer a `pcode` column among several matches; fall back to the loose
/// pattern only if it is unambiguous
fn select_code(
    candidates: Vec<ColumnRef>,
    fallback: impl FnOnce() -> Vec<ColumnRef>,
    country: &str,
    level: AdminLevel,
) -> Result<ColumnRef, ClassificationError> {
    let mut candidates = if candidates.is_empty() {
        let fallback = fallback();
        if fallback.len() != 1 {
            return Err(if fallback.is_empty() {
                ClassificationError::MissingCodeColumn { level: level.get() }
            } else {
                ClassificationError::AmbiguousCodeFallback {
                    level: level.get(),
                    candidates: fallback.into_iter().map(|c| c.name).collect(),
                }
            });
        }
        fallback
    } else {
        candidates
    };

    if candidates.len() > 1 {
        if let Some(pos) = candidates
            .iter()
            .position(|c| c.name.to_lowercase().contains(PCODE_MARKER))
        {
            return Ok(candidates.swap_remove(pos));
        }
        warn!(
            "{}: Found multiple code columns at adm{}, using first",
            country, level
        );
    }

    Ok(candidates.swap_remove(0))
}

/// Two-letter language suffix of a column such as `ADM1_FR`
fn language_suffix(column: &str) -> Option<String> {
    let tail: Vec<char> = column.chars().rev().take(3).collect();
    match tail.as_slice() {
        [second, first, '_'] => Some(format!("{first}{second}").to_lowercase()),
        _ => None,
    }
}

/// Prefer a single English column, then any Latin-script column
fn select_name(
    mut candidates: Vec<ColumnRef>,
    config: &Config,
    country: &str,
    level: AdminLevel,
) -> Result<ColumnRef, ClassificationError> {
    if candidates.is_empty() {
        return Err(ClassificationError::MissingNameColumn { level: level.get() });
    }
    if candidates.len() == 1 {
        return Ok(candidates.swap_remove(0));
    }

    let english: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name.to_lowercase().ends_with(ENGLISH_SUFFIX))
        .map(|(i, _)| i)
        .collect();
    if let [only] = english.as_slice() {
        return Ok(candidates.swap_remove(*only));
    }

    if let Some(pos) = candidates.iter().position(|c| {
        language_suffix(&c.name).is_some_and(|suffix| !config.is_non_latin(&suffix))
    }) {
        return Ok(candidates.swap_remove(pos));
    }

    warn!(
        "{}: Found only non-latin alphabet name columns at adm{}",
        country, level
    );
    Ok(candidates.swap_remove(0))
}

fn select_parent(
    mut candidates: Vec<ColumnRef>,
    country: &str,
    level: AdminLevel,
) -> Option<ColumnRef> {
    match candidates.len() {
        0 => {
            warn!(
                "{}: Can't find parent code header at adm{}",
                country, level
            );
            None
        }
        1 => Some(candidates.swap_remove(0)),
        _ => {
            warn!(
                "{}: Found multiple parent code columns at adm{}, using first",
                country, level
            );
            Some(candidates.swap_remove(0))
        }
    }
}
