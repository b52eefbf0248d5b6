//! Admin level resolution from sheet names.

use crate::config::Config;
use crate::models::AdminLevel;
use regex::Regex;
use std::sync::LazyLock;

/// A digit 1-7 that is not part of a longer number
static LEVEL_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)([1-7])(?:\D|$)").expect("level digit regex"));

/// Admin level encoded in a sheet name such as `ADM2_CMR` or `admin1`
///
/// Years and other multi-digit numbers are ignored, so `Admin2_2019`
/// resolves to level 2. Returns `None` when no isolated digit 1-7 exists.
pub fn resolve_level(sheet_name: &str) -> Option<AdminLevel> {
    LEVEL_DIGIT_RE
        .captures(sheet_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .and_then(AdminLevel::new)
}

/// Level whose codes a `level` sheet references as parents
///
/// Defaults to the level directly above; country overrides may skip levels.
/// Returns `None` for level 1, whose parent is the country itself.
pub fn resolve_parent_level(
    level: AdminLevel,
    country: &str,
    config: &Config,
) -> Option<AdminLevel> {
    if level.is_top() {
        return None;
    }

    config
        .overrides_for(country)
        .and_then(|overrides| overrides.parent_level_for(level))
        .or_else(|| level.above())
}
