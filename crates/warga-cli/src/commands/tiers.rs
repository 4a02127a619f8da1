//! Tier lookup commands

use super::{write_json, Sources};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use warga_core::RoleKind;
use warga_progression::{LevelTier, ProgressionCalculator, POINTS_UNBOUNDED};

/// Role and balance to resolve.
#[derive(Args, Debug, Clone)]
pub struct TierArgs {
    /// Role catalog: user, moderator or admin
    pub role: String,

    /// Point balance
    #[arg(allow_negative_numbers = true)]
    pub points: i64,
}

#[derive(Serialize)]
struct LevelReport<'a> {
    role: RoleKind,
    points: i64,
    tier: &'a LevelTier,
    multiplier: f64,
}

fn range(tier: &LevelTier) -> String {
    if tier.max_points == POINTS_UNBOUNDED {
        format!("{}+", tier.min_points)
    } else {
        format!("{}-{}", tier.min_points, tier.max_points)
    }
}

/// `warga level <role> <points>`
pub fn level<W: Write>(sources: &Sources, args: &TierArgs, json: bool, out: &mut W) -> Result<()> {
    let role: RoleKind = args.role.parse()?;
    let calculator = ProgressionCalculator::new(&sources.tiers);
    let tier = calculator.level_for(role, args.points);
    let multiplier = calculator.multiplier(role, args.points);

    if json {
        return write_json(
            out,
            &LevelReport {
                role,
                points: args.points,
                tier,
                multiplier,
            },
        );
    }

    writeln!(
        out,
        "{} {} - level {} ({} points, {}x)",
        tier.badge,
        tier.name,
        tier.level,
        range(tier),
        multiplier
    )?;
    for perk in &tier.perks {
        writeln!(out, "  - {perk}")?;
    }
    Ok(())
}

/// `warga progress <role> <points>`
pub fn progress<W: Write>(sources: &Sources, args: &TierArgs, json: bool, out: &mut W) -> Result<()> {
    let role: RoleKind = args.role.parse()?;
    let progress = ProgressionCalculator::new(&sources.tiers).progress(role, args.points);

    if json {
        return write_json(out, &progress);
    }

    writeln!(
        out,
        "{} (level {}): {:.1}%",
        progress.current.name, progress.current.level, progress.percent
    )?;
    match progress.next {
        Some(next) => writeln!(
            out,
            "{} more points to {} (level {})",
            progress.points_to_next, next.name, next.level
        )?,
        None => writeln!(out, "top tier reached")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use warga_core::WargaError;

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&Sources, &mut Vec<u8>) -> Result<()>,
    {
        let sources = Sources::load(None, None).unwrap();
        let mut out = Vec::new();
        f(&sources, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn args(role: &str, points: i64) -> TierArgs {
        TierArgs {
            role: role.to_string(),
            points,
        }
    }

    #[test]
    fn test_level_text() {
        let text = run(|s, out| level(s, &args("user", 500), false, out));
        assert!(text.contains("Tokoh Masyarakat - level 4 (301-600 points, 1.2x)"));
    }

    #[test]
    fn test_level_json() {
        let text = run(|s, out| level(s, &args("Moderator", 2500), true, out));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["role"], "moderator");
        assert_eq!(json["tier"]["name"], "Kepala Moderator");
        assert_eq!(json["multiplier"], 2.0);
    }

    #[test]
    fn test_progress_text() {
        let text = run(|s, out| progress(s, &args("user", 100), false, out));
        assert!(text.contains("Warga Aktif (level 2)"));
        assert!(text.contains("51 more points to Relawan"));

        let top = run(|s, out| progress(s, &args("admin", 9000), false, out));
        assert!(top.contains("100.0%"));
        assert!(top.contains("top tier reached"));
    }

    #[test]
    fn test_unknown_role() {
        let sources = Sources::load(None, None).unwrap();
        let err = level(&sources, &args("lurah", 10), false, &mut Vec::new()).unwrap_err();
        assert_matches!(err.downcast_ref::<WargaError>(), Some(WargaError::InvalidRole { .. }));
    }
}
