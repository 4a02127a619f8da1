//! Badge catalog and geography commands

use super::{write_json, Sources};
use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::Write;
use warga_badges::{BadgeScope, BadgeType, ValidatedBadge, UNLIMITED_ASSIGNMENTS};
use warga_core::Domicile;

/// Badge kind filter.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    /// RT head
    Rt,
    /// RW head
    Rw,
    /// Village head
    Lurah,
    /// Sub-district head
    Camat,
    /// Volunteer roles
    Kader,
    /// Achievements
    Custom,
}

impl From<BadgeKind> for BadgeType {
    fn from(kind: BadgeKind) -> Self {
        match kind {
            BadgeKind::Rt => BadgeType::Rt,
            BadgeKind::Rw => BadgeType::Rw,
            BadgeKind::Lurah => BadgeType::Lurah,
            BadgeKind::Camat => BadgeType::Camat,
            BadgeKind::Kader => BadgeType::Kader,
            BadgeKind::Custom => BadgeType::Custom,
        }
    }
}

/// Filters for `warga catalog`.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Only badges of this kind
    #[arg(long = "type", value_enum)]
    pub kind: Option<BadgeKind>,

    /// Only badges scoped to this kecamatan code
    #[arg(long)]
    pub kecamatan: Option<String>,

    /// Print only the number of matching badges
    #[arg(long)]
    pub count: bool,
}

/// Area for `warga available`.
#[derive(Args, Debug, Clone, Default)]
pub struct AvailableArgs {
    /// Kecamatan code
    #[arg(long, requires = "kelurahan")]
    pub kecamatan: Option<String>,

    /// Kelurahan code
    #[arg(long, requires = "kecamatan")]
    pub kelurahan: Option<String>,

    /// RW number
    #[arg(long, requires = "kelurahan")]
    pub rw: Option<u8>,
}

fn write_badges<W: Write>(out: &mut W, badges: &[&ValidatedBadge], json: bool) -> Result<()> {
    if json {
        return write_json(out, &badges);
    }
    for badge in badges {
        let slots = if badge.max_assignments == UNLIMITED_ASSIGNMENTS {
            "unlimited".to_string()
        } else {
            badge.max_assignments.to_string()
        };
        writeln!(out, "{:<24} {:<36} {slots}", badge.id, badge.name)?;
    }
    writeln!(out, "{} badges", badges.len())?;
    Ok(())
}

/// `warga catalog`
pub fn catalog<W: Write>(sources: &Sources, args: &CatalogArgs, json: bool, out: &mut W) -> Result<()> {
    let kind = args.kind.map(BadgeType::from);
    let badges: Vec<&ValidatedBadge> = sources
        .badges
        .badges()
        .iter()
        .filter(|badge| kind.map_or(true, |kind| badge.badge_type == kind))
        .filter(|badge| {
            args.kecamatan
                .as_ref()
                .map_or(true, |code| badge.kecamatan.as_ref() == Some(code))
        })
        .collect();

    if args.count {
        writeln!(out, "{}", badges.len())?;
        return Ok(());
    }
    write_badges(out, &badges, json)
}

/// `warga available`
pub fn available<W: Write>(sources: &Sources, args: &AvailableArgs, json: bool, out: &mut W) -> Result<()> {
    let scope = match (&args.kecamatan, &args.kelurahan) {
        (Some(kecamatan), Some(kelurahan)) => {
            let mut domicile = Domicile::new(kecamatan.clone(), kelurahan.clone());
            domicile.rw = args.rw;
            sources.geography.validate_domicile(&domicile)?;
            BadgeScope::from(&domicile)
        }
        (None, None) => BadgeScope::unscoped(),
        _ => bail!("--kecamatan and --kelurahan must be given together"),
    };

    let badges = sources.badges.available_for(&scope);
    write_badges(out, &badges, json)
}

#[derive(Serialize)]
struct PostalReport<'a> {
    postal_code: &'a str,
    kecamatan_code: &'a str,
    kecamatan: &'a str,
    kelurahan_code: &'a str,
    kelurahan: &'a str,
}

/// `warga postal <code>`
pub fn postal<W: Write>(sources: &Sources, code: &str, json: bool, out: &mut W) -> Result<()> {
    let Some(area) = sources.geography.lookup_postal_code(code)? else {
        bail!("no kelurahan in {} has postal code {code}", sources.geography.city());
    };

    if json {
        return write_json(
            out,
            &PostalReport {
                postal_code: code,
                kecamatan_code: &area.kecamatan.code,
                kecamatan: &area.kecamatan.name,
                kelurahan_code: &area.kelurahan.code,
                kelurahan: &area.kelurahan.name,
            },
        );
    }
    writeln!(
        out,
        "{code}: Kelurahan {} ({}), Kecamatan {} ({})",
        area.kelurahan.name, area.kelurahan.code, area.kecamatan.name, area.kecamatan.code
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use warga_core::WargaError;

    fn sources() -> Sources {
        Sources::load(None, None).unwrap()
    }

    fn output<F>(f: F) -> String
    where
        F: FnOnce(&Sources, &mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&sources(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_catalog_counts() {
        let all = output(|s, out| catalog(s, &CatalogArgs { count: true, ..Default::default() }, false, out));
        assert_eq!(all.trim(), (19 * 66 + 5 + 7).to_string());

        let camat = CatalogArgs {
            kind: Some(BadgeKind::Camat),
            count: true,
            ..Default::default()
        };
        assert_eq!(output(|s, out| catalog(s, &camat, false, out)).trim(), "5");

        let coblong_lurah = CatalogArgs {
            kind: Some(BadgeKind::Lurah),
            kecamatan: Some("02".to_string()),
            count: false,
        };
        let text = output(|s, out| catalog(s, &coblong_lurah, false, out));
        assert!(text.contains("lurah-02-005"));
        assert!(text.contains("Lurah Dago"));
        assert!(text.ends_with("5 badges\n"));
    }

    #[test]
    fn test_available_json() {
        let args = AvailableArgs {
            kecamatan: Some("02".to_string()),
            kelurahan: Some("005".to_string()),
            rw: Some(2),
        };
        let text = output(|s, out| available(s, &args, true, out));
        let json: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(json.len(), 1 + 1 + 1 + 12 + 7);
        assert!(json.iter().any(|b| b["id"] == "rw-02-005-02"));
    }

    #[test]
    fn test_available_rejects_unknown_area() {
        let args = AvailableArgs {
            kecamatan: Some("02".to_string()),
            kelurahan: Some("099".to_string()),
            rw: None,
        };
        let err = available(&sources(), &args, false, &mut Vec::new()).unwrap_err();
        assert_matches!(
            err.downcast_ref::<WargaError>(),
            Some(WargaError::InvalidGeography { .. })
        );
    }

    #[test]
    fn test_postal_lookup() {
        let text = output(|s, out| postal(s, "40135", false, out));
        assert!(text.contains("Kelurahan Dago (005), Kecamatan Coblong (02)"));

        let s = sources();
        assert!(postal(&s, "4013", false, &mut Vec::new()).is_err());
        assert!(postal(&s, "99999", false, &mut Vec::new()).is_err());
    }
}
