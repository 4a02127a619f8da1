//! CLI command implementations

pub mod badges;
pub mod tiers;

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;
use warga_badges::{BadgeCatalog, GeographyIndex};
use warga_progression::TierCatalogSet;

/// Tier catalogs, geography and the badge catalog derived from it.
pub struct Sources {
    pub tiers: Cow<'static, TierCatalogSet>,
    pub geography: Cow<'static, GeographyIndex>,
    pub badges: Cow<'static, BadgeCatalog>,
}

impl Sources {
    /// Built-in tiers and bundled geography unless files are given.
    pub fn load(tiers: Option<&Path>, geography: Option<&Path>) -> Result<Self> {
        let tiers = match tiers {
            Some(path) => {
                let input = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read tier catalog {}", path.display()))?;
                tracing::debug!(path = %path.display(), "loading tier catalog");
                Cow::Owned(TierCatalogSet::from_toml_str(&input)?)
            }
            None => Cow::Borrowed(TierCatalogSet::builtin()),
        };

        let (geography, badges) = match geography {
            Some(path) => {
                let input = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read geography {}", path.display()))?;
                tracing::debug!(path = %path.display(), "loading geography");
                let geography = GeographyIndex::from_toml_str(&input)?;
                let badges = BadgeCatalog::generate(&geography);
                (Cow::Owned(geography), Cow::Owned(badges))
            }
            None => (
                Cow::Borrowed(GeographyIndex::bundled()?),
                Cow::Borrowed(BadgeCatalog::bundled()?),
            ),
        };

        tracing::debug!(
            tier_version = tiers.version(),
            badges = badges.len(),
            "sources loaded"
        );
        Ok(Self {
            tiers,
            geography,
            badges,
        })
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: std::io::Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
