//! Geography index
//!
//! Closed, read-only list of the city's kecamatan (sub-districts) and
//! their kelurahan (villages), with postal codes. Every kelurahan has the
//! same fixed set of RW (ward) and RT (block) numbers. Codes are the
//! stable identity used to derive badge ids.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use warga_core::{Domicile, WargaError, WargaResult};

/// RW numbers per kelurahan.
pub const RW_PER_KELURAHAN: u8 = 5;

/// RT numbers per RW.
pub const RT_PER_RW: u16 = 12;

const BUNDLED_GEOGRAPHY: &str = include_str!("../data/geography.toml");

static BUNDLED: Lazy<WargaResult<GeographyIndex>> =
    Lazy::new(|| GeographyIndex::from_toml_str(BUNDLED_GEOGRAPHY));

/// A village within a kecamatan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kelurahan {
    /// Stable code, unique within its kecamatan
    pub code: String,
    /// Display name
    pub name: String,
    /// Five-digit postal code
    pub postal_code: String,
}

/// A sub-district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kecamatan {
    /// Stable code, unique within the city
    pub code: String,
    /// Display name
    pub name: String,
    /// Villages in this sub-district
    #[serde(default)]
    pub kelurahan: Vec<Kelurahan>,
}

/// A resolved (kecamatan, kelurahan) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoArea<'a> {
    /// Sub-district
    pub kecamatan: &'a Kecamatan,
    /// Village
    pub kelurahan: &'a Kelurahan,
}

#[derive(Debug, Deserialize)]
struct RawGeography {
    city: String,
    postal_min: String,
    postal_max: String,
    #[serde(default)]
    kecamatan: Vec<Kecamatan>,
}

/// Validated geography of one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeographyIndex {
    city: String,
    postal_space: (u32, u32),
    kecamatan: Vec<Kecamatan>,
}

impl GeographyIndex {
    /// Build and validate an index.
    pub fn new(
        city: impl Into<String>,
        postal_min: &str,
        postal_max: &str,
        kecamatan: Vec<Kecamatan>,
    ) -> WargaResult<Self> {
        let min = parse_postal(postal_min)?;
        let max = parse_postal(postal_max)?;
        if min > max {
            return Err(WargaError::invalid_geography(format!(
                "postal space {postal_min}..{postal_max} is inverted"
            )));
        }

        let mut kecamatan_codes = HashSet::new();
        for kec in &kecamatan {
            if kec.code.is_empty() || !kecamatan_codes.insert(kec.code.as_str()) {
                return Err(WargaError::invalid_geography(format!(
                    "duplicate or empty kecamatan code '{}'",
                    kec.code
                )));
            }

            let mut kelurahan_codes = HashSet::new();
            for kel in &kec.kelurahan {
                if kel.code.is_empty() || !kelurahan_codes.insert(kel.code.as_str()) {
                    return Err(WargaError::invalid_geography(format!(
                        "duplicate or empty kelurahan code '{}' in kecamatan {}",
                        kel.code, kec.code
                    )));
                }
                let postal = parse_postal(&kel.postal_code)?;
                if !(min..=max).contains(&postal) {
                    return Err(WargaError::invalid_geography(format!(
                        "postal code {} of kelurahan {} is outside the city",
                        kel.postal_code, kel.name
                    )));
                }
            }
        }

        Ok(Self {
            city: city.into(),
            postal_space: (min, max),
            kecamatan,
        })
    }

    /// Load and validate an index from TOML.
    pub fn from_toml_str(input: &str) -> WargaResult<Self> {
        let raw: RawGeography =
            toml::from_str(input).map_err(|e| WargaError::invalid_geography(e.to_string()))?;
        Self::new(raw.city, &raw.postal_min, &raw.postal_max, raw.kecamatan)
    }

    /// The geography bundled with this crate, parsed once.
    pub fn bundled() -> WargaResult<&'static GeographyIndex> {
        BUNDLED.as_ref().map_err(Clone::clone)
    }

    /// City name.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// All sub-districts in input order.
    pub fn kecamatan(&self) -> &[Kecamatan] {
        &self.kecamatan
    }

    /// Every (kecamatan, kelurahan) pair in input order.
    pub fn areas(&self) -> impl Iterator<Item = GeoArea<'_>> {
        self.kecamatan.iter().flat_map(|kecamatan| {
            kecamatan
                .kelurahan
                .iter()
                .map(move |kelurahan| GeoArea {
                    kecamatan,
                    kelurahan,
                })
        })
    }

    /// Sub-district by code.
    pub fn find_kecamatan(&self, code: &str) -> Option<&Kecamatan> {
        self.kecamatan.iter().find(|k| k.code == code)
    }

    /// Village by kecamatan and kelurahan code.
    pub fn find_area(&self, kecamatan: &str, kelurahan: &str) -> Option<GeoArea<'_>> {
        let kec = self.find_kecamatan(kecamatan)?;
        let kel = kec.kelurahan.iter().find(|k| k.code == kelurahan)?;
        Some(GeoArea {
            kecamatan: kec,
            kelurahan: kel,
        })
    }

    /// Valid RW numbers in every kelurahan.
    pub fn rw_numbers(&self) -> RangeInclusive<u8> {
        1..=RW_PER_KELURAHAN
    }

    /// Valid RT numbers in every RW.
    pub fn rt_numbers(&self) -> RangeInclusive<u16> {
        1..=RT_PER_RW
    }

    /// Resolve a postal code to its area.
    ///
    /// The code must be exactly five ASCII digits inside the city's code
    /// space, otherwise `InvalidGeography`. A well-formed code with no
    /// exact match yields `Ok(None)`.
    pub fn lookup_postal_code(&self, code: &str) -> WargaResult<Option<GeoArea<'_>>> {
        let value = parse_postal(code)?;
        let (min, max) = self.postal_space;
        if !(min..=max).contains(&value) {
            return Err(WargaError::invalid_geography(format!(
                "postal code {code} is outside {}",
                self.city
            )));
        }
        Ok(self.areas().find(|area| area.kelurahan.postal_code == code))
    }

    /// Check that a domicile names an existing area and valid RW/RT numbers.
    pub fn validate_domicile(&self, domicile: &Domicile) -> WargaResult<GeoArea<'_>> {
        let area = self
            .find_area(&domicile.kecamatan, &domicile.kelurahan)
            .ok_or_else(|| {
                WargaError::invalid_geography(format!(
                    "unknown kelurahan {}/{}",
                    domicile.kecamatan, domicile.kelurahan
                ))
            })?;
        if let Some(rw) = domicile.rw {
            if !self.rw_numbers().contains(&rw) {
                return Err(WargaError::invalid_geography(format!("RW {rw} does not exist")));
            }
        }
        if let Some(rt) = domicile.rt {
            if domicile.rw.is_none() || !self.rt_numbers().contains(&rt) {
                return Err(WargaError::invalid_geography(format!("RT {rt} does not exist")));
            }
        }
        Ok(area)
    }
}

fn parse_postal(code: &str) -> WargaResult<u32> {
    if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WargaError::invalid_geography(format!(
            "postal code '{code}' must be exactly 5 digits"
        )));
    }
    code.parse::<u32>()
        .map_err(|e| WargaError::invalid_geography(e.to_string()))
}
