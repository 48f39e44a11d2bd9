//! Controlled vocabularies for wine attributes.
//!
//! Every lot is described by the same five attributes, each drawn from a
//! fixed list:
//!
//! | Attribute | Values |
//! |---|---|
//! | Appellation | `mercurey`, `rully`, `bourgogne` |
//! | Color | `red`, `white` |
//! | Climat | `Champs Martin`, `Fromange`, `-` |
//! | Cru | `village`, `1er cru`, `grand cru`, `-` |
//!
//! `-` is the "not applicable" sentinel: regional wines (a plain Bourgogne)
//! have neither a climat nor a cru. When the caller omits climat and cru,
//! both default to the sentinel before validation runs.
//!
//! Input matching is case-insensitive and treats underscores and runs of
//! whitespace as a single space, so `1ER_CRU` and `1er  cru` both resolve to
//! [`Cru::PremierCru`]. The canonical spelling from the table is what gets
//! displayed and fed to the slug builder.
//!
//! Validation collects every problem instead of stopping at the first one;
//! the CLI prints them followed by the full vocabulary listing.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Placeholder for "no climat" / "no cru".
pub const SENTINEL: &str = "-";

/// kJ per kcal, used when only the kJ value is supplied.
const KJ_PER_KCAL: f64 = 4.184;

/// A closed set of terms with a canonical spelling each.
pub trait Vocabulary: Sized + Copy + 'static {
    /// Heading used in the vocabulary listing.
    const NAME: &'static str;
    const ALL: &'static [Self];

    /// Canonical spelling.
    fn label(self) -> &'static str;

    /// Resolve free-form input to a term, tolerating case and separators.
    fn parse(input: &str) -> Option<Self> {
        let wanted = normalize_term(input);
        Self::ALL
            .iter()
            .copied()
            .find(|term| normalize_term(term.label()) == wanted)
    }
}

/// Lowercase, treat `_` as a space, collapse whitespace runs.
fn normalize_term(input: &str) -> String {
    input
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Appellation {
    Mercurey,
    Rully,
    Bourgogne,
}

impl Vocabulary for Appellation {
    const NAME: &'static str = "appellation";
    const ALL: &'static [Self] = &[Self::Mercurey, Self::Rully, Self::Bourgogne];

    fn label(self) -> &'static str {
        match self {
            Self::Mercurey => "mercurey",
            Self::Rully => "rully",
            Self::Bourgogne => "bourgogne",
        }
    }
}

impl Appellation {
    /// Proper-noun form for display on the product page.
    pub fn title(self) -> &'static str {
        match self {
            Self::Mercurey => "Mercurey",
            Self::Rully => "Rully",
            Self::Bourgogne => "Bourgogne",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    White,
}

impl Vocabulary for Color {
    const NAME: &'static str = "color";
    const ALL: &'static [Self] = &[Self::Red, Self::White];

    fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::White => "white",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Climat {
    #[serde(rename = "Champs Martin")]
    ChampsMartin,
    #[serde(rename = "Fromange")]
    Fromange,
    #[serde(rename = "-")]
    NotApplicable,
}

impl Vocabulary for Climat {
    const NAME: &'static str = "climat";
    const ALL: &'static [Self] = &[Self::ChampsMartin, Self::Fromange, Self::NotApplicable];

    fn label(self) -> &'static str {
        match self {
            Self::ChampsMartin => "Champs Martin",
            Self::Fromange => "Fromange",
            Self::NotApplicable => SENTINEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cru {
    #[serde(rename = "village")]
    Village,
    #[serde(rename = "1er cru")]
    PremierCru,
    #[serde(rename = "grand cru")]
    GrandCru,
    #[serde(rename = "-")]
    NotApplicable,
}

impl Vocabulary for Cru {
    const NAME: &'static str = "cru";
    const ALL: &'static [Self] = &[
        Self::Village,
        Self::PremierCru,
        Self::GrandCru,
        Self::NotApplicable,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Village => "village",
            Self::PremierCru => "1er cru",
            Self::GrandCru => "grand cru",
            Self::NotApplicable => SENTINEL,
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(Appellation, Color, Climat, Cru);

/// Energy value per 100 ml, displayed as `<kJ> kJ / <kcal> kcal`.
///
/// Each figure keeps the spelling it was given, so a decimal comma stays a
/// comma: `"312 kJ / 74,5 kcal"` is printed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Energy {
    pub kj: String,
    pub kcal: String,
}

impl Energy {
    /// Parse `"312 kJ / 75 kcal"` (spacing and unit case are free) or a
    /// bare kJ value such as `"312"`, deriving kcal rounded to the nearest
    /// integer. Figures may carry one decimal separator, `.` or `,`.
    pub fn parse(input: &str) -> Option<Self> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(kj) = parse_amount(&compact) {
            let kcal = (kj / KJ_PER_KCAL).round();
            return Some(Self {
                kcal: format!("{kcal:.0}"),
                kj: compact,
            });
        }

        let lower = compact.to_lowercase();
        let (kj_part, kcal_part) = lower.split_once('/')?;
        let kj = kj_part.strip_suffix("kj")?;
        let kcal = kcal_part.strip_suffix("kcal")?;
        parse_amount(kj)?;
        parse_amount(kcal)?;
        Some(Self {
            kj: kj.to_string(),
            kcal: kcal.to_string(),
        })
    }

    /// The display form with every space removed: `312kJ/75kcal`.
    pub fn compact(&self) -> String {
        self.to_string().replace(' ', "")
    }
}

/// A non-negative figure: digits, optionally split once by `.` or `,`.
fn parse_amount(text: &str) -> Option<f64> {
    let (whole, fraction) = match text.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.is_none_or(all_digits) {
        return None;
    }
    text.replace(',', ".").parse().ok()
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kJ / {} kcal", self.kj, self.kcal)
    }
}

/// A validated attribute set. Only [`validate`] produces one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WineAttributes {
    pub year: u16,
    pub appellation: Appellation,
    pub color: Color,
    pub climat: Climat,
    pub cru: Cru,
    pub energy: Energy,
}

/// One attribute outside its vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("unknown appellation '{0}'")]
    Appellation(String),
    #[error("unknown color '{0}'")]
    Color(String),
    #[error("unknown climat '{0}'")]
    Climat(String),
    #[error("unknown cru '{0}'")]
    Cru(String),
    #[error("invalid energy '{0}', expected '<kJ> kJ / <kcal> kcal' or a kJ value")]
    Energy(String),
}

/// Every problem found in one attribute set, in attribute order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid wine attributes: {}", .problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct InvalidAttributes {
    pub problems: Vec<VocabularyError>,
}

/// Check raw attribute strings against the vocabularies.
///
/// `climat` and `cru` default to [`SENTINEL`] when absent.
pub fn validate(
    year: u16,
    appellation: &str,
    color: &str,
    climat: Option<&str>,
    cru: Option<&str>,
    energy: &str,
) -> Result<WineAttributes, InvalidAttributes> {
    let climat = climat.unwrap_or(SENTINEL);
    let cru = cru.unwrap_or(SENTINEL);

    let appellation = Appellation::parse(appellation)
        .ok_or_else(|| VocabularyError::Appellation(appellation.to_string()));
    let color = Color::parse(color).ok_or_else(|| VocabularyError::Color(color.to_string()));
    let climat = Climat::parse(climat).ok_or_else(|| VocabularyError::Climat(climat.to_string()));
    let cru = Cru::parse(cru).ok_or_else(|| VocabularyError::Cru(cru.to_string()));
    let energy = Energy::parse(energy).ok_or_else(|| VocabularyError::Energy(energy.to_string()));

    match (appellation, color, climat, cru, energy) {
        (Ok(appellation), Ok(color), Ok(climat), Ok(cru), Ok(energy)) => {
            Ok(WineAttributes {
                year,
                appellation,
                color,
                climat,
                cru,
                energy,
            })
        }
        (appellation, color, climat, cru, energy) => {
            let mut problems = Vec::new();
            problems.extend(appellation.err());
            problems.extend(color.err());
            problems.extend(climat.err());
            problems.extend(cru.err());
            problems.extend(energy.err());
            Err(InvalidAttributes { problems })
        }
    }
}

/// One `(name, labels)` row per vocabulary, in listing order.
pub fn vocabulary_listing() -> Vec<(&'static str, Vec<&'static str>)> {
    fn row<T: Vocabulary>() -> (&'static str, Vec<&'static str>) {
        (T::NAME, T::ALL.iter().map(|t| t.label()).collect())
    }
    vec![
        row::<Appellation>(),
        row::<Color>(),
        row::<Cru>(),
        row::<Climat>(),
    ]
}
