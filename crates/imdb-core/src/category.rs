//! Info categories: named subsets of fetchable information.
//!
//! Each category knows which record kinds it applies to, which attribute
//! keys it may populate, and which IMDb sub-page carries its data.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{Kind, COMPANY_CREDIT_KEYS, FILMOGRAPHY_KEY, PERSON_CREDIT_KEYS};

/// Fixed technical taxonomy of the `tech` map.
pub const TECH_KEYS: [&str; 10] = [
    "sound mix",
    "color",
    "aspect ratio",
    "camera",
    "laboratory",
    "cinematographic process",
    "printed film format",
    "negative format",
    "runtime",
    "film length",
];

/// Parents guide sections, in page order.
pub const ADVISORY_SECTIONS: [&str; 5] = ["nudity", "violence", "profanity", "alcohol", "frightening"];

const TITLE_MAIN_KEYS: &[&str] = &[
    "title",
    "original title",
    "year",
    "rating",
    "votes",
    "genres",
    "countries",
    "languages",
    "runtimes",
    "cover url",
    "plot outline",
    "content rating",
    "cast",
    "director",
    "writer",
    "creator",
];

const PERSON_MAIN_KEYS: &[&str] = &["name", "birth date", "death date", "headshot", "job titles"];

const COMPANY_MAIN_KEYS: &[&str] = &[
    "name",
    "country",
    "produced",
    "distributed",
    "special effects",
    "miscellaneous",
];

const PARENTS_GUIDE_KEYS: &[&str] = &[
    "advisory votes",
    "advisories nudity",
    "advisories violence",
    "advisories profanity",
    "advisories alcohol",
    "advisories frightening",
    "certificates",
];

const RELEASE_INFO_KEYS: &[&str] = &[
    "release dates",
    "raw release dates",
    "raw akas",
    "akas from release info",
];

const BIOGRAPHY_KEYS: &[&str] = &[
    "mini biography",
    "birth name",
    "birth place",
    "nick names",
    "height",
    "trade mark",
];

/// A named subset of information about an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoCategory {
    Main,
    FullCredits,
    Plot,
    Technical,
    ReleaseInfo,
    ParentsGuide,
    Keywords,
    Taglines,
    Trivia,
    Goofs,
    Quotes,
    Awards,
    CompanyCredits,
    Biography,
    Filmography,
}

impl InfoCategory {
    pub const ALL: [InfoCategory; 15] = [
        InfoCategory::Main,
        InfoCategory::FullCredits,
        InfoCategory::Plot,
        InfoCategory::Technical,
        InfoCategory::ReleaseInfo,
        InfoCategory::ParentsGuide,
        InfoCategory::Keywords,
        InfoCategory::Taglines,
        InfoCategory::Trivia,
        InfoCategory::Goofs,
        InfoCategory::Quotes,
        InfoCategory::Awards,
        InfoCategory::CompanyCredits,
        InfoCategory::Biography,
        InfoCategory::Filmography,
    ];

    /// Look up a category by name, case-insensitively.
    ///
    /// # Examples
    /// ```
    /// use imdb_core::InfoCategory;
    ///
    /// assert_eq!(InfoCategory::from_name("Full Credits"), Some(InfoCategory::FullCredits));
    /// assert_eq!(InfoCategory::from_name("akas"), Some(InfoCategory::ReleaseInfo));
    /// assert_eq!(InfoCategory::from_name("horoscope"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ");
        let category = match normalized.as_str() {
            "main" => InfoCategory::Main,
            "full credits" | "credits" => InfoCategory::FullCredits,
            "plot" | "synopsis" => InfoCategory::Plot,
            "technical" | "tech" => InfoCategory::Technical,
            "release info" | "release dates" | "akas" => InfoCategory::ReleaseInfo,
            "parents guide" => InfoCategory::ParentsGuide,
            "keywords" => InfoCategory::Keywords,
            "taglines" => InfoCategory::Taglines,
            "trivia" => InfoCategory::Trivia,
            "goofs" => InfoCategory::Goofs,
            "quotes" => InfoCategory::Quotes,
            "awards" => InfoCategory::Awards,
            "company credits" | "companies" => InfoCategory::CompanyCredits,
            "biography" | "bio" => InfoCategory::Biography,
            "filmography" => InfoCategory::Filmography,
            _ => return None,
        };
        Some(category)
    }

    /// Resolve a set of category names, ignoring the unrecognized ones.
    ///
    /// The result is sorted and free of duplicates.
    pub fn parse_set<I, S>(names: I) -> Vec<InfoCategory>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<InfoCategory> = names
            .into_iter()
            .filter_map(|name| {
                let category = Self::from_name(name.as_ref());
                if category.is_none() {
                    debug!(name = name.as_ref(), "ignoring unrecognized info category");
                }
                category
            })
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn name(self) -> &'static str {
        match self {
            InfoCategory::Main => "main",
            InfoCategory::FullCredits => "full credits",
            InfoCategory::Plot => "plot",
            InfoCategory::Technical => "technical",
            InfoCategory::ReleaseInfo => "release info",
            InfoCategory::ParentsGuide => "parents guide",
            InfoCategory::Keywords => "keywords",
            InfoCategory::Taglines => "taglines",
            InfoCategory::Trivia => "trivia",
            InfoCategory::Goofs => "goofs",
            InfoCategory::Quotes => "quotes",
            InfoCategory::Awards => "awards",
            InfoCategory::CompanyCredits => "company credits",
            InfoCategory::Biography => "biography",
            InfoCategory::Filmography => "filmography",
        }
    }

    /// Whether entities of `kind` have this category at all.
    pub fn applies_to(self, kind: Kind) -> bool {
        match self {
            InfoCategory::Main => true,
            InfoCategory::Trivia | InfoCategory::Quotes | InfoCategory::Awards => {
                kind.is_title() || kind == Kind::Person
            }
            InfoCategory::Biography | InfoCategory::Filmography => kind == Kind::Person,
            _ => kind.is_title(),
        }
    }

    /// Attribute keys this category may write on a record of `kind`.
    pub fn keys(self, kind: Kind) -> &'static [&'static str] {
        if !self.applies_to(kind) {
            return &[];
        }
        match self {
            InfoCategory::Main => match kind {
                Kind::Movie | Kind::TvSeries => TITLE_MAIN_KEYS,
                Kind::Person => PERSON_MAIN_KEYS,
                Kind::Company => COMPANY_MAIN_KEYS,
            },
            InfoCategory::FullCredits => PERSON_CREDIT_KEYS,
            InfoCategory::Plot => &["plot", "synopsis"],
            InfoCategory::Technical => &["tech"],
            InfoCategory::ReleaseInfo => RELEASE_INFO_KEYS,
            InfoCategory::ParentsGuide => PARENTS_GUIDE_KEYS,
            InfoCategory::Keywords => &["keywords"],
            InfoCategory::Taglines => &["taglines"],
            InfoCategory::Trivia => &["trivia"],
            InfoCategory::Goofs => &["goofs"],
            InfoCategory::Quotes => &["quotes"],
            InfoCategory::Awards => &["awards"],
            InfoCategory::CompanyCredits => COMPANY_CREDIT_KEYS,
            InfoCategory::Biography => BIOGRAPHY_KEYS,
            InfoCategory::Filmography => &[FILMOGRAPHY_KEY],
        }
    }

    /// Sub-page below the entity URL that carries this category.
    pub fn page(self, kind: Kind) -> &'static str {
        if kind == Kind::Company {
            return "";
        }
        match self {
            InfoCategory::Main | InfoCategory::Filmography => "",
            InfoCategory::FullCredits => "fullcredits",
            InfoCategory::Plot => "plotsummary",
            InfoCategory::Technical => "technical",
            InfoCategory::ReleaseInfo => "releaseinfo",
            InfoCategory::ParentsGuide => "parentalguide",
            InfoCategory::Keywords => "keywords",
            InfoCategory::Taglines => "taglines",
            InfoCategory::Trivia => "trivia",
            InfoCategory::Goofs => "goofs",
            InfoCategory::Quotes => "quotes",
            InfoCategory::Awards => "awards",
            InfoCategory::CompanyCredits => "companycredits",
            InfoCategory::Biography => "bio",
        }
    }
}

impl std::fmt::Display for InfoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
