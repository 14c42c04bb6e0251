use serde::{Deserialize, Serialize};
use std::fmt;

/// Explicit or unsafe terms rejected by every preset.
pub const REFERENCE_FORBIDDEN: &[&str] = &[
    "nude",
    "nudity",
    "explicit",
    "erotic",
    "fetish",
    "sexual",
    "porn",
    "pornographic",
    "lolita",
    "schoolgirl",
    "teen",
    "underage",
    "minor",
    "child",
];

/// Brand names added by the strict preset.
pub const STRICT_EXTRA_FORBIDDEN: &[&str] = &[
    "gucci",
    "prada",
    "chanel",
    "versace",
    "balenciaga",
    "louis vuitton",
    "hermes",
    "dior",
];

/// Named policy presets selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GuardPreset {
    #[default]
    Reference,
    Strict,
}

/// Rules a synthesized prompt must satisfy before image generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub forbidden: Vec<String>,
    pub required: Vec<String>,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
}

impl GuardPolicy {
    pub fn reference() -> Self {
        Self {
            forbidden: to_owned_terms(REFERENCE_FORBIDDEN),
            required: Vec::new(),
            min_chars: None,
            max_chars: None,
        }
    }

    pub fn strict() -> Self {
        let mut forbidden = to_owned_terms(REFERENCE_FORBIDDEN);
        forbidden.extend(to_owned_terms(STRICT_EXTRA_FORBIDDEN));
        Self {
            forbidden,
            required: vec!["leather".to_string()],
            min_chars: Some(200),
            max_chars: Some(4000),
        }
    }

    pub fn from_preset(preset: GuardPreset) -> Self {
        match preset {
            GuardPreset::Reference => Self::reference(),
            GuardPreset::Strict => Self::strict(),
        }
    }

    /// Layer extra terms and bounds on top of a preset.
    pub fn extended(
        mut self,
        extra_forbidden: &[String],
        extra_required: &[String],
        min_chars: Option<usize>,
        max_chars: Option<usize>,
    ) -> Self {
        self.forbidden.extend(normalize_terms(extra_forbidden));
        self.required.extend(normalize_terms(extra_required));
        if min_chars.is_some() {
            self.min_chars = min_chars;
        }
        if max_chars.is_some() {
            self.max_chars = max_chars;
        }
        self
    }

    /// Check `text` and return the first violation found.
    pub fn validate(&self, text: &str) -> GuardVerdict {
        match self.first_violation(&sanitize(text)) {
            None => GuardVerdict::accepted(),
            Some(violation) => GuardVerdict::rejected(&violation),
        }
    }

    fn first_violation(&self, cleaned: &str) -> Option<Violation> {
        if cleaned.is_empty() {
            return Some(Violation::Empty);
        }

        let lowered = cleaned.to_lowercase();
        if let Some(term) = self
            .forbidden
            .iter()
            .find(|term| lowered.contains(term.to_lowercase().as_str()))
        {
            return Some(Violation::Forbidden(term.clone()));
        }
        if let Some(term) = self
            .required
            .iter()
            .find(|term| !lowered.contains(term.to_lowercase().as_str()))
        {
            return Some(Violation::MissingRequired(term.clone()));
        }

        let chars = cleaned.chars().count();
        if self.min_chars.is_some_and(|min| chars < min) {
            return Some(Violation::TooShort);
        }
        if self.max_chars.is_some_and(|max| chars > max) {
            return Some(Violation::TooLong);
        }
        None
    }
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::reference()
    }
}

fn to_owned_terms(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

fn normalize_terms(terms: &[String]) -> impl Iterator<Item = String> + '_ {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Why a prompt was rejected. `Display` yields the stable reason code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Empty,
    Forbidden(String),
    MissingRequired(String),
    TooShort,
    TooLong,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty_prompt"),
            Self::Forbidden(term) => write!(f, "forbidden_keyword:{term}"),
            Self::MissingRequired(term) => write!(f, "missing_required:{term}"),
            Self::TooShort => f.write_str("prompt_too_short"),
            Self::TooLong => f.write_str("prompt_too_long"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardVerdict {
    pub accepted: bool,
    /// Empty when accepted.
    pub reason: String,
}

impl GuardVerdict {
    fn accepted() -> Self {
        Self {
            accepted: true,
            reason: String::new(),
        }
    }

    fn rejected(violation: &Violation) -> Self {
        Self {
            accepted: false,
            reason: violation.to_string(),
        }
    }
}

/// Strip code fences and collapse whitespace. Idempotent.
pub fn sanitize(text: &str) -> String {
    text.replace("```", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
