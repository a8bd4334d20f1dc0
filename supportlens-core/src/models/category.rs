use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SupportLensError;

/// The closed set of support intent categories.
///
/// Every stored trace carries exactly one of these labels, and list
/// filters must name one of them exactly. The set is fixed; adding a
/// category means updating the classification prompt to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Refund,
    #[serde(rename = "Account Access")]
    AccountAccess,
    Cancellation,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
}

impl Category {
    /// All categories in canonical order. Classification checks them in
    /// this order (first match wins) and analytics reports them in this
    /// order.
    pub const ALL: [Category; 5] = [
        Category::Billing,
        Category::Refund,
        Category::AccountAccess,
        Category::Cancellation,
        Category::GeneralInquiry,
    ];

    /// Canonical display name, exactly as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Refund => "Refund",
            Category::AccountAccess => "Account Access",
            Category::Cancellation => "Cancellation",
            Category::GeneralInquiry => "General Inquiry",
        }
    }

    /// Find the first category (in `ALL` order) whose canonical name
    /// appears in `raw`, case-insensitively.
    ///
    /// Substring matching tolerates the punctuation and stray prose that
    /// models wrap answers in ("Refund." still matches `Refund`). Returns
    /// `None` when no category name appears at all.
    pub fn matching(raw: &str) -> Option<Category> {
        let haystack = raw.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| haystack.contains(&c.as_str().to_lowercase()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SupportLensError;

    /// Strict parse for stored labels and list filters. Only the exact
    /// canonical name is accepted; anything else is an invalid-category
    /// error carrying the offending input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SupportLensError::InvalidCategory(s.to_string()))
    }
}
