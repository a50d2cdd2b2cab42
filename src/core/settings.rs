use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "json")]
use super::error::ConvertError;

/// ebInterface schema version the target document is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetVersion {
    #[serde(rename = "4.0")]
    V40,
    #[serde(rename = "4.1")]
    V41,
    #[serde(rename = "4.2")]
    V42,
    #[serde(rename = "4.3")]
    V43,
    #[serde(rename = "5.0")]
    V50,
    #[serde(rename = "6.0")]
    V60,
    #[default]
    #[serde(rename = "6.1")]
    V61,
}

impl TargetVersion {
    pub const ALL: [TargetVersion; 7] = [
        Self::V40,
        Self::V41,
        Self::V42,
        Self::V43,
        Self::V50,
        Self::V60,
        Self::V61,
    ];

    /// Shape descriptor for this version.
    pub fn shape(&self) -> TargetShape {
        match self {
            Self::V40 => TargetShape {
                sepa_direct_debit: false,
                unified_adjustment_list: true,
                ..TargetShape::BASE
            },
            Self::V41 | Self::V42 | Self::V43 => TargetShape {
                unified_adjustment_list: true,
                ..TargetShape::BASE
            },
            Self::V50 | Self::V60 | Self::V61 => TargetShape::BASE,
        }
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V40 => "4.0",
            Self::V41 => "4.1",
            Self::V42 => "4.2",
            Self::V43 => "4.3",
            Self::V50 => "5.0",
            Self::V60 => "6.0",
            Self::V61 => "6.1",
        };
        f.write_str(s)
    }
}

/// The version-dependent parts of the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetShape {
    /// `SEPADirectDebit` exists as its own payment method. When false, SEPA
    /// direct debits are expressed as plain `DirectDebit`.
    pub sepa_direct_debit: bool,
    /// Line-level reductions and surcharges live in one list whose direction
    /// is fixed by its first entry.
    pub unified_adjustment_list: bool,
    /// Maximum length of `PaymentReference`.
    pub max_payment_reference_len: usize,
    /// Maximum length of `IBAN`.
    pub max_iban_len: usize,
}

impl TargetShape {
    const BASE: TargetShape = TargetShape {
        sepa_direct_debit: true,
        unified_adjustment_list: false,
        max_payment_reference_len: 35,
        max_iban_len: 34,
    };
}

/// Maps a `ProfileID` to a recognized process identifier.
#[derive(Clone, Copy)]
pub struct ProfileResolver(pub fn(&str) -> Option<String>);

impl ProfileResolver {
    pub fn resolve(&self, profile_id: &str) -> Option<String> {
        (self.0)(profile_id)
    }
}

impl Default for ProfileResolver {
    fn default() -> Self {
        Self(resolve_known_profile)
    }
}

impl fmt::Debug for ProfileResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProfileResolver(..)")
    }
}

/// Known Peppol / CEN BII profile identifiers.
pub const KNOWN_PROFILES: &[(&str, &str)] = &[
    ("urn:fdc:peppol.eu:2017:poacc:billing:01:1.0", "billing"),
    ("urn:www.cenbii.eu:profile:bii04:ver1.0", "bii04"),
    ("urn:www.cenbii.eu:profile:bii04:ver2.0", "bii04"),
    ("urn:www.cenbii.eu:profile:bii05:ver1.0", "bii05"),
    ("urn:www.cenbii.eu:profile:bii05:ver2.0", "bii05"),
    ("urn:www.cenbii.eu:profile:bii06:ver1.0", "bii06"),
];

fn resolve_known_profile(profile_id: &str) -> Option<String> {
    let profile_id = profile_id.trim();
    KNOWN_PROFILES
        .iter()
        .find(|(id, _)| *id == profile_id)
        .map(|(_, process)| (*process).to_string())
}

/// Policy switches for one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target: TargetVersion,
    pub profile_id_mandatory: bool,
    pub order_reference_mandatory: bool,
    /// Maximum length of the document order reference, if limited.
    pub order_reference_max_len: Option<usize>,
    pub delivery_date_mandatory: bool,
    pub payment_method_mandatory: bool,
    /// Used as biller email when the supplier party carries none.
    pub fallback_supplier_email: Option<String>,
    #[serde(skip)]
    pub profile_resolver: ProfileResolver,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: TargetVersion::default(),
            profile_id_mandatory: false,
            order_reference_mandatory: false,
            order_reference_max_len: None,
            delivery_date_mandatory: false,
            payment_method_mandatory: true,
            fallback_supplier_email: None,
            profile_resolver: ProfileResolver::default(),
        }
    }
}

impl Settings {
    /// Settings for invoices to the Austrian federal government
    /// (e-rechnung.gv.at): order reference of at most 35 characters and
    /// mandatory profile, delivery date and payment method.
    pub fn federal_government() -> Self {
        Self {
            profile_id_mandatory: true,
            order_reference_mandatory: true,
            order_reference_max_len: Some(35),
            delivery_date_mandatory: true,
            payment_method_mandatory: true,
            ..Self::default()
        }
    }

    pub fn target(mut self, version: TargetVersion) -> Self {
        self.target = version;
        self
    }

    pub fn profile_id_mandatory(mut self, mandatory: bool) -> Self {
        self.profile_id_mandatory = mandatory;
        self
    }

    pub fn order_reference_mandatory(mut self, mandatory: bool, max_len: Option<usize>) -> Self {
        self.order_reference_mandatory = mandatory;
        self.order_reference_max_len = max_len;
        self
    }

    pub fn delivery_date_mandatory(mut self, mandatory: bool) -> Self {
        self.delivery_date_mandatory = mandatory;
        self
    }

    pub fn payment_method_mandatory(mut self, mandatory: bool) -> Self {
        self.payment_method_mandatory = mandatory;
        self
    }

    pub fn fallback_supplier_email(mut self, email: impl Into<String>) -> Self {
        self.fallback_supplier_email = Some(email.into());
        self
    }

    pub fn profile_resolver(mut self, resolver: fn(&str) -> Option<String>) -> Self {
        self.profile_resolver = ProfileResolver(resolver);
        self
    }

    pub fn shape(&self) -> TargetShape {
        self.target.shape()
    }

    /// Parse settings from JSON. Missing keys keep their defaults.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(json).map_err(|e| ConvertError::Settings(e.to_string()))
    }
}
