//! Up-front consistency check. The only stage that can abort a conversion.

use crate::core::*;

/// Accepted `UBLVersionID` values.
pub const SUPPORTED_UBL_VERSIONS: &[&str] = &["2.0", "2.1", "2.2", "2.3", "2.4"];

/// Accepted `InvoiceTypeCode` values (UNTDID 1001).
pub const INVOICE_TYPE_CODES: &[&str] = &["380", "326", "384", "386", "389", "393"];

/// Accepted `CreditNoteTypeCode` values (UNTDID 1001).
pub const CREDIT_NOTE_TYPE_CODES: &[&str] = &["381", "396"];

/// Run the consistency checks. Returns `false` if an ERROR was recorded and
/// the conversion must stop.
pub fn precheck(doc: &SourceDocument, settings: &Settings, diags: &mut Diagnostics) -> bool {
    let errors_before = diags.error_count();

    if let Some(version) = doc.ubl_version_id.as_deref().map(str::trim) {
        if !SUPPORTED_UBL_VERSIONS.contains(&version) {
            diags.error(
                "ubl_version_id",
                format!(
                    "UBL version '{version}' is not supported, expected one of {}",
                    SUPPORTED_UBL_VERSIONS.join(", ")
                ),
            );
        }
    }

    match doc.profile_id.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        None if settings.profile_id_mandatory => {
            diags.error("profile_id", "profile id is missing");
        }
        None => {}
        Some(profile) => {
            if settings.profile_resolver.resolve(profile).is_none() {
                let message = format!("profile '{profile}' is not a known process");
                if settings.profile_id_mandatory {
                    diags.error("profile_id", message);
                } else {
                    diags.warn("profile_id", message);
                }
            }
        }
    }

    let type_code = doc.type_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    match (doc.kind, type_code) {
        (DocumentKind::Invoice, None) => diags.error("type_code", "invoice type code is missing"),
        (DocumentKind::Invoice, Some(code)) if !INVOICE_TYPE_CODES.contains(&code) => diags.error(
            "type_code",
            format!(
                "invoice type code '{code}' is not supported, expected one of {}",
                INVOICE_TYPE_CODES.join(", ")
            ),
        ),
        (DocumentKind::CreditNote, Some(code)) if !CREDIT_NOTE_TYPE_CODES.contains(&code) => diags
            .error(
                "type_code",
                format!(
                    "credit note type code '{code}' is not supported, expected one of {}",
                    CREDIT_NOTE_TYPE_CODES.join(", ")
                ),
            ),
        _ => {}
    }

    diags.error_count() == errors_before
}
