//! Biller / invoice recipient mapping.

use crate::core::select::{first_non_blank, resolve_first};
use crate::core::*;

/// VAT id used for parties that declare none.
pub const VAT_ID_PLACEHOLDER: &str = "00000000";

/// Map a source party. `field` is the party's path, e.g. "supplier".
pub fn map_party(
    party: &SourceParty,
    field: &str,
    fallback_email: Option<&str>,
    diags: &mut Diagnostics,
) -> TargetParty {
    let name = first_non_blank(&party.names, diags, |i, name, d| {
        d.warn(
            format!("{field}.names[{i}]"),
            format!("additional party name '{name}' ignored"),
        )
    })
    .or_else(|| trimmed(party.registration_name.as_deref()));
    let name = match name {
        Some(n) => n.to_string(),
        None => {
            diags.error(format!("{field}.names"), "party has no name");
            String::new()
        }
    };

    let vat_id = match first_non_blank(&party.tax_company_ids, diags, |i, id, d| {
        d.warn(
            format!("{field}.tax_company_ids[{i}]"),
            format!("additional VAT id '{id}' ignored"),
        )
    }) {
        Some(id) => id.to_string(),
        None => {
            diags.warn(
                format!("{field}.tax_company_ids"),
                format!("party has no VAT id, using '{VAT_ID_PLACEHOLDER}'"),
            );
            VAT_ID_PLACEHOLDER.to_string()
        }
    };

    let address_identifier = resolve_first(
        &party.identifiers,
        diags,
        |_, id, _| {
            (!id.is_blank()).then(|| AddressIdentifier {
                kind: trimmed(id.scheme.as_deref()).map(String::from),
                value: id.value.trim().to_string(),
            })
        },
        |i, id, d| {
            if !id.is_blank() {
                d.warn(
                    format!("{field}.identifiers[{i}]"),
                    format!("additional party identifier '{}' ignored", id.value.trim()),
                )
            }
        },
    )
    .map(|(_, id)| id);

    let source = party.address.clone().unwrap_or_default();
    let street = match (trimmed(source.street_name.as_deref()), trimmed(source.building_number.as_deref())) {
        (Some(s), Some(n)) => Some(format!("{s} {n}")),
        (Some(s), None) => Some(s.to_string()),
        (None, _) => trimmed(source.additional_street_name.as_deref()).map(String::from),
    };

    let email = trimmed(party.email.as_deref())
        .or_else(|| trimmed(fallback_email))
        .map(String::from);

    TargetParty {
        vat_identification_number: vat_id,
        address: TargetAddress {
            name,
            street,
            town: trimmed(source.city_name.as_deref()).map(String::from),
            zip: trimmed(source.postal_zone.as_deref()).map(String::from),
            country_code: trimmed(source.country_code.as_deref()).map(String::from),
            email,
            phone: trimmed(party.telephone.as_deref()).map(String::from),
            contact: trimmed(party.contact_name.as_deref()).map(String::from),
            address_identifier,
        },
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
