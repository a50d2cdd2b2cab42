//! Payment method resolution.
//!
//! Exactly one payment method is chosen from the declared payment means,
//! first supported candidate wins.

use chrono::NaiveDate;
use tracing::debug;

use crate::core::select::resolve_first;
use crate::core::*;

/// UNTDID 4461 codes of the credit transfer family.
pub const CREDIT_TRANSFER_CODES: &[&str] = &["30", "31", "42", "58"];
/// UNTDID 4461 direct debit.
pub const DIRECT_DEBIT_CODE: &str = "49";
/// UNTDID 4461 SEPA direct debit.
pub const SEPA_DIRECT_DEBIT_CODE: &str = "59";
/// `PaymentChannelCode` of IBAN-based transfers.
pub const IBAN_CHANNEL: &str = "IBAN";

/// Outcome of payment means processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentResolution {
    pub method: Option<PaymentMethod>,
    /// Due date declared on the chosen payment means.
    pub due_date: Option<NaiveDate>,
}

/// Candidate classification by code and channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeansFamily {
    BankTransfer,
    DirectDebit,
    SepaDirectDebit,
    Unsupported,
}

fn classify(means: &PaymentMeansCandidate) -> MeansFamily {
    let code = means.code.as_deref().map(str::trim).unwrap_or_default();
    let channel = means
        .channel_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if CREDIT_TRANSFER_CODES.contains(&code) && channel.is_none_or(|c| c == IBAN_CHANNEL) {
        MeansFamily::BankTransfer
    } else if code == DIRECT_DEBIT_CODE {
        MeansFamily::DirectDebit
    } else if code == SEPA_DIRECT_DEBIT_CODE {
        MeansFamily::SepaDirectDebit
    } else {
        MeansFamily::Unsupported
    }
}

/// Choose the payment method for `doc`.
pub fn resolve_payment(
    doc: &SourceDocument,
    settings: &Settings,
    diags: &mut Diagnostics,
) -> PaymentResolution {
    let shape = settings.shape();
    let payable_is_zero = doc.monetary_total.payable_amount.is_zero();

    let resolved = resolve_first(
        &doc.payment_means,
        diags,
        |i, means, diags| {
            let field = format!("payment_means[{i}]");
            let kind = match classify(means) {
                MeansFamily::BankTransfer => {
                    PaymentMethodKind::BankTransfer(bank_transfer(doc, means, &shape, &field, diags))
                }
                MeansFamily::DirectDebit => PaymentMethodKind::DirectDebit,
                MeansFamily::SepaDirectDebit if shape.sepa_direct_debit => {
                    PaymentMethodKind::SepaDirectDebit(SepaDirectDebit::default())
                }
                MeansFamily::SepaDirectDebit => PaymentMethodKind::DirectDebit,
                MeansFamily::Unsupported if payable_is_zero => PaymentMethodKind::NoPayment,
                MeansFamily::Unsupported => {
                    diags.error(
                        format!("{field}.code"),
                        format!(
                            "unsupported payment means code '{}' with channel '{}'; supported are {} (channel {IBAN_CHANNEL}), {DIRECT_DEBIT_CODE} and {SEPA_DIRECT_DEBIT_CODE}",
                            means.code.as_deref().unwrap_or_default(),
                            means.channel_code.as_deref().unwrap_or_default(),
                            CREDIT_TRANSFER_CODES.join("/"),
                        ),
                    );
                    return None;
                }
            };
            debug!(index = i, ?kind, "payment means resolved");
            Some(PaymentMethod {
                kind,
                comment: join_notes(&means.instruction_notes),
            })
        },
        |i, _, diags| {
            diags.warn(
                format!("payment_means[{i}]"),
                "ignored, an earlier payment means was already applied",
            );
        },
    );

    if let Some((i, method)) = resolved {
        return PaymentResolution {
            method: Some(method),
            due_date: doc.payment_means[i].due_date,
        };
    }

    if !settings.payment_method_mandatory {
        return PaymentResolution::default();
    }
    match doc.kind {
        DocumentKind::CreditNote => PaymentResolution {
            method: Some(PaymentMethod {
                kind: PaymentMethodKind::NoPayment,
                comment: None,
            }),
            due_date: None,
        },
        DocumentKind::Invoice => {
            diags.error("payment_means", "a payment method must be provided");
            PaymentResolution::default()
        }
    }
}

fn bank_transfer(
    doc: &SourceDocument,
    means: &PaymentMeansCandidate,
    shape: &TargetShape,
    field: &str,
    diags: &mut Diagnostics,
) -> BankTransfer {
    let reference = non_blank(means.instruction_id.as_deref())
        .map(|r| (r, "instruction_id"))
        .or_else(|| {
            means
                .payment_ids
                .iter()
                .map(String::as_str)
                .find_map(|id| non_blank(Some(id)))
                .map(|r| (r, "payment_ids"))
        })
        .map(|(r, source)| {
            truncate_with_warning(
                r,
                shape.max_payment_reference_len,
                &format!("{field}.{source}"),
                "payment reference",
                diags,
            )
        });

    BankTransfer {
        payment_reference: reference,
        beneficiary_account: beneficiary_account(doc, means, shape, field, diags),
    }
}

fn beneficiary_account(
    doc: &SourceDocument,
    means: &PaymentMeansCandidate,
    shape: &TargetShape,
    field: &str,
    diags: &mut Diagnostics,
) -> BeneficiaryAccount {
    let mut account = BeneficiaryAccount::default();
    let source = means.payee_account.as_ref();

    if let Some(branch) = source.and_then(|a| a.branch_id.as_ref()).filter(|b| !b.is_blank()) {
        let value = branch.value.trim();
        let bic_scheme = branch
            .scheme
            .as_deref()
            .is_none_or(|s| s.trim().eq_ignore_ascii_case("BIC"));
        if !bic_scheme {
            account.bank_name = Some(value.to_string());
        } else if is_valid_bic(value) {
            account.bic = Some(value.to_string());
        } else {
            diags.error(
                format!("{field}.payee_account.branch_id"),
                format!("BIC '{value}' is invalid and was dropped"),
            );
        }
    }
    if account.bank_name.is_none() {
        account.bank_name = non_blank(source.and_then(|a| a.institution_name.as_deref()))
            .map(String::from);
    }

    account.iban = non_blank(source.and_then(|a| a.id.as_deref())).map(|iban| {
        truncate_with_warning(
            iban,
            shape.max_iban_len,
            &format!("{field}.payee_account.id"),
            "IBAN",
            diags,
        )
    });

    account.bank_account_owner = non_blank(source.and_then(|a| a.name.as_deref()))
        .or_else(|| doc.payee.as_ref().and_then(first_name))
        .or_else(|| first_name(&doc.supplier))
        .map(String::from);

    account
}

fn first_name(party: &SourceParty) -> Option<&str> {
    party.names.iter().find_map(|n| non_blank(Some(n.as_str())))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn join_notes(notes: &[String]) -> Option<String> {
    let joined = notes
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!joined.is_empty()).then_some(joined)
}

/// Cut `value` to `max` characters, warning with the original value if it
/// was longer. Values within the limit are returned unchanged.
pub fn truncate_with_warning(
    value: &str,
    max: usize,
    field: &str,
    what: &str,
    diags: &mut Diagnostics,
) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let truncated: String = value.chars().take(max).collect();
    diags.warn(
        field,
        format!("{what} '{value}' exceeds {max} characters and was truncated to '{truncated}'"),
    );
    truncated
}

/// BIC format check (ISO 9362): 4 letters bank code, 2 letters country,
/// 2 alphanumeric location, optional 3 alphanumeric branch.
pub fn is_valid_bic(bic: &str) -> bool {
    let b = bic.as_bytes();
    (b.len() == 8 || b.len() == 11)
        && b[..6].iter().all(u8::is_ascii_alphabetic)
        && b[6..].iter().all(u8::is_ascii_alphanumeric)
}
