use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ConvertError;
use super::source::*;

/// Builder for source documents.
///
/// The engine normally receives documents from an external UBL parser; the
/// builder exists for callers that assemble documents in code and for tests.
///
/// ```
/// use ebwandler::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let doc = SourceDocumentBuilder::new("INV-1", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
///     .supplier(SourcePartyBuilder::new("ACME GmbH").vat_id("ATU12345678").build())
///     .customer(SourcePartyBuilder::new("Kunde AG").build())
///     .add_tax_subtotal(TaxSubtotalBuilder::vat("S").percent(dec!(20)).taxable_amount(dec!(100)).build())
///     .payable_amount(dec!(120))
///     .build()
///     .unwrap();
/// assert_eq!(doc.tax_subtotals.len(), 1);
/// ```
pub struct SourceDocumentBuilder {
    kind: DocumentKind,
    ubl_version_id: Option<String>,
    customization_id: Option<String>,
    profile_id: Option<String>,
    id: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    type_code: Option<String>,
    notes: Vec<String>,
    currency_code: String,
    order_reference: Option<String>,
    invoice_period: Option<SourcePeriod>,
    supplier: Option<SourceParty>,
    customer: Option<SourceParty>,
    payee: Option<SourceParty>,
    delivery: Option<SourceDelivery>,
    payment_means: Vec<PaymentMeansCandidate>,
    payment_terms: Vec<PaymentTerms>,
    allowance_charges: Vec<AdjustmentEntry>,
    tax_subtotals: Vec<TaxSubtotal>,
    monetary_total: MonetaryTotal,
    lines: Vec<SourceLine>,
}

impl SourceDocumentBuilder {
    /// Start an invoice with type code 380 and currency EUR.
    pub fn new(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            kind: DocumentKind::Invoice,
            ubl_version_id: Some("2.1".into()),
            customization_id: None,
            profile_id: None,
            id: id.into(),
            issue_date,
            due_date: None,
            type_code: Some("380".into()),
            notes: Vec::new(),
            currency_code: "EUR".into(),
            order_reference: None,
            invoice_period: None,
            supplier: None,
            customer: None,
            payee: None,
            delivery: None,
            payment_means: Vec::new(),
            payment_terms: Vec::new(),
            allowance_charges: Vec::new(),
            tax_subtotals: Vec::new(),
            monetary_total: MonetaryTotal::default(),
            lines: Vec::new(),
        }
    }

    /// Start a credit note with type code 381.
    pub fn credit_note(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            kind: DocumentKind::CreditNote,
            type_code: Some("381".into()),
            ..Self::new(id, issue_date)
        }
    }

    pub fn ubl_version_id(mut self, version: Option<&str>) -> Self {
        self.ubl_version_id = version.map(String::from);
        self
    }

    pub fn customization_id(mut self, id: impl Into<String>) -> Self {
        self.customization_id = Some(id.into());
        self
    }

    pub fn profile_id(mut self, id: impl Into<String>) -> Self {
        self.profile_id = Some(id.into());
        self
    }

    pub fn type_code(mut self, code: Option<&str>) -> Self {
        self.type_code = code.map(String::from);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn order_reference(mut self, reference: impl Into<String>) -> Self {
        self.order_reference = Some(reference.into());
        self
    }

    pub fn invoice_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.invoice_period = Some(SourcePeriod {
            start: Some(start),
            end: Some(end),
        });
        self
    }

    pub fn supplier(mut self, party: SourceParty) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: SourceParty) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn payee(mut self, party: SourceParty) -> Self {
        self.payee = Some(party);
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery = Some(SourceDelivery {
            actual_date: Some(date),
        });
        self
    }

    pub fn add_payment_means(mut self, means: PaymentMeansCandidate) -> Self {
        self.payment_means.push(means);
        self
    }

    pub fn add_payment_terms(mut self, terms: PaymentTerms) -> Self {
        self.payment_terms.push(terms);
        self
    }

    pub fn add_allowance_charge(mut self, entry: AdjustmentEntry) -> Self {
        self.allowance_charges.push(entry);
        self
    }

    pub fn add_tax_subtotal(mut self, subtotal: TaxSubtotal) -> Self {
        self.tax_subtotals.push(subtotal);
        self
    }

    pub fn monetary_total(mut self, total: MonetaryTotal) -> Self {
        self.monetary_total = total;
        self
    }

    pub fn payable_amount(mut self, amount: Decimal) -> Self {
        self.monetary_total.payable_amount = amount;
        self
    }

    pub fn add_line(mut self, line: SourceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> Result<SourceDocument, ConvertError> {
        let supplier = self
            .supplier
            .ok_or_else(|| ConvertError::Builder("supplier party is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| ConvertError::Builder("customer party is required".into()))?;
        if self.id.trim().is_empty() {
            return Err(ConvertError::Builder("document id must not be empty".into()));
        }

        Ok(SourceDocument {
            kind: self.kind,
            ubl_version_id: self.ubl_version_id,
            customization_id: self.customization_id,
            profile_id: self.profile_id,
            id: self.id,
            issue_date: self.issue_date,
            due_date: self.due_date,
            type_code: self.type_code,
            notes: self.notes,
            currency_code: self.currency_code,
            order_reference: self.order_reference,
            invoice_period: self.invoice_period,
            supplier,
            customer,
            payee: self.payee,
            delivery: self.delivery,
            payment_means: self.payment_means,
            payment_terms: self.payment_terms,
            allowance_charges: self.allowance_charges,
            tax_subtotals: self.tax_subtotals,
            monetary_total: self.monetary_total,
            lines: self.lines,
        })
    }
}

/// Builder for source parties.
pub struct SourcePartyBuilder {
    party: SourceParty,
}

impl SourcePartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            party: SourceParty {
                names: vec![name.into()],
                ..SourceParty::default()
            },
        }
    }

    /// A party without any `PartyName`.
    pub fn unnamed() -> Self {
        Self {
            party: SourceParty::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.party.names.push(name.into());
        self
    }

    pub fn registration_name(mut self, name: impl Into<String>) -> Self {
        self.party.registration_name = Some(name.into());
        self
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.party.tax_company_ids.push(id.into());
        self
    }

    pub fn identifier(mut self, id: SchemedId) -> Self {
        self.party.identifiers.push(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.party.email = Some(email.into());
        self
    }

    pub fn telephone(mut self, phone: impl Into<String>) -> Self {
        self.party.telephone = Some(phone.into());
        self
    }

    pub fn contact_name(mut self, name: impl Into<String>) -> Self {
        self.party.contact_name = Some(name.into());
        self
    }

    pub fn address(
        mut self,
        street: impl Into<String>,
        postal_zone: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        self.party.address = Some(SourceAddress {
            street_name: Some(street.into()),
            postal_zone: Some(postal_zone.into()),
            city_name: Some(city.into()),
            country_code: Some(country_code.into()),
            ..SourceAddress::default()
        });
        self
    }

    pub fn build(self) -> SourceParty {
        self.party
    }
}

/// Builder for source lines.
pub struct SourceLineBuilder {
    line: SourceLine,
}

impl SourceLineBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: Decimal, unit: &str) -> Self {
        Self {
            line: SourceLine {
                id: id.into(),
                notes: Vec::new(),
                quantity,
                unit_code: Some(unit.to_string()),
                line_extension_amount: None,
                order_line_id: None,
                order_reference: None,
                delivery_date: None,
                allowance_charges: Vec::new(),
                item: SourceItem {
                    name: Some(name.into()),
                    ..SourceItem::default()
                },
                price: None,
            },
        }
    }

    pub fn unit(mut self, unit: Option<&str>) -> Self {
        self.line.unit_code = unit.map(String::from);
        self
    }

    pub fn price(mut self, amount: Decimal) -> Self {
        self.line.price = Some(SourcePrice {
            amount,
            base_quantity: None,
        });
        self
    }

    pub fn price_per(mut self, amount: Decimal, base_quantity: Decimal) -> Self {
        self.line.price = Some(SourcePrice {
            amount,
            base_quantity: Some(base_quantity),
        });
        self
    }

    pub fn line_extension(mut self, amount: Decimal) -> Self {
        self.line.line_extension_amount = Some(amount);
        self
    }

    pub fn tax(mut self, category: TaxCategoryRef) -> Self {
        self.line.item.tax_category = Some(category);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.line.item.descriptions.push(text.into());
        self
    }

    pub fn sellers_item_id(mut self, id: impl Into<String>) -> Self {
        self.line.item.sellers_item_id = Some(id.into());
        self
    }

    pub fn order_line(mut self, order_id: Option<&str>, line_id: impl Into<String>) -> Self {
        self.line.order_reference = order_id.map(String::from);
        self.line.order_line_id = Some(line_id.into());
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.line.delivery_date = Some(date);
        self
    }

    pub fn add_allowance_charge(mut self, entry: AdjustmentEntry) -> Self {
        self.line.allowance_charges.push(entry);
        self
    }

    pub fn build(self) -> SourceLine {
        self.line
    }
}

/// Builder for `cac:TaxCategory` references.
pub struct TaxCategoryBuilder {
    category: TaxCategoryRef,
}

impl TaxCategoryBuilder {
    /// Category `id` (UNCL5305) under the VAT tax scheme.
    pub fn vat(id: &str) -> Self {
        Self::new(Some(id), Some("VAT"))
    }

    pub fn new(id: Option<&str>, scheme: Option<&str>) -> Self {
        Self {
            category: TaxCategoryRef {
                id: id.map(|v| SchemedId::new("UNCL5305", v)),
                percent: None,
                tax_scheme: scheme.map(|s| SchemedId::new("UN/ECE 5153", s)),
                exemption_reason: None,
            },
        }
    }

    pub fn percent(mut self, percent: Decimal) -> Self {
        self.category.percent = Some(percent);
        self
    }

    pub fn exemption_reason(mut self, reason: impl Into<String>) -> Self {
        self.category.exemption_reason = Some(reason.into());
        self
    }

    pub fn build(self) -> TaxCategoryRef {
        self.category
    }
}

/// Builder for `cac:TaxSubtotal`.
pub struct TaxSubtotalBuilder {
    subtotal: TaxSubtotal,
}

impl TaxSubtotalBuilder {
    /// Subtotal for category `id` under the VAT tax scheme.
    pub fn vat(id: &str) -> Self {
        Self::for_category(TaxCategoryBuilder::vat(id).build())
    }

    pub fn for_category(category: TaxCategoryRef) -> Self {
        Self {
            subtotal: TaxSubtotal {
                taxable_amount: None,
                tax_amount: None,
                percent: None,
                category,
            },
        }
    }

    /// Percent on the subtotal's tax category.
    pub fn percent(mut self, percent: Decimal) -> Self {
        self.subtotal.category.percent = Some(percent);
        self
    }

    pub fn taxable_amount(mut self, amount: Decimal) -> Self {
        self.subtotal.taxable_amount = Some(amount);
        self
    }

    pub fn tax_amount(mut self, amount: Decimal) -> Self {
        self.subtotal.tax_amount = Some(amount);
        self
    }

    pub fn exemption_reason(mut self, reason: impl Into<String>) -> Self {
        self.subtotal.category.exemption_reason = Some(reason.into());
        self
    }

    pub fn build(self) -> TaxSubtotal {
        self.subtotal
    }
}

impl AdjustmentEntry {
    /// An allowance (reduction) of `amount`.
    pub fn reduction(amount: Decimal) -> Self {
        Self {
            is_charge: false,
            amount,
            base_amount: None,
            multiplier_factor: None,
            tax_categories: Vec::new(),
            reasons: Vec::new(),
        }
    }

    /// A charge (surcharge) of `amount`.
    pub fn surcharge(amount: Decimal) -> Self {
        Self {
            is_charge: true,
            ..Self::reduction(amount)
        }
    }

    pub fn with_base(mut self, base: Decimal) -> Self {
        self.base_amount = Some(base);
        self
    }

    pub fn with_multiplier(mut self, factor: Decimal) -> Self {
        self.multiplier_factor = Some(factor);
        self
    }

    pub fn with_tax(mut self, category: TaxCategoryRef) -> Self {
        self.tax_categories.push(category);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }
}

impl PaymentMeansCandidate {
    /// Payment means with a UNTDID 4461 code.
    pub fn new(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel_code = Some(channel.into());
        self
    }

    pub fn with_instruction_id(mut self, id: impl Into<String>) -> Self {
        self.instruction_id = Some(id.into());
        self
    }

    pub fn with_payment_id(mut self, id: impl Into<String>) -> Self {
        self.payment_ids.push(id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.instruction_notes.push(note.into());
        self
    }

    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_account(mut self, account: FinancialAccount) -> Self {
        self.payee_account = Some(account);
        self
    }
}

impl FinancialAccount {
    pub fn iban(iban: impl Into<String>) -> Self {
        Self {
            id: Some(iban.into()),
            ..Self::default()
        }
    }

    /// Branch id declared with scheme "BIC".
    pub fn with_bic(mut self, bic: impl Into<String>) -> Self {
        self.branch_id = Some(SchemedId::new("BIC", bic));
        self
    }

    pub fn with_branch(mut self, branch: SchemedId) -> Self {
        self.branch_id = Some(branch);
        self
    }

    pub fn with_owner(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_institution(mut self, name: impl Into<String>) -> Self {
        self.institution_name = Some(name.into());
        self
    }
}

impl PaymentTerms {
    pub fn due(date: NaiveDate) -> Self {
        Self {
            due_date: Some(date),
            ..Self::default()
        }
    }

    /// Settlement discount of `percent` until `end`.
    pub fn discount(percent: Decimal, end: Option<NaiveDate>) -> Self {
        Self {
            settlement_discount_percent: Some(percent),
            settlement_period_end: end,
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_payment_percent(mut self, percent: Decimal) -> Self {
        self.payment_percent = Some(percent);
        self
    }

    pub fn with_discount_amount(mut self, amount: Decimal) -> Self {
        self.settlement_discount_amount = Some(amount);
        self
    }

    pub fn with_penalty_percent(mut self, percent: Decimal) -> Self {
        self.penalty_surcharge_percent = Some(percent);
        self
    }
}
