//! Source document model (UBL 2.x Invoice / CreditNote).
//!
//! Field names follow the UBL element names they are parsed from. Only the
//! subset the reconciliation engine reads is modelled.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An identifier value qualified by its scheme (`schemeID` attribute).
///
/// Two ids are equal only if both scheme and value are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemedId {
    pub scheme: Option<String>,
    pub value: String,
}

impl SchemedId {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            value: value.into(),
        }
    }

    /// An id without a `schemeID` attribute.
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            scheme: None,
            value: value.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Root element of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice,
    CreditNote,
}

/// A parsed UBL Invoice or CreditNote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub kind: DocumentKind,
    /// `cbc:UBLVersionID`.
    pub ubl_version_id: Option<String>,
    /// `cbc:CustomizationID`.
    pub customization_id: Option<String>,
    /// `cbc:ProfileID`.
    pub profile_id: Option<String>,
    /// `cbc:ID`.
    pub id: String,
    pub issue_date: NaiveDate,
    /// `cbc:DueDate` (top level, invoices only).
    pub due_date: Option<NaiveDate>,
    /// `cbc:InvoiceTypeCode` / `cbc:CreditNoteTypeCode`.
    pub type_code: Option<String>,
    pub notes: Vec<String>,
    pub currency_code: String,
    pub order_reference: Option<String>,
    pub invoice_period: Option<SourcePeriod>,
    pub supplier: SourceParty,
    pub customer: SourceParty,
    pub payee: Option<SourceParty>,
    pub delivery: Option<SourceDelivery>,
    pub payment_means: Vec<PaymentMeansCandidate>,
    pub payment_terms: Vec<PaymentTerms>,
    /// Document-level `cac:AllowanceCharge` entries.
    pub allowance_charges: Vec<AdjustmentEntry>,
    /// All `cac:TaxSubtotal` entries of all `cac:TaxTotal` elements, in order.
    pub tax_subtotals: Vec<TaxSubtotal>,
    pub monetary_total: MonetaryTotal,
    pub lines: Vec<SourceLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePeriod {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDelivery {
    pub actual_date: Option<NaiveDate>,
}

/// `cac:Party` as found in supplier, customer and payee roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceParty {
    /// `cac:PartyIdentification/cbc:ID` entries.
    pub identifiers: Vec<SchemedId>,
    /// `cac:PartyName/cbc:Name` entries.
    pub names: Vec<String>,
    /// `cac:PartyLegalEntity/cbc:RegistrationName`.
    pub registration_name: Option<String>,
    /// `cac:PartyTaxScheme/cbc:CompanyID` entries.
    pub tax_company_ids: Vec<String>,
    pub address: Option<SourceAddress>,
    /// `cac:Contact/cbc:ElectronicMail`.
    pub email: Option<String>,
    /// `cac:Contact/cbc:Telephone`.
    pub telephone: Option<String>,
    /// `cac:Contact/cbc:Name`.
    pub contact_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceAddress {
    pub street_name: Option<String>,
    pub building_number: Option<String>,
    pub additional_street_name: Option<String>,
    pub city_name: Option<String>,
    pub postal_zone: Option<String>,
    pub country_code: Option<String>,
}

/// `cac:PaymentMeans`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMeansCandidate {
    /// `cbc:PaymentMeansCode` (UNTDID 4461).
    pub code: Option<String>,
    /// `cbc:PaymentChannelCode`.
    pub channel_code: Option<String>,
    /// `cbc:InstructionID`.
    pub instruction_id: Option<String>,
    /// `cbc:InstructionNote` entries.
    pub instruction_notes: Vec<String>,
    /// `cbc:PaymentID` entries, in declaration order.
    pub payment_ids: Vec<String>,
    /// `cbc:PaymentDueDate`.
    pub due_date: Option<NaiveDate>,
    /// `cac:PayeeFinancialAccount`.
    pub payee_account: Option<FinancialAccount>,
}

/// `cac:PayeeFinancialAccount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialAccount {
    /// `cbc:ID`, the IBAN for IBAN-channel transfers.
    pub id: Option<String>,
    /// `cbc:Name`, the account owner.
    pub name: Option<String>,
    /// `cac:FinancialInstitutionBranch/cbc:ID` with its scheme.
    pub branch_id: Option<SchemedId>,
    /// `cac:FinancialInstitution/cbc:Name`.
    pub institution_name: Option<String>,
}

/// `cac:PaymentTerms`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub notes: Vec<String>,
    /// `cbc:PaymentDueDate`.
    pub due_date: Option<NaiveDate>,
    /// `cbc:PaymentPercent`.
    pub payment_percent: Option<Decimal>,
    /// `cbc:SettlementDiscountPercent`.
    pub settlement_discount_percent: Option<Decimal>,
    /// `cbc:SettlementDiscountAmount`.
    pub settlement_discount_amount: Option<Decimal>,
    /// `cac:SettlementPeriod/cbc:EndDate`.
    pub settlement_period_end: Option<NaiveDate>,
    /// `cbc:PenaltySurchargePercent`.
    pub penalty_surcharge_percent: Option<Decimal>,
}

/// `cac:AllowanceCharge`, on document or line level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    /// `cbc:ChargeIndicator`: true = surcharge, false = reduction.
    pub is_charge: bool,
    pub amount: Decimal,
    pub base_amount: Option<Decimal>,
    /// `cbc:MultiplierFactorNumeric`, a fraction (0.1 = 10 %).
    pub multiplier_factor: Option<Decimal>,
    /// `cac:TaxCategory` entries.
    pub tax_categories: Vec<TaxCategoryRef>,
    /// `cbc:AllowanceChargeReason` entries.
    pub reasons: Vec<String>,
}

/// `cac:TaxCategory` reference (on adjustments and line items).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxCategoryRef {
    /// `cbc:ID`.
    pub id: Option<SchemedId>,
    /// `cbc:Percent`.
    pub percent: Option<Decimal>,
    /// `cac:TaxScheme/cbc:ID`.
    pub tax_scheme: Option<SchemedId>,
    /// `cbc:TaxExemptionReason`.
    pub exemption_reason: Option<String>,
}

/// `cac:TaxSubtotal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSubtotal {
    pub taxable_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    /// `cbc:Percent` on the subtotal itself.
    pub percent: Option<Decimal>,
    pub category: TaxCategoryRef,
}

/// `cac:LegalMonetaryTotal`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonetaryTotal {
    pub line_extension_amount: Option<Decimal>,
    pub tax_exclusive_amount: Option<Decimal>,
    pub tax_inclusive_amount: Option<Decimal>,
    pub allowance_total_amount: Option<Decimal>,
    pub charge_total_amount: Option<Decimal>,
    pub prepaid_amount: Option<Decimal>,
    pub payable_amount: Decimal,
}

/// `cac:InvoiceLine` / `cac:CreditNoteLine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLine {
    pub id: String,
    pub notes: Vec<String>,
    /// `cbc:InvoicedQuantity` / `cbc:CreditedQuantity`.
    pub quantity: Decimal,
    /// `unitCode` attribute of the quantity.
    pub unit_code: Option<String>,
    pub line_extension_amount: Option<Decimal>,
    /// `cac:OrderLineReference/cbc:LineID`.
    pub order_line_id: Option<String>,
    /// `cac:OrderLineReference/cac:OrderReference/cbc:ID`.
    pub order_reference: Option<String>,
    /// `cac:Delivery/cbc:ActualDeliveryDate`.
    pub delivery_date: Option<NaiveDate>,
    pub allowance_charges: Vec<AdjustmentEntry>,
    pub item: SourceItem,
    pub price: Option<SourcePrice>,
}

/// `cac:Item`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceItem {
    pub name: Option<String>,
    pub descriptions: Vec<String>,
    pub sellers_item_id: Option<String>,
    pub standard_item_id: Option<SchemedId>,
    /// `cac:ClassifiedTaxCategory`.
    pub tax_category: Option<TaxCategoryRef>,
}

/// `cac:Price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePrice {
    pub amount: Decimal,
    pub base_quantity: Option<Decimal>,
}
