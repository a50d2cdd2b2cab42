//! Target document model (ebInterface 4.x – 6.x).
//!
//! One model covers all supported schema versions; version-specific shape
//! differences are decided by [`TargetShape`](super::TargetShape) during
//! conversion, not by separate types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ebInterface `DocumentType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetDocumentType {
    Invoice,
    CreditMemo,
}

/// ebInterface root element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDocument {
    pub document_type: TargetDocumentType,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_currency: String,
    /// Document notes, newline-joined.
    pub comment: Option<String>,
    pub delivery: Option<TargetDelivery>,
    pub biller: TargetParty,
    pub invoice_recipient: TargetParty,
    /// `InvoiceRecipient/OrderReference/OrderID`.
    pub order_reference: Option<String>,
    pub items: Vec<ListLineItem>,
    pub reduction_and_surcharge: Option<ReductionAndSurchargeDetails>,
    pub tax: Tax,
    pub total_gross_amount: Decimal,
    pub prepaid_amount: Option<Decimal>,
    pub payable_amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub payment_conditions: Option<PaymentConditions>,
}

/// ebInterface `Delivery`: either a date or a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetDelivery {
    Date(NaiveDate),
    Period { from: NaiveDate, to: NaiveDate },
}

/// ebInterface `Biller` / `InvoiceRecipient`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetParty {
    pub vat_identification_number: String,
    pub address: TargetAddress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetAddress {
    pub name: String,
    pub street: Option<String>,
    pub town: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact: Option<String>,
    /// `AddressIdentifier` with its `AddressIdentifierType`.
    pub address_identifier: Option<AddressIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressIdentifier {
    pub kind: Option<String>,
    pub value: String,
}

/// ebInterface `ListLineItem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLineItem {
    pub position_number: u32,
    pub description: Vec<String>,
    pub article_number: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub base_quantity: Option<Decimal>,
    pub tax: LineTax,
    pub reductions: Vec<Adjustment>,
    pub surcharges: Vec<Adjustment>,
    pub line_item_amount: Decimal,
    pub order_position: Option<OrderPositionReference>,
    pub delivery_date: Option<NaiveDate>,
}

/// Tax treatment of one line: a rate or an exemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineTax {
    VatRate(Decimal),
    Exemption { reason: String },
}

impl LineTax {
    pub fn rate(&self) -> Decimal {
        match self {
            Self::VatRate(r) => *r,
            Self::Exemption { .. } => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPositionReference {
    pub order_id: String,
    pub order_position_number: Option<String>,
}

/// One reduction or surcharge, line or document level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub base_amount: Decimal,
    /// Whole-number percentage (10 = 10 %).
    pub percentage: Option<Decimal>,
    pub amount: Decimal,
    /// Only set on document level.
    pub vat_rate: Option<Decimal>,
    pub comment: Option<String>,
}

/// ebInterface `ReductionAndSurchargeDetails` (document level).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionAndSurchargeDetails {
    pub reductions: Vec<Adjustment>,
    pub surcharges: Vec<Adjustment>,
}

/// ebInterface `Tax`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tax {
    pub vat: Vec<VatItem>,
    pub other_tax: Vec<OtherTax>,
}

impl Tax {
    pub fn total_vat(&self) -> Decimal {
        self.vat.iter().map(|v| v.amount).sum()
    }
}

/// ebInterface `VAT/Item` (or `TaxItem` from 6.0 on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatItem {
    pub taxed_amount: Decimal,
    pub tax: LineTax,
    pub amount: Decimal,
}

/// ebInterface `OtherTax`, summed per tax scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTax {
    pub comment: String,
    pub amount: Decimal,
}

/// The single resolved payment method of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub kind: PaymentMethodKind,
    /// Instruction notes of the chosen payment means, newline-joined.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethodKind {
    NoPayment,
    DirectDebit,
    SepaDirectDebit(SepaDirectDebit),
    BankTransfer(BankTransfer),
}

/// ebInterface `UniversalBankTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransfer {
    /// `PaymentReference`, at most 35 characters.
    pub payment_reference: Option<String>,
    pub beneficiary_account: BeneficiaryAccount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryAccount {
    pub bank_name: Option<String>,
    pub bic: Option<String>,
    pub iban: Option<String>,
    pub bank_account_owner: Option<String>,
}

/// ebInterface `SEPADirectDebit`.
///
/// UBL does not carry these values, so conversions always leave them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SepaDirectDebit {
    pub debit_type: Option<String>,
    pub bic: Option<String>,
    pub iban: Option<String>,
    pub bank_account_owner: Option<String>,
    pub creditor_id: Option<String>,
    pub mandate_reference: Option<String>,
    pub debit_collection_date: Option<NaiveDate>,
}

/// ebInterface `PaymentConditions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConditions {
    pub due_date: Option<NaiveDate>,
    pub minimum_payment: Option<Decimal>,
    pub discounts: Vec<Discount>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub payment_date: NaiveDate,
    pub percentage: Decimal,
    pub amount: Option<Decimal>,
}
