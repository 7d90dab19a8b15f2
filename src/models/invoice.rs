use crate::error::InvoiceError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 发票类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    Sales,
    Purchase,
    Service,
    Other,
}

impl InvoiceType {
    pub const ALL: [InvoiceType; 4] = [
        InvoiceType::Sales,
        InvoiceType::Purchase,
        InvoiceType::Service,
        InvoiceType::Other,
    ];
}

/// 发票明细行，total 由 quantity × unit_price 推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ItemDraft")]
pub struct InvoiceItem {
    description: String,
    quantity: f64,
    unit_price: f64,
    total: f64,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Result<Self, InvoiceError> {
        let description = description.into();
        if quantity.is_nan() || quantity < 0.0 {
            return Err(InvoiceError::NegativeQuantity { description, quantity });
        }
        if unit_price.is_nan() || unit_price < 0.0 {
            return Err(InvoiceError::NegativeUnitPrice { description, unit_price });
        }
        Ok(Self {
            description,
            quantity,
            unit_price,
            total: quantity * unit_price,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// 调用方提交的明细行 (total 字段即使存在也会被忽略)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl TryFrom<ItemDraft> for InvoiceItem {
    type Error = InvoiceError;

    fn try_from(draft: ItemDraft) -> Result<Self, Self::Error> {
        InvoiceItem::new(draft.description, draft.quantity, draft.unit_price)
    }
}

/// 结构化发票数据
///
/// subtotal / tax_amount / total_amount 只能通过重新计算得到，没有独立的 setter。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "InvoiceDraft")]
pub struct InvoiceData {
    invoice_number: String,
    supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier_address: Option<String>,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    invoice_type: InvoiceType,
    items: Vec<InvoiceItem>,
    subtotal: f64,
    tax_rate: f64,
    tax_amount: f64,
    total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// 发票草稿：表头字段 + 明细 + 税率，构建时推导所有汇总字段
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub invoice_type: InvoiceType,
    pub items: Vec<ItemDraft>,
    pub tax_rate: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<InvoiceDraft> for InvoiceData {
    type Error = InvoiceError;

    fn try_from(draft: InvoiceDraft) -> Result<Self, Self::Error> {
        let items = draft
            .items
            .into_iter()
            .map(InvoiceItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        InvoiceData::new(
            InvoiceHeader {
                invoice_number: draft.invoice_number,
                supplier_name: draft.supplier_name,
                supplier_address: draft.supplier_address,
                invoice_date: draft.invoice_date,
                due_date: draft.due_date,
                invoice_type: draft.invoice_type,
                notes: draft.notes,
            },
            items,
            draft.tax_rate,
        )
    }
}

/// 非推导字段
#[derive(Debug, Clone)]
pub struct InvoiceHeader {
    pub invoice_number: String,
    pub supplier_name: String,
    pub supplier_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub invoice_type: InvoiceType,
    pub notes: Option<String>,
}

impl InvoiceData {
    pub fn new(header: InvoiceHeader, items: Vec<InvoiceItem>, tax_rate: f64) -> Result<Self, InvoiceError> {
        if tax_rate.is_nan() || tax_rate < 0.0 {
            return Err(InvoiceError::NegativeTaxRate(tax_rate));
        }

        let subtotal: f64 = items.iter().map(InvoiceItem::total).sum();
        let tax_amount = subtotal * tax_rate / 100.0;

        Ok(Self {
            invoice_number: header.invoice_number,
            supplier_name: header.supplier_name,
            supplier_address: header.supplier_address,
            invoice_date: header.invoice_date,
            due_date: header.due_date,
            invoice_type: header.invoice_type,
            items,
            subtotal,
            tax_rate,
            tax_amount,
            total_amount: subtotal + tax_amount,
            notes: header.notes,
        })
    }

    /// 编辑后的副本：替换明细并重新计算
    pub fn with_items(&self, items: Vec<InvoiceItem>) -> Self {
        // tax_rate 已在构建时校验过
        let subtotal: f64 = items.iter().map(InvoiceItem::total).sum();
        let tax_amount = subtotal * self.tax_rate / 100.0;
        Self {
            items,
            subtotal,
            tax_amount,
            total_amount: subtotal + tax_amount,
            ..self.clone()
        }
    }

    /// 编辑后的副本：替换税率并重新计算
    pub fn with_tax_rate(&self, tax_rate: f64) -> Result<Self, InvoiceError> {
        InvoiceData::new(self.header(), self.items.clone(), tax_rate)
    }

    pub fn header(&self) -> InvoiceHeader {
        InvoiceHeader {
            invoice_number: self.invoice_number.clone(),
            supplier_name: self.supplier_name.clone(),
            supplier_address: self.supplier_address.clone(),
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            invoice_type: self.invoice_type,
            notes: self.notes.clone(),
        }
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn supplier_address(&self) -> Option<&str> {
        self.supplier_address.as_deref()
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    pub fn tax_amount(&self) -> f64 {
        self.tax_amount
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
