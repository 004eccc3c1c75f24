// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::numeric::{decimal_or_zero, parse_int_prefix};
use crate::{LookupId, LookupOption, RowIndex};

/// One serialized invoice line, as the server expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    #[serde(rename = "item")]
    pub item_id: LookupId,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(rename = "qty")]
    pub quantity: i64,
    #[serde(rename = "tax", with = "rust_decimal::serde::float")]
    pub tax_percent: Decimal,
    #[serde(skip)]
    pub computed_total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColumn {
    Item,
    Rate,
    Quantity,
    Tax,
}

impl LineColumn {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Rate => "rate",
            Self::Quantity => "qty",
            Self::Tax => "tax",
        }
    }
}

/// `rate * quantity * (1 + tax/100)`, rounded half away from zero to cents.
/// Totals too large to represent come out as zero.
pub fn line_total(rate: Decimal, quantity: Decimal, tax_percent: Decimal) -> Decimal {
    let multiplier = tax_percent
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| fraction.checked_add(Decimal::ONE));
    rate.checked_mul(quantity)
        .zip(multiplier)
        .and_then(|(gross, multiplier)| gross.checked_mul(multiplier))
        .map(|total| total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

/// Rows pre-rendered by the host page in edit mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingRow {
    pub item: Option<LookupId>,
    pub rate: String,
    pub quantity: String,
    pub tax: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRow {
    index: RowIndex,
    item: Option<LookupId>,
    rate: String,
    quantity: String,
    tax: String,
    total: Decimal,
    choices: Vec<LookupOption>,
}

impl LineRow {
    fn blank(index: RowIndex) -> Self {
        Self {
            index,
            item: None,
            rate: String::new(),
            quantity: "1".to_owned(),
            tax: String::new(),
            total: Decimal::ZERO,
            choices: Vec::new(),
        }
    }

    pub fn index(&self) -> RowIndex {
        self.index
    }

    pub fn item(&self) -> Option<LookupId> {
        self.item
    }

    pub fn input(&self, column: LineColumn) -> String {
        match column {
            LineColumn::Item => self.item.map(|id| id.to_string()).unwrap_or_default(),
            LineColumn::Rate => self.rate.clone(),
            LineColumn::Quantity => self.quantity.clone(),
            LineColumn::Tax => self.tax.clone(),
        }
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Total as displayed: always two decimals.
    pub fn total_text(&self) -> String {
        format!("{:.2}", self.total)
    }

    pub fn choices(&self) -> &[LookupOption] {
        &self.choices
    }

    /// Generated input name, e.g. `items[3][rate]`.
    pub fn field_name(&self, column: LineColumn) -> String {
        format!("items[{}][{}]", self.index, column.key())
    }

    fn recompute(&mut self) -> Decimal {
        self.total = line_total(
            decimal_or_zero(&self.rate),
            decimal_or_zero(&self.quantity),
            decimal_or_zero(&self.tax),
        );
        self.total
    }

    fn serialize(&self) -> Option<LineItem> {
        let item_id = self.item?;
        let quantity = parse_int_prefix(&self.quantity)
            .filter(|quantity| *quantity >= 1)
            .unwrap_or(1);
        Some(LineItem {
            item_id,
            rate: decimal_or_zero(&self.rate),
            quantity,
            tax_percent: decimal_or_zero(&self.tax),
            computed_total: self.total,
        })
    }
}

/// Editable set of invoice line rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemEditor {
    rows: Vec<LineRow>,
    next_index: i64,
}

impl LineItemEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit mode: adopts the rows the host page already rendered.
    pub fn with_existing(rows: Vec<ExistingRow>) -> Self {
        let mut editor = Self::new();
        for existing in rows {
            let index = editor.add_row();
            if let Some(row) = editor.row_mut(index) {
                row.item = existing.item;
                row.rate = existing.rate;
                row.quantity = existing.quantity;
                row.tax = existing.tax;
                row.recompute();
            }
        }
        editor
    }

    pub fn rows(&self) -> &[LineRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: RowIndex) -> Option<&LineRow> {
        self.rows.iter().find(|row| row.index == index)
    }

    fn row_mut(&mut self, index: RowIndex) -> Option<&mut LineRow> {
        self.rows.iter_mut().find(|row| row.index == index)
    }

    /// Appends a blank row. Indexes are never reused, even after removals.
    pub fn add_row(&mut self) -> RowIndex {
        let index = RowIndex::new(self.next_index);
        self.next_index += 1;
        self.rows.push(LineRow::blank(index));
        index
    }

    pub fn remove_row(&mut self, index: RowIndex) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.index != index);
        self.rows.len() != before
    }

    pub fn set_item_choices(&mut self, index: RowIndex, choices: Vec<LookupOption>) -> bool {
        match self.row_mut(index) {
            Some(row) => {
                row.choices = choices;
                true
            }
            None => false,
        }
    }

    pub fn select_item(&mut self, index: RowIndex, item: Option<LookupId>) -> bool {
        match self.row_mut(index) {
            Some(row) => {
                row.item = item;
                true
            }
            None => false,
        }
    }

    /// Records typed input for a numeric column and refreshes the row total.
    /// The typed text is stored exactly as given.
    pub fn input(&mut self, index: RowIndex, column: LineColumn, value: &str) -> Option<Decimal> {
        let row = self.row_mut(index)?;
        match column {
            LineColumn::Rate => row.rate = value.to_owned(),
            LineColumn::Quantity => row.quantity = value.to_owned(),
            LineColumn::Tax => row.tax = value.to_owned(),
            LineColumn::Item => {
                row.item = value.trim().parse::<i64>().ok().map(LookupId::new);
                return Some(row.total);
            }
        }
        Some(row.recompute())
    }

    pub fn recompute_row(&mut self, index: RowIndex) -> Option<Decimal> {
        self.row_mut(index).map(LineRow::recompute)
    }

    /// Rows with an item selected, in display order.
    pub fn serialize(&self) -> Vec<LineItem> {
        self.rows.iter().filter_map(LineRow::serialize).collect()
    }

    /// Line totals as the server stores them: serialized rows only, at the
    /// integer quantity they are sent with.
    pub fn saved_totals(&self) -> Vec<Decimal> {
        self.serialize()
            .iter()
            .map(|item| line_total(item.rate, Decimal::from(item.quantity), item.tax_percent))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ExistingRow, LineColumn, LineItemEditor, line_total};
    use crate::{LookupId, RowIndex};
    use rust_decimal::Decimal;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("valid decimal literal")
    }

    #[test]
    fn total_applies_tax_and_rounds_to_cents() {
        assert_eq!(line_total(dec("100"), dec("2"), dec("18")), dec("236.00"));
        assert_eq!(line_total(dec("10.005"), dec("1"), dec("0")), dec("10.01"));
        assert_eq!(line_total(dec("33.33"), dec("3"), dec("5")), dec("104.99"));
        assert_eq!(line_total(dec("0"), dec("5"), dec("12")), Decimal::ZERO);
    }

    #[test]
    fn total_matches_formula_across_inputs() {
        for rate in ["0", "1.25", "99.99", "1500"] {
            for quantity in ["0", "1", "3", "12"] {
                for tax in ["0", "5", "12.5", "28"] {
                    let (r, q, t) = (dec(rate), dec(quantity), dec(tax));
                    let expected = (r * q * (Decimal::ONE + t / Decimal::ONE_HUNDRED))
                        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
                    assert_eq!(line_total(r, q, t), expected, "{rate} x {quantity} @ {tax}%");
                }
            }
        }
    }

    #[test]
    fn new_row_defaults_to_quantity_one_and_zero_total() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        let row = editor.row(index).expect("row exists");
        assert_eq!(row.input(LineColumn::Quantity), "1");
        assert_eq!(row.total_text(), "0.00");
        assert_eq!(row.field_name(LineColumn::Rate), "items[0][rate]");
    }

    #[test]
    fn indexes_keep_increasing_after_removal() {
        let mut editor = LineItemEditor::new();
        let first = editor.add_row();
        let second = editor.add_row();
        assert!(editor.remove_row(first));
        let third = editor.add_row();
        assert_eq!(second, RowIndex::new(1));
        assert_eq!(third, RowIndex::new(2));
        assert_eq!(editor.len(), 2);
        assert!(!editor.remove_row(first));
    }

    #[test]
    fn input_recomputes_without_touching_typed_text() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        editor.input(index, LineColumn::Rate, "12.");
        let total = editor.input(index, LineColumn::Tax, "10abc");
        assert_eq!(total, Some(dec("13.20")));

        let row = editor.row(index).expect("row exists");
        assert_eq!(row.input(LineColumn::Rate), "12.");
        assert_eq!(row.input(LineColumn::Tax), "10abc");
        assert_eq!(row.total_text(), "13.20");
    }

    #[test]
    fn unparsable_inputs_count_as_zero() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        editor.input(index, LineColumn::Rate, "abc");
        assert_eq!(editor.recompute_row(index), Some(Decimal::ZERO));
    }

    #[test]
    fn serialize_skips_rows_without_item_and_keeps_order() {
        let mut editor = LineItemEditor::new();
        let a = editor.add_row();
        let blank = editor.add_row();
        let b = editor.add_row();
        editor.select_item(a, Some(LookupId::new(5)));
        editor.input(a, LineColumn::Rate, "100");
        editor.input(blank, LineColumn::Rate, "999");
        editor.select_item(b, Some(LookupId::new(2)));
        editor.input(b, LineColumn::Quantity, "zero");
        editor.input(b, LineColumn::Tax, "18");

        let items = editor.serialize();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_id, LookupId::new(5));
        assert_eq!(items[0].rate, dec("100"));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].item_id, LookupId::new(2));
        assert_eq!(items[1].rate, Decimal::ZERO);
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].tax_percent, dec("18"));
    }

    #[test]
    fn serialized_quantity_is_integer_part_and_at_least_one() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        editor.select_item(index, Some(LookupId::new(1)));
        editor.input(index, LineColumn::Quantity, "3.9");
        assert_eq!(editor.serialize()[0].quantity, 3);
        editor.input(index, LineColumn::Quantity, "0");
        assert_eq!(editor.serialize()[0].quantity, 1);
    }

    #[test]
    fn existing_rows_are_adopted_with_totals() {
        let editor = LineItemEditor::with_existing(vec![ExistingRow {
            item: Some(LookupId::new(4)),
            rate: "250".to_owned(),
            quantity: "2".to_owned(),
            tax: "18".to_owned(),
        }]);
        let row = &editor.rows()[0];
        assert_eq!(row.total_text(), "590.00");

        let mut editor = editor;
        let next = editor.add_row();
        assert_eq!(next, RowIndex::new(1));
    }

    #[test]
    fn exponent_input_feeds_total_and_payload() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        editor.select_item(index, Some(LookupId::new(3)));
        assert_eq!(editor.input(index, LineColumn::Rate, "1e3"), Some(dec("1000")));
        assert_eq!(editor.input(index, LineColumn::Tax, "1.8E1"), Some(dec("1180.00")));

        let items = editor.serialize();
        assert_eq!(items[0].rate, dec("1000"));
        assert_eq!(items[0].tax_percent, dec("18"));
    }

    #[test]
    fn saved_totals_skip_itemless_rows_and_use_integer_quantity() {
        let mut editor = LineItemEditor::new();
        let first = editor.add_row();
        editor.select_item(first, Some(LookupId::new(1)));
        editor.input(first, LineColumn::Rate, "100");

        let blank = editor.add_row();
        editor.input(blank, LineColumn::Rate, "50");

        let fractional = editor.add_row();
        editor.select_item(fractional, Some(LookupId::new(2)));
        editor.input(fractional, LineColumn::Rate, "10");
        editor.input(fractional, LineColumn::Quantity, "2.5");
        assert_eq!(editor.row(fractional).map(|row| row.total_text()), Some("25.00".to_owned()));

        assert_eq!(editor.saved_totals(), vec![dec("100.00"), dec("20.00")]);
    }

    #[test]
    fn wire_names_match_server_fields() {
        let mut editor = LineItemEditor::new();
        let index = editor.add_row();
        editor.select_item(index, Some(LookupId::new(9)));
        editor.input(index, LineColumn::Rate, "12.5");
        editor.input(index, LineColumn::Quantity, "2");
        editor.input(index, LineColumn::Tax, "5");

        let json = serde_json::to_value(editor.serialize()).expect("items serialize");
        assert_eq!(
            json,
            serde_json::json!([{ "item": 9, "rate": 12.5, "qty": 2, "tax": 5.0 }])
        );
    }
}
