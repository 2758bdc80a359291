//! Gold holding records and the validation applied before they reach a store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub type HoldingId = Uuid;

/// Rejection of user-entered holding fields.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("Invalid karat '{0}', expected 21 or 24")]
    InvalidKarat(String),

    #[error("Invalid gold category '{0}', expected one of Jewelry, Coin, Bar, Pound, Sabikah")]
    InvalidCategory(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Nothing to update")]
    EmptyPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PurityGrade {
    K21,
    K24,
}

impl PurityGrade {
    pub fn karat(self) -> u8 {
        match self {
            PurityGrade::K21 => 21,
            PurityGrade::K24 => 24,
        }
    }

    /// Fraction of pure gold by mass.
    pub fn purity_ratio(self) -> f64 {
        f64::from(self.karat()) / 24.0
    }
}

impl From<PurityGrade> for u8 {
    fn from(grade: PurityGrade) -> u8 {
        grade.karat()
    }
}

impl TryFrom<u8> for PurityGrade {
    type Error = ValidationError;

    fn try_from(karat: u8) -> Result<Self, Self::Error> {
        match karat {
            21 => Ok(PurityGrade::K21),
            24 => Ok(PurityGrade::K24),
            other => Err(ValidationError::InvalidKarat(other.to_string())),
        }
    }
}

impl FromStr for PurityGrade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['k', 'K']);
        trimmed
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidKarat(s.to_string()))
            .and_then(|karat| {
                PurityGrade::try_from(karat)
                    .map_err(|_| ValidationError::InvalidKarat(s.to_string()))
            })
    }
}

impl Display for PurityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}K", self.karat())
    }
}

/// Descriptive kind of a purchase lot. Not used in valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoldCategory {
    Jewelry,
    Coin,
    Bar,
    Pound,
    Sabikah,
}

impl GoldCategory {
    pub const ALL: [GoldCategory; 5] = [
        GoldCategory::Jewelry,
        GoldCategory::Coin,
        GoldCategory::Bar,
        GoldCategory::Pound,
        GoldCategory::Sabikah,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GoldCategory::Jewelry => "Jewelry",
            GoldCategory::Coin => "Coin",
            GoldCategory::Bar => "Bar",
            GoldCategory::Pound => "Pound",
            GoldCategory::Sabikah => "Sabikah",
        }
    }
}

impl FromStr for GoldCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        GoldCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_string()))
    }
}

impl Display for GoldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single recorded purchase lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldHolding {
    pub id: HoldingId,
    pub purity: PurityGrade,
    pub category: GoldCategory,
    pub mass_grams: f64,
    /// Total amount paid for the lot, not per gram.
    pub purchase_cost_total: f64,
    pub purchase_date: Option<NaiveDate>,
    pub shop_name: Option<String>,
    pub company_name: Option<String>,
    pub production_cost: Option<f64>,
    pub production_cost_cashback: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GoldHolding {
    /// Applies the present fields of `patch`. `id` and `created_at` are never touched.
    pub fn apply(&mut self, patch: &HoldingPatch, now: DateTime<Utc>) {
        if let Some(purity) = patch.purity {
            self.purity = purity;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(mass) = patch.mass_grams {
            self.mass_grams = mass;
        }
        if let Some(cost) = patch.purchase_cost_total {
            self.purchase_cost_total = cost;
        }
        if let Some(date) = patch.purchase_date {
            self.purchase_date = Some(date);
        }
        if let Some(shop) = &patch.shop_name {
            self.shop_name = Some(shop.clone());
        }
        if let Some(company) = &patch.company_name {
            self.company_name = Some(company.clone());
        }
        if let Some(cost) = patch.production_cost {
            self.production_cost = Some(cost);
        }
        if let Some(cashback) = patch.production_cost_cashback {
            self.production_cost_cashback = Some(cashback);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = now;
    }
}

/// Fields supplied when a holding is created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHolding {
    pub purity: PurityGrade,
    pub category: GoldCategory,
    pub mass_grams: f64,
    pub purchase_cost_total: f64,
    pub purchase_date: Option<NaiveDate>,
    pub shop_name: Option<String>,
    pub company_name: Option<String>,
    pub production_cost: Option<f64>,
    pub production_cost_cashback: Option<f64>,
    pub notes: Option<String>,
}

impl NewHolding {
    pub fn new(
        purity: PurityGrade,
        category: GoldCategory,
        mass_grams: f64,
        purchase_cost_total: f64,
    ) -> Self {
        Self {
            purity,
            category,
            mass_grams,
            purchase_cost_total,
            purchase_date: None,
            shop_name: None,
            company_name: None,
            production_cost: None,
            production_cost_cashback: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("grams", self.mass_grams)?;
        check_non_negative("purchase cost", self.purchase_cost_total)?;
        if let Some(cost) = self.production_cost {
            check_non_negative("production cost", cost)?;
        }
        if let Some(cashback) = self.production_cost_cashback {
            check_non_negative("cashback", cashback)?;
        }
        Ok(())
    }

    pub fn into_holding(self, id: HoldingId, now: DateTime<Utc>) -> GoldHolding {
        GoldHolding {
            id,
            purity: self.purity,
            category: self.category,
            mass_grams: self.mass_grams,
            purchase_cost_total: self.purchase_cost_total,
            purchase_date: self.purchase_date,
            shop_name: self.shop_name,
            company_name: self.company_name,
            production_cost: self.production_cost,
            production_cost_cashback: self.production_cost_cashback,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a holding; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingPatch {
    pub purity: Option<PurityGrade>,
    pub category: Option<GoldCategory>,
    pub mass_grams: Option<f64>,
    pub purchase_cost_total: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub shop_name: Option<String>,
    pub company_name: Option<String>,
    pub production_cost: Option<f64>,
    pub production_cost_cashback: Option<f64>,
    pub notes: Option<String>,
}

impl HoldingPatch {
    pub fn is_empty(&self) -> bool {
        *self == HoldingPatch::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(mass) = self.mass_grams {
            check_positive("grams", mass)?;
        }
        if let Some(cost) = self.purchase_cost_total {
            check_non_negative("purchase cost", cost)?;
        }
        if let Some(cost) = self.production_cost {
            check_non_negative("production cost", cost)?;
        }
        if let Some(cashback) = self.production_cost_cashback {
            check_non_negative("cashback", cashback)?;
        }
        Ok(())
    }
}

/// Raw, unparsed holding input as a form or the command line collects it.
#[derive(Debug, Clone, Default)]
pub struct HoldingForm {
    pub karat: Option<String>,
    pub category: Option<String>,
    pub grams: Option<String>,
    pub cost: Option<String>,
    pub purchase_date: Option<String>,
    pub shop_name: Option<String>,
    pub company_name: Option<String>,
    pub production_cost: Option<String>,
    pub cashback: Option<String>,
    pub notes: Option<String>,
}

impl HoldingForm {
    pub fn into_new_holding(self) -> Result<NewHolding, ValidationError> {
        let purity = required("karat", self.karat.as_deref())?.parse::<PurityGrade>()?;
        let category = required("category", self.category.as_deref())?.parse::<GoldCategory>()?;
        let mass_grams = parse_amount("grams", required("grams", self.grams.as_deref())?)?;
        let purchase_cost_total = parse_amount(
            "purchase cost",
            required("purchase cost", self.cost.as_deref())?,
        )?;

        let holding = NewHolding {
            purity,
            category,
            mass_grams,
            purchase_cost_total,
            purchase_date: optional(self.purchase_date.as_deref())
                .map(parse_date)
                .transpose()?,
            shop_name: non_blank(self.shop_name),
            company_name: non_blank(self.company_name),
            production_cost: optional(self.production_cost.as_deref())
                .map(|raw| parse_amount("production cost", raw))
                .transpose()?,
            production_cost_cashback: optional(self.cashback.as_deref())
                .map(|raw| parse_amount("cashback", raw))
                .transpose()?,
            notes: non_blank(self.notes),
        };
        holding.validate()?;
        Ok(holding)
    }

    pub fn into_patch(self) -> Result<HoldingPatch, ValidationError> {
        let patch = HoldingPatch {
            purity: optional(self.karat.as_deref())
                .map(str::parse::<PurityGrade>)
                .transpose()?,
            category: optional(self.category.as_deref())
                .map(str::parse::<GoldCategory>)
                .transpose()?,
            mass_grams: optional(self.grams.as_deref())
                .map(|raw| parse_amount("grams", raw))
                .transpose()?,
            purchase_cost_total: optional(self.cost.as_deref())
                .map(|raw| parse_amount("purchase cost", raw))
                .transpose()?,
            purchase_date: optional(self.purchase_date.as_deref())
                .map(parse_date)
                .transpose()?,
            shop_name: non_blank(self.shop_name),
            company_name: non_blank(self.company_name),
            production_cost: optional(self.production_cost.as_deref())
                .map(|raw| parse_amount("production cost", raw))
                .transpose()?,
            production_cost_cashback: optional(self.cashback.as_deref())
                .map(|raw| parse_amount("cashback", raw))
                .transpose()?,
            notes: non_blank(self.notes),
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// Parses a user-entered amount, tolerating thousands separators.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotNumeric {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn required<'a>(field: &'static str, raw: Option<&'a str>) -> Result<&'a str, ValidationError> {
    optional(raw).ok_or(ValidationError::Missing { field })
}

fn optional(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            value: value.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            value: value.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}
