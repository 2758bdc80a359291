//! Display language and the strings printed for each.

use crate::core::holding::GoldCategory;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::En => &EN,
            Language::Ar => &AR,
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            _ => Err(anyhow::anyhow!("Unsupported language: {}", s)),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

pub struct Labels {
    pub app_name: &'static str,
    pub last_updated: &'static str,
    pub source: &'static str,
    pub total_purchase_value: &'static str,
    pub current_value: &'static str,
    pub unrealized_gain: &'static str,
    pub zakat_calculation: &'static str,
    pub nisab: &'static str,
    pub eligible_for_zakat: &'static str,
    pub not_eligible_for_zakat: &'static str,
    pub zakat_due: &'static str,
    pub your_records: &'static str,
    pub no_records: &'static str,
    pub karat: &'static str,
    pub category: &'static str,
    pub grams: &'static str,
    pub purchase_price: &'static str,
    pub purchase_date: &'static str,
    pub shop: &'static str,
    pub value: &'static str,
    pub prices_updated: &'static str,
    pub using_estimated_prices: &'static str,
    pub record_added: &'static str,
    pub record_updated: &'static str,
    pub record_deleted: &'static str,
    pub language_changed: &'static str,
    pub k21: &'static str,
    pub k24: &'static str,
    categories: [&'static str; 5],
}

impl Labels {
    pub fn category(&self, category: GoldCategory) -> &'static str {
        let index = GoldCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or_default();
        self.categories[index]
    }
}

static EN: Labels = Labels {
    app_name: "Gold Tracker",
    last_updated: "Last updated",
    source: "Source",
    total_purchase_value: "Total Purchase Value",
    current_value: "Current Value",
    unrealized_gain: "Gain / Loss",
    zakat_calculation: "Zakat Calculation",
    nisab: "Nisab (85g of 21K)",
    eligible_for_zakat: "Eligible for Zakat",
    not_eligible_for_zakat: "Not eligible for Zakat yet",
    zakat_due: "Zakat due (2.5%)",
    your_records: "Your Gold Records",
    no_records: "No gold records yet. Add your first record!",
    karat: "Karat",
    category: "Type",
    grams: "Grams",
    purchase_price: "Purchase Price",
    purchase_date: "Purchase Date",
    shop: "Shop",
    value: "Current Value",
    prices_updated: "Prices Updated",
    using_estimated_prices: "Using Estimated Prices",
    record_added: "Record Added",
    record_updated: "Record Updated",
    record_deleted: "Record Deleted",
    language_changed: "Language changed to English",
    k21: "21K",
    k24: "24K",
    categories: ["Jewelry", "Coin", "Bar", "Pound", "Sabikah"],
};

static AR: Labels = Labels {
    app_name: "سجل الذهب",
    last_updated: "آخر تحديث",
    source: "المصدر",
    total_purchase_value: "إجمالي قيمة الشراء",
    current_value: "القيمة الحالية",
    unrealized_gain: "الربح / الخسارة",
    zakat_calculation: "حساب الزكاة",
    nisab: "النصاب (85 جرام عيار 21)",
    eligible_for_zakat: "مستحق للزكاة",
    not_eligible_for_zakat: "لم تصل لنصاب الزكاة",
    zakat_due: "الزكاة المستحقة (2.5%)",
    your_records: "سجلات الذهب الخاصة بك",
    no_records: "لا توجد سجلات ذهب حتى الآن. أضف أول سجل!",
    karat: "العيار",
    category: "النوع",
    grams: "جرام",
    purchase_price: "سعر الشراء",
    purchase_date: "تاريخ الشراء",
    shop: "المحل",
    value: "القيمة الحالية",
    prices_updated: "تم تحديث الأسعار",
    using_estimated_prices: "استخدام أسعار تقديرية",
    record_added: "تم إضافة السجل",
    record_updated: "تم تحديث السجل",
    record_deleted: "تم حذف السجل",
    language_changed: "تم تغيير اللغة إلى العربية",
    k21: "عيار ٢١",
    k24: "عيار ٢٤",
    categories: ["مجوهرات", "عملات", "سبائك", "جنيه", "سبيكة"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_parse() {
        assert_eq!(Language::En.toggle(), Language::Ar);
        assert_eq!(Language::Ar.toggle(), Language::En);
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Ar);
        assert_eq!("english".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Language::En.labels().category(GoldCategory::Sabikah), "Sabikah");
        assert_eq!(Language::Ar.labels().category(GoldCategory::Bar), "سبائك");
    }
}
