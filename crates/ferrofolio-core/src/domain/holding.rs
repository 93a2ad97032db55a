use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{validate_allocation, validate_non_negative};
use crate::{Symbol, ValidationError};

/// Closed classification of a valuation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Priced in the reporting currency.
    Domestic,
    /// Priced in a foreign currency and converted with the exchange rate.
    Foreign,
    /// The fixed-income position; never priced by the feed.
    Cash,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::Foreign => "foreign",
            Self::Cash => "cash",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Domestic => "Domestic",
            Self::Foreign => "Foreign",
            Self::Cash => "Cash",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured position in a tradable asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingConfig {
    pub symbol: Symbol,
    pub quantity: f64,
    pub target_allocation: f64,
    pub average_cost: f64,
    pub is_domestic: bool,
}

impl HoldingConfig {
    pub fn new(
        symbol: Symbol,
        quantity: f64,
        target_allocation: f64,
        average_cost: f64,
        is_domestic: bool,
    ) -> Result<Self, ValidationError> {
        let holding = Self {
            symbol,
            quantity,
            target_allocation,
            average_cost,
            is_domestic,
        };
        holding.validate()?;
        Ok(holding)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_negative("quantity", self.quantity)?;
        validate_non_negative("average_cost", self.average_cost)?;
        validate_allocation("target_allocation", self.target_allocation)
    }

    pub const fn category(&self) -> Category {
        if self.is_domestic {
            Category::Domestic
        } else {
            Category::Foreign
        }
    }

    /// Multiplier that expresses a native price in the reporting currency.
    pub fn conversion_factor(&self, exchange_rate: f64) -> f64 {
        if self.is_domestic {
            1.0
        } else {
            exchange_rate
        }
    }
}

/// Fixed-value cash position with its own allocation goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedIncome {
    #[serde(default = "default_fixed_income_label")]
    pub label: String,
    pub amount: f64,
    pub target_allocation: f64,
}

fn default_fixed_income_label() -> String {
    String::from("Fixed Income")
}

impl FixedIncome {
    pub fn new(amount: f64, target_allocation: f64) -> Result<Self, ValidationError> {
        let fixed_income = Self {
            label: default_fixed_income_label(),
            amount,
            target_allocation,
        };
        fixed_income.validate()?;
        Ok(fixed_income)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_negative("fixed_income.amount", self.amount)?;
        validate_allocation("fixed_income.target_allocation", self.target_allocation)
    }
}
