//! The budget entity: configuration, cached current-period state, alert firing
//! state, and closed-period history.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_window::{BudgetPeriod, DateWindow};
use crate::{
    config::EngineConfig,
    errors::{EngineError, Result},
};

/// A spending ceiling over a date window for a set of categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub period: BudgetPeriod,
    pub window: DateWindow,
    #[serde(default)]
    pub categories: Vec<CategoryAllocation>,
    #[serde(default)]
    pub kind: BudgetKind,
    #[serde(default)]
    pub rollover: RolloverConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub alert_state: AlertState,
    #[serde(default)]
    pub current_period: CurrentPeriod,
    #[serde(default)]
    pub history: Vec<PeriodSnapshot>,
    #[serde(default = "Budget::active_default")]
    pub is_active: bool,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Creates a budget with no categories, alerts enabled without thresholds, and rollover off.
    pub fn new(
        owner_id: Uuid,
        name: impl Into<String>,
        amount: f64,
        window: DateWindow,
    ) -> Result<Self> {
        ensure_positive(amount)?;
        let window = DateWindow::new(window.start, window.end)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            amount,
            currency: None,
            period: BudgetPeriod::default(),
            window,
            categories: Vec::new(),
            kind: BudgetKind::default(),
            rollover: RolloverConfig::default(),
            alerts: AlertConfig::default(),
            alert_state: AlertState::default(),
            current_period: CurrentPeriod::unspent(amount),
            history: Vec::new(),
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_period(mut self, period: BudgetPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_kind(mut self, kind: BudgetKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category_id: Uuid, allocation_percentage: f64) -> Self {
        self.categories.push(CategoryAllocation {
            category_id,
            allocation_percentage,
        });
        self
    }

    pub fn with_threshold(mut self, percentage: u8, kind: ThresholdKind) -> Self {
        self.alerts.thresholds.push(AlertThreshold::new(percentage, kind));
        self
    }

    pub fn with_rollover(mut self, max_percentage: f64) -> Self {
        self.rollover = RolloverConfig::enabled(max_percentage);
        self
    }

    pub fn with_alerts_enabled(mut self, enabled: bool) -> Self {
        self.alerts.enabled = enabled;
        self
    }

    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories.iter().map(|c| c.category_id).collect()
    }

    /// Informational sum of category weightings; never used to gate aggregation.
    pub fn allocation_total(&self) -> f64 {
        self.categories.iter().map(|c| c.allocation_percentage).sum()
    }

    /// Period ceiling including any amount carried over from the previous period.
    pub fn effective_amount(&self) -> f64 {
        self.amount + self.rollover.amount
    }

    pub fn threshold_notified(&self, threshold_id: Uuid) -> bool {
        self.alert_state.is_fired(threshold_id)
    }

    /// Clears every threshold back to unarmed without touching configuration.
    pub fn rearm_alerts(&mut self) {
        self.alert_state.clear();
        self.touch();
    }

    /// Applies a user edit. Any change to the amount, categories, window, or
    /// thresholds re-arms every threshold. Returns whether the edit was structural.
    pub fn apply_edit(&mut self, edit: BudgetEdit) -> Result<bool> {
        if let Some(amount) = edit.amount {
            ensure_positive(amount)?;
        }
        let window = match (edit.start, edit.end) {
            (None, None) => None,
            (start, end) => Some(DateWindow::new(
                start.unwrap_or(self.window.start),
                end.unwrap_or(self.window.end),
            )?),
        };

        let mut structural = false;
        if let Some(amount) = edit.amount {
            structural |= amount != self.amount;
            self.amount = amount;
        }
        if let Some(window) = window {
            structural |= window != self.window;
            self.window = window;
        }
        if let Some(categories) = edit.categories {
            structural |= categories != self.categories;
            self.categories = categories;
        }
        if let Some(thresholds) = edit.thresholds {
            structural |= thresholds != self.alerts.thresholds;
            self.alerts.thresholds = thresholds;
        }
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(enabled) = edit.alerts_enabled {
            self.alerts.enabled = enabled;
        }
        if let Some(enabled) = edit.rollover_enabled {
            self.rollover.enabled = enabled;
        }
        if let Some(max) = edit.max_rollover_percentage {
            self.rollover.max_percentage = clamp_percentage(max);
        }
        self.rollover.amount = self.rollover.amount.min(self.rollover.bound(self.amount));

        if structural {
            self.alert_state.clear();
            self.current_period.remaining = self.amount - self.current_period.spent;
        }
        self.touch();
        Ok(structural)
    }

    /// Marks the budget as logically deleted.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn active_default() -> bool {
        true
    }
}

/// Weighting of one category inside a budget. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAllocation {
    pub category_id: Uuid,
    pub allocation_percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetKind {
    #[default]
    Expense,
    Income,
    Savings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RolloverConfig {
    pub enabled: bool,
    /// Amount carried into the current period.
    pub amount: f64,
    /// Upper bound on carryover as a share of the budget amount, 0–100.
    pub max_percentage: f64,
}

impl RolloverConfig {
    pub fn enabled(max_percentage: f64) -> Self {
        Self {
            enabled: true,
            amount: 0.0,
            max_percentage: clamp_percentage(max_percentage),
        }
    }

    /// Largest carryover allowed for a budget of `amount`.
    pub fn bound(&self, amount: f64) -> f64 {
        (amount * self.max_percentage / 100.0).max(0.0)
    }
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 0.0,
            max_percentage: 100.0,
        }
    }
}

/// Alert configuration. Thresholds are immutable configuration; whether one has
/// fired lives in [`AlertState`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    pub enabled: bool,
    #[serde(default)]
    pub thresholds: Vec<AlertThreshold>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertThreshold {
    pub id: Uuid,
    pub percentage: u8,
    pub kind: ThresholdKind,
}

impl AlertThreshold {
    /// Creates a threshold, clamping the percentage into `1..=100`.
    pub fn new(percentage: u8, kind: ThresholdKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            percentage: percentage.clamp(1, 100),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdKind {
    Warning,
    Critical,
}

/// Firing state keyed by threshold id. An absent key means the threshold is unarmed
/// and may fire; a present key records when it last fired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlertState {
    #[serde(default)]
    pub fired: BTreeMap<Uuid, DateTime<Utc>>,
}

impl AlertState {
    pub fn is_fired(&self, threshold_id: Uuid) -> bool {
        self.fired.contains_key(&threshold_id)
    }

    pub fn last_notified_at(&self, threshold_id: Uuid) -> Option<DateTime<Utc>> {
        self.fired.get(&threshold_id).copied()
    }

    pub fn fire(&mut self, threshold_id: Uuid, at: DateTime<Utc>) {
        self.fired.insert(threshold_id, at);
    }

    pub fn clear(&mut self) {
        self.fired = BTreeMap::new();
    }
}

/// Materialised cache of the current period's spending. Always rederivable from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CurrentPeriod {
    pub spent: f64,
    pub remaining: f64,
    pub transaction_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_calculated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub per_category: Vec<CategorySpending>,
}

impl CurrentPeriod {
    pub fn unspent(amount: f64) -> Self {
        Self {
            remaining: amount,
            ..Self::default()
        }
    }
}

/// One category's contribution to a budget's spending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySpending {
    pub category_id: Uuid,
    pub spent: f64,
    pub transaction_count: u64,
}

/// Closed-period record appended to a budget's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodSnapshot {
    pub window: DateWindow,
    pub budget_amount: f64,
    pub actual_spent: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    pub transaction_count: u64,
    pub closed_at: DateTime<Utc>,
}

/// Partial update to a budget. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct BudgetEdit {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub categories: Option<Vec<CategoryAllocation>>,
    pub thresholds: Option<Vec<AlertThreshold>>,
    pub alerts_enabled: Option<bool>,
    pub rollover_enabled: Option<bool>,
    pub max_rollover_percentage: Option<f64>,
}

/// Input for creating a budget with configuration-driven defaults.
#[derive(Debug, Clone)]
pub struct BudgetDraft {
    pub owner_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub categories: Vec<CategoryAllocation>,
    pub kind: BudgetKind,
    pub currency: Option<String>,
    /// Falls back to the configured default thresholds when `None`.
    pub thresholds: Option<Vec<AlertThreshold>>,
    pub alerts_enabled: bool,
    pub rollover_enabled: bool,
    /// Falls back to the configured default when `None`.
    pub max_rollover_percentage: Option<f64>,
}

impl BudgetDraft {
    pub fn new(
        owner_id: Uuid,
        name: impl Into<String>,
        amount: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            owner_id,
            name: name.into(),
            amount,
            period: BudgetPeriod::default(),
            start,
            end,
            categories: Vec::new(),
            kind: BudgetKind::default(),
            currency: None,
            thresholds: None,
            alerts_enabled: true,
            rollover_enabled: false,
            max_rollover_percentage: None,
        }
    }

    pub fn build(self, config: &EngineConfig) -> Result<Budget> {
        let window = DateWindow::new(self.start, self.end)?;
        let mut budget = Budget::new(self.owner_id, self.name, self.amount, window)?
            .with_period(self.period)
            .with_kind(self.kind)
            .with_alerts_enabled(self.alerts_enabled);
        budget.currency = self.currency;
        budget.categories = self.categories;
        budget.alerts.thresholds = self
            .thresholds
            .unwrap_or_else(|| config.default_alert_thresholds());
        let max = self
            .max_rollover_percentage
            .unwrap_or(config.default_max_rollover_percentage);
        budget.rollover = RolloverConfig {
            enabled: self.rollover_enabled,
            amount: 0.0,
            max_percentage: clamp_percentage(max),
        };
        Ok(budget)
    }
}

fn ensure_positive(amount: f64) -> Result<()> {
    if amount.is_nan() || amount <= 0.0 {
        return Err(EngineError::DegenerateAmount(amount));
    }
    Ok(())
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
