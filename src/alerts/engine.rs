//! Alert lifecycle engine.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::alerts::rule::{AlertRule, Severity};
use crate::metrics::{unix_timestamp, MetricsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

/// An alert instance derived from a rule in breach.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub rule_name: String,
    pub metric: String,
    pub threshold: f64,
    pub current_value: f64,
    pub severity: Severity,
    pub message: String,
    pub triggered_at: f64,
    pub resolved_at: Option<f64>,
    pub status: AlertStatus,
}

/// Key of the active-alert map: at most one active alert per
/// (rule name, metric) at any time.
type AlertKey = (String, String);

#[derive(Default)]
struct AlertState {
    rules: Vec<AlertRule>,
    active: HashMap<AlertKey, Alert>,
    history: VecDeque<Alert>,
    /// First time each key was seen breaching, for sustain gating.
    first_breach: HashMap<AlertKey, f64>,
}

/// Evaluates rules against metric snapshots and manages the
/// active/resolved alert lifecycle.
///
/// The evaluation loop is the sole caller of `evaluate_all`, so the state
/// machine never races with itself; the mutex only covers concurrent rule
/// additions and read accessors.
pub struct AlertEngine {
    state: Mutex<AlertState>,
    history_capacity: usize,
}

impl AlertEngine {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            state: Mutex::new(AlertState::default()),
            history_capacity: history_capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_rule(&self, rule: AlertRule) {
        self.lock().rules.push(rule);
    }

    pub fn rules(&self) -> Vec<AlertRule> {
        self.lock().rules.clone()
    }

    /// One evaluation pass over every rule. Never fails: rules whose
    /// metric cannot be resolved are skipped.
    pub fn evaluate_all(&self, snapshot: &MetricsSnapshot) {
        let now = unix_timestamp();
        let mut state = self.lock();

        for i in 0..state.rules.len() {
            let rule = state.rules[i].clone();
            let Some(value) = snapshot.resolve(&rule.metric) else {
                continue;
            };
            let key = (rule.name.clone(), rule.metric.clone());
            let breaching = rule.operator.evaluate(value, rule.threshold);

            if breaching {
                let first = *state.first_breach.entry(key.clone()).or_insert(now);
                if state.active.contains_key(&key) {
                    continue;
                }
                if now - first < rule.sustain_secs as f64 {
                    continue;
                }
                let alert = Alert {
                    id: Uuid::new_v4(),
                    rule_name: rule.name.clone(),
                    metric: rule.metric.clone(),
                    threshold: rule.threshold,
                    current_value: value,
                    severity: rule.severity,
                    message: rule.message.clone(),
                    triggered_at: now,
                    resolved_at: None,
                    status: AlertStatus::Active,
                };
                log_transition(&alert, "triggered");
                state.active.insert(key, alert.clone());
                while state.history.len() >= self.history_capacity {
                    state.history.pop_front();
                }
                state.history.push_back(alert);
            } else {
                state.first_breach.remove(&key);
                if let Some(mut alert) = state.active.remove(&key) {
                    alert.resolved_at = Some(now);
                    alert.status = AlertStatus::Resolved;
                    log_transition(&alert, "resolved");
                    // Keep history consistent with the final state.
                    if let Some(entry) =
                        state.history.iter_mut().rev().find(|a| a.id == alert.id)
                    {
                        *entry = alert;
                    }
                }
            }
        }
    }

    pub fn active_alerts(&self) -> Vec<Alert> {
        let state = self.lock();
        let mut alerts: Vec<Alert> = state.active.values().cloned().collect();
        alerts.sort_by(|a, b| a.triggered_at.total_cmp(&b.triggered_at));
        alerts
    }

    /// The last `limit` history entries, oldest first.
    pub fn alert_history(&self, limit: usize) -> Vec<Alert> {
        let state = self.lock();
        let skip = state.history.len().saturating_sub(limit);
        state.history.iter().skip(skip).cloned().collect()
    }
}

/// This warning line is the engine's only notification channel.
fn log_transition(alert: &Alert, action: &str) {
    tracing::warn!(
        alert_id = %alert.id,
        severity = %alert.severity,
        metric = %alert.metric,
        current_value = alert.current_value,
        threshold = alert.threshold,
        "Alert {}: {} - {}",
        action,
        alert.rule_name,
        alert.message
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::rule::AlertOperator;
    use crate::metrics::MetricsRegistry;

    fn error_rate_rule() -> AlertRule {
        AlertRule::new(
            "high_error_rate",
            "error_rate",
            0.05,
            AlertOperator::Gt,
            Severity::Critical,
            "Error rate is above 5%",
        )
    }

    #[test]
    fn breach_triggers_exactly_one_alert_across_ticks() {
        let engine = AlertEngine::new(100);
        engine.add_rule(error_rate_rule());

        let registry = MetricsRegistry::new(100);
        registry.set_gauge("error_rate", 0.2, &[("query_type", "dish")]);
        let snapshot = registry.snapshot();

        for _ in 0..5 {
            engine.evaluate_all(&snapshot);
        }

        let active = engine.active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Critical);
        assert_eq!(active[0].current_value, 0.2);
        assert_eq!(engine.alert_history(10).len(), 1);
    }

    #[test]
    fn clearing_breach_resolves_into_history() {
        let engine = AlertEngine::new(100);
        engine.add_rule(error_rate_rule());

        let registry = MetricsRegistry::new(100);
        registry.set_gauge("error_rate", 0.2, &[]);
        engine.evaluate_all(&registry.snapshot());
        assert_eq!(engine.active_alerts().len(), 1);

        registry.set_gauge("error_rate", 0.01, &[]);
        engine.evaluate_all(&registry.snapshot());

        assert!(engine.active_alerts().is_empty());
        let history = engine.alert_history(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, AlertStatus::Resolved);
        assert!(history[0].resolved_at.is_some());
    }

    #[test]
    fn retrigger_after_resolution_creates_a_second_history_entry() {
        let engine = AlertEngine::new(100);
        engine.add_rule(error_rate_rule());
        let registry = MetricsRegistry::new(100);

        registry.set_gauge("error_rate", 0.2, &[]);
        engine.evaluate_all(&registry.snapshot());
        registry.set_gauge("error_rate", 0.01, &[]);
        engine.evaluate_all(&registry.snapshot());
        registry.set_gauge("error_rate", 0.3, &[]);
        engine.evaluate_all(&registry.snapshot());

        assert_eq!(engine.active_alerts().len(), 1);
        let history = engine.alert_history(10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, AlertStatus::Resolved);
        assert_eq!(history[1].status, AlertStatus::Active);
    }

    #[test]
    fn unresolvable_metric_skips_rule() {
        let engine = AlertEngine::new(100);
        engine.add_rule(AlertRule::new(
            "ghost",
            "metric_nobody_records",
            1.0,
            AlertOperator::Gt,
            Severity::Info,
            "never fires",
        ));
        let registry = MetricsRegistry::new(100);
        engine.evaluate_all(&registry.snapshot());
        assert!(engine.active_alerts().is_empty());
        assert!(engine.alert_history(10).is_empty());
    }

    #[test]
    fn sustain_gates_first_fire() {
        let engine = AlertEngine::new(100);
        engine.add_rule(error_rate_rule().with_sustain(1));

        let registry = MetricsRegistry::new(100);
        registry.set_gauge("error_rate", 0.2, &[]);
        let snapshot = registry.snapshot();

        engine.evaluate_all(&snapshot);
        assert!(engine.active_alerts().is_empty());

        std::thread::sleep(std::time::Duration::from_millis(1100));
        engine.evaluate_all(&snapshot);
        assert_eq!(engine.active_alerts().len(), 1);
    }

    #[test]
    fn sustain_timer_resets_when_breach_clears() {
        let engine = AlertEngine::new(100);
        engine.add_rule(error_rate_rule().with_sustain(60));

        let registry = MetricsRegistry::new(100);
        registry.set_gauge("error_rate", 0.2, &[]);
        engine.evaluate_all(&registry.snapshot());

        registry.set_gauge("error_rate", 0.0, &[]);
        engine.evaluate_all(&registry.snapshot());

        // Back in breach: the 60s window starts over, so still no alert.
        registry.set_gauge("error_rate", 0.2, &[]);
        engine.evaluate_all(&registry.snapshot());
        assert!(engine.active_alerts().is_empty());
    }

    #[test]
    fn history_is_capacity_bounded() {
        let engine = AlertEngine::new(3);
        engine.add_rule(error_rate_rule());
        let registry = MetricsRegistry::new(100);

        for _ in 0..5 {
            registry.set_gauge("error_rate", 0.2, &[]);
            engine.evaluate_all(&registry.snapshot());
            registry.set_gauge("error_rate", 0.0, &[]);
            engine.evaluate_all(&registry.snapshot());
        }

        assert_eq!(engine.alert_history(100).len(), 3);
    }
}
