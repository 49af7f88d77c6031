//! Scheduler policy configuration.
//!
//! # Invariants
//! - Defaults reproduce the established scheduling behavior exactly:
//!   three generated instances, `Training` type, `All Staff` sentinel.

/// Number of future instances generated for a recurring request.
pub const DEFAULT_RECURRENCE_HORIZON: usize = 3;
/// Event type name the training scheduler writes under.
pub const DEFAULT_TRAINING_TYPE_NAME: &str = "Training";
/// `assigned_to` value meaning "snapshot every staff member".
pub const ALL_STAFF_SENTINEL: &str = "All Staff";

/// Policy knobs consumed by [`crate::TrainingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Instances generated after the anchor for non one-time recurrence.
    ///
    /// Expansion is eager and does not extend itself; scheduling again is
    /// required to cover dates past the horizon.
    pub recurrence_horizon: usize,
    /// Name of the seeded event type used for training events and the
    /// competency matrix.
    pub training_type_name: String,
    /// Assignee value that expands to the whole staff directory.
    pub all_staff_sentinel: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recurrence_horizon: DEFAULT_RECURRENCE_HORIZON,
            training_type_name: DEFAULT_TRAINING_TYPE_NAME.to_string(),
            all_staff_sentinel: ALL_STAFF_SENTINEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SchedulerConfig;

    #[test]
    fn default_config_generates_three_instances() {
        let config = SchedulerConfig::default();
        assert_eq!(config.recurrence_horizon, 3);
        assert_eq!(config.training_type_name, "Training");
        assert_eq!(config.all_staff_sentinel, "All Staff");
    }
}
