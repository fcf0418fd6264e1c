//! Prunes a scheme down to the targets a change affects

use std::fmt;
use std::path::Path;

use refine_core::{Analyzer, ChangeLevel, UsedPath};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{BuildAction, Scheme};

/// What the filter decided about one target the scheme references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDecision {
    pub target: String,
    /// `None` when the target did not change.
    pub change_reason: Option<String>,
    pub build_action: BuildAction,
}

impl TargetDecision {
    pub fn changed(&self) -> bool {
        self.change_reason.is_some()
    }
}

impl fmt::Display for TargetDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.change_reason, self.build_action) {
            (Some(reason), _) => write!(f, "{} changed because {}", self.target, reason),
            (None, BuildAction::Building) => {
                write!(f, "{} did not change, removing from scheme", self.target)
            }
            (None, BuildAction::Testing) => write!(
                f,
                "{} did not change, removing tests and not building for testing",
                self.target
            ),
        }
    }
}

type Observer<'a> = Box<dyn FnMut(&TargetDecision) + 'a>;

/// Removes unchanged targets from a scheme.
pub struct SchemeFilter<'a> {
    analyzer: &'a Analyzer,
    change_level: ChangeLevel,
    build_action: BuildAction,
    filter_when_scheme_changed: bool,
    observer: Option<Observer<'a>>,
}

impl<'a> SchemeFilter<'a> {
    pub fn new(analyzer: &'a Analyzer, build_action: BuildAction) -> Self {
        SchemeFilter {
            analyzer,
            change_level: ChangeLevel::default(),
            build_action,
            filter_when_scheme_changed: false,
            observer: None,
        }
    }

    pub fn change_level(mut self, change_level: ChangeLevel) -> Self {
        self.change_level = change_level;
        self
    }

    /// Filter even when the scheme file itself is part of the change.
    pub fn filter_when_scheme_changed(mut self, filter: bool) -> Self {
        self.filter_when_scheme_changed = filter;
        self
    }

    /// Called once per distinct target the scheme references.
    pub fn observer(mut self, observer: impl FnMut(&TargetDecision) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Filter `scheme`, which was loaded from the absolute `scheme_path`.
    pub fn filter(&mut self, scheme_path: &Path, mut scheme: Scheme) -> Result<Scheme> {
        if !self.filter_when_scheme_changed {
            let scheme_change = UsedPath::path(scheme_path, "scheme")
                .find_in_changesets(self.analyzer.changesets())?;
            if let Some(reason) = scheme_change {
                info!("Scheme changed ({}); leaving it unfiltered", reason);
                return Ok(scheme);
            }
        }

        let changes = self.analyzer.changes_by_target(self.change_level)?;
        let reason_for = |target: &str| changes.get(target).cloned().flatten();

        for target in scheme.referenced_targets() {
            let decision = TargetDecision {
                target: target.to_string(),
                change_reason: reason_for(target),
                build_action: self.build_action,
            };
            debug!("{}", decision);
            if let Some(observer) = self.observer.as_mut() {
                observer(&decision);
            }
        }

        let before = (scheme.build.len(), scheme.test.len());
        scheme.test.retain(|entry| reason_for(&entry.target).is_some());
        match self.build_action {
            BuildAction::Building => {
                scheme.build.retain(|entry| reason_for(&entry.target).is_some());
            }
            BuildAction::Testing => {
                for entry in &mut scheme.build {
                    if reason_for(&entry.target).is_none() {
                        entry.build_for_testing = false;
                    }
                }
            }
        }

        info!(
            "Filtered scheme for {}: {} of {} build entries and {} of {} test entries remain",
            self.build_action,
            scheme.build.len(),
            before.0,
            scheme.test.len(),
            before.1
        );
        Ok(scheme)
    }
}
