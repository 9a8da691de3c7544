//! Launcher command lines
//!
//! Every launcher call first sources the billing shell utilities with the
//! profile, then calls the route's `bsrun*` or `bsprove*` function.

use billrun_core::{JobId, Route};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CommandTemplate {
    bs_utils: PathBuf,
    profile: PathBuf,
}

impl CommandTemplate {
    pub fn new(bs_utils: impl Into<PathBuf>, profile: impl Into<PathBuf>) -> Self {
        Self {
            bs_utils: bs_utils.into(),
            profile: profile.into(),
        }
    }

    /// Command that stages `route` for `due_date`
    pub fn stage(&self, route: Route, due_date: NaiveDate) -> String {
        format!(
            "{} ; bsrun{} -d {}",
            self.prelude(),
            route,
            due_date.format("%Y-%m-%d")
        )
    }

    /// Command that proves the staged request `stage_id`
    pub fn prove(&self, route: Route, stage_id: &JobId, due_date: NaiveDate) -> String {
        format!(
            "{} ; bsprove{} -r {} -d {}",
            self.prelude(),
            route,
            stage_id,
            due_date.format("%Y-%m-%d")
        )
    }

    fn prelude(&self) -> String {
        format!(". {} {}", quote(&self.bs_utils), quote(&self.profile))
    }
}

fn quote(path: &Path) -> String {
    shell_words::quote(&path.to_string_lossy()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn template() -> CommandTemplate {
        CommandTemplate::new(
            "/opt/clover/billing/test-tools/bin/bsUtils.sh",
            "/opt/clover/configs/billing.properties",
        )
    }

    #[test]
    fn test_stage_command() {
        assert_eq!(
            template().stage(Route::Monthly, due()),
            ". /opt/clover/billing/test-tools/bin/bsUtils.sh \
             /opt/clover/configs/billing.properties ; bsrunMonthly -d 2024-03-01"
        );
    }

    #[test]
    fn test_prove_command_embeds_stage_id_and_due_date() {
        let stage_id = JobId::parse("ABCDEFGHIJ").unwrap();
        let command = template().prove(Route::Monthly, &stage_id, due());

        assert_eq!(
            command,
            ". /opt/clover/billing/test-tools/bin/bsUtils.sh \
             /opt/clover/configs/billing.properties ; bsproveMonthly -r ABCDEFGHIJ -d 2024-03-01"
        );
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let template = CommandTemplate::new("/opt/bs utils.sh", "/etc/billing.properties");
        let command = template.stage(Route::Daily, due());

        assert!(command.starts_with(". '/opt/bs utils.sh' /etc/billing.properties ; "));
        assert!(command.ends_with("bsrunDaily -d 2024-03-01"));
    }
}
