//! Directory and rule fixtures shared by the integration tests.

use directory_client::Member;
use snitch_core::common::SyncConfig;
use snitch_core::kernel::MockDirectory;

pub const RULES_YAML: &str = r#"
mode: sync
rules:
  groups:
    - name: engineering
      email: eng@co
      organization: Main Org.
      role: Editor
    - name: ghosts
      email: missing@co
      organization: Main Org.
      role: Viewer
  users:
    - name: auditor
      email: audit@co
      organization: Main Org.
      role: Admin
"#;

pub fn sync_config() -> SyncConfig {
    SyncConfig::from_yaml(RULES_YAML).expect("fixture rules parse")
}

/// `eng@co` = [a@co, sub@co], `sub@co` = [a@co, b@co]; nothing else exists.
pub fn engineering_directory() -> MockDirectory {
    MockDirectory::new()
        .with_group("eng@co", vec![Member::user("a@co"), Member::group("sub@co")])
        .with_group("sub@co", vec![Member::user("a@co"), Member::user("b@co")])
}
